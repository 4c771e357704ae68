use crate::protocol::{InboundFrame, OutboundFrame};

/// One board connection.
///
/// `recv` must be cancel safe: the endpoint polls it inside `tokio::select!`
/// and drops the future whenever another input wins. Implementations keep any
/// partially received data in `self`, never in the future.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: OutboundFrame) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<InboundFrame>;
}

pub mod heartbeat;
pub mod in_memory;
pub mod tcp;
