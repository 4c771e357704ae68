use tokio::sync::mpsc;

use crate::protocol::{InboundFrame, OutboundFrame};
use crate::transport::Transport;

/// Bridge side of an in-process board connection.
pub struct InMemoryTransport {
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
}

/// Board side of an in-process connection. Dropping it closes the link.
pub struct InMemoryBoard {
    inbound: mpsc::UnboundedSender<InboundFrame>,
    outbound: mpsc::UnboundedReceiver<OutboundFrame>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, InMemoryBoard) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (
            Self {
                inbound: in_rx,
                outbound: out_tx,
            },
            InMemoryBoard {
                inbound: in_tx,
                outbound: out_rx,
            },
        )
    }
}

impl InMemoryBoard {
    pub fn send(&self, frame: InboundFrame) -> anyhow::Result<()> {
        self.inbound
            .send(frame)
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    pub async fn recv(&mut self) -> Option<OutboundFrame> {
        self.outbound.recv().await
    }

    /// Next response if one is already queued.
    pub fn try_recv(&mut self) -> Option<OutboundFrame> {
        self.outbound.try_recv().ok()
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, frame: OutboundFrame) -> anyhow::Result<()> {
        self.outbound
            .send(frame)
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<InboundFrame> {
        self.inbound
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}
