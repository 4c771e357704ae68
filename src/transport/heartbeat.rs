use log::{trace, warn};
use tokio::time::{timeout_at, Duration, Instant};

use crate::protocol::{FrameEvent, InboundFrame, OutboundFrame};
use crate::transport::Transport;

/// Transport wrapper that detects a silent board.
///
/// The controller sends a `heartbeat` frame whenever nothing else happens, so a
/// connection with no inbound frame for `idle_timeout` is considered dead even
/// if the socket is still open. Heartbeat frames are passed through: they carry
/// the current sensor state and expect an answer like any other frame.
///
/// Can be disabled for transports that don't need monitoring (e.g.
/// InMemoryTransport).
pub struct HeartbeatTransport<T: Transport> {
    inner: T,
    idle_timeout: Duration,
    last_activity: Instant,
    heartbeats: u64,
    enabled: bool,
}

impl<T: Transport> HeartbeatTransport<T> {
    pub fn new(inner: T, idle_timeout: Duration) -> Self {
        Self {
            inner,
            idle_timeout,
            last_activity: Instant::now(),
            heartbeats: 0,
            enabled: true,
        }
    }

    pub fn disabled(inner: T) -> Self {
        Self {
            enabled: false,
            ..Self::new(inner, Duration::from_secs(45))
        }
    }

    /// Number of heartbeat frames received so far.
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats
    }

    fn mark_activity(&mut self) {
        self.last_activity = Instant::now();
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for HeartbeatTransport<T> {
    async fn send(&mut self, frame: OutboundFrame) -> anyhow::Result<()> {
        self.inner.send(frame).await
    }

    async fn recv(&mut self) -> anyhow::Result<InboundFrame> {
        if !self.enabled {
            return self.inner.recv().await;
        }

        let deadline = self.last_activity + self.idle_timeout;
        match timeout_at(deadline, self.inner.recv()).await {
            Ok(Ok(frame)) => {
                self.mark_activity();
                if frame.event == FrameEvent::Heartbeat {
                    self.heartbeats += 1;
                    trace!("Heartbeat #{}", self.heartbeats);
                }
                Ok(frame)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Idle timeout exceeded ({:?})", self.idle_timeout);
                Err(anyhow::anyhow!(
                    "Connection idle timeout exceeded ({:?})",
                    self.idle_timeout
                ))
            }
        }
    }
}
