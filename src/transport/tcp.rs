use std::net::SocketAddr;

use log::warn;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::framing::FrameBuffer;
use crate::protocol::{decode_frame, InboundFrame, OutboundFrame};
use crate::transport::Transport;

/// Default timeout for writing one response (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bytes requested from the socket per read.
const READ_CHUNK: usize = 4096;

pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
    frames: FrameBuffer,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        Self {
            stream,
            timeout_duration,
            frames: FrameBuffer::new(),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }
}

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe => {
            anyhow::anyhow!("Connection closed by peer")
        }
        std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, frame: OutboundFrame) -> anyhow::Result<()> {
        let data = frame
            .to_bytes()
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        timeout(self.timeout_duration, self.stream.write_all(&data))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
            .map_err(io_error)
    }

    async fn recv(&mut self) -> anyhow::Result<InboundFrame> {
        loop {
            while let Some(raw) = self.frames.next_frame() {
                match decode_frame(&raw) {
                    Ok(frame) => return Ok(frame),
                    Err(e) => warn!("Dropping malformed frame ({} bytes): {}", raw.len(), e),
                }
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut chunk).await.map_err(io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.frames.push(&chunk[..n]);
        }
    }
}
