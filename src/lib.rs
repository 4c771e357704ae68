#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod core;
#[cfg(feature = "std")]
pub mod console;
#[cfg(feature = "std")]
pub mod endpoint;
#[cfg(feature = "std")]
pub mod game_client;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
mod timers;
#[cfg(feature = "std")]
pub mod transport;

pub use crate::core::*;
#[cfg(feature = "std")]
pub use console::{run_console, ConsoleGameClient, ConsoleSession, LineOutcome, PlayerColor};
#[cfg(feature = "std")]
pub use endpoint::{serve, BoardEndpoint, EndpointConfig};
#[cfg(feature = "std")]
pub use game_client::{BridgeEvent, BridgeHandle, GameClient};
#[cfg(feature = "std")]
pub use logging::{format_line, init_logging};
#[cfg(feature = "std")]
pub use protocol::{FrameEvent, InboundFrame, LedWire, OutboundFrame, ProtocolError};
#[cfg(feature = "std")]
pub use session::{BoardSession, FrameOutcome};
#[cfg(feature = "std")]
pub use transport::{
    heartbeat::HeartbeatTransport,
    in_memory::{InMemoryBoard, InMemoryTransport},
    tcp::TcpTransport,
    Transport,
};
