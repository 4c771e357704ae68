//! Board logic (no_std compatible)
//!
//! Pure sensor, LED and move-detection logic with no I/O and no clock of its
//! own. Only `alloc` and the `log` facade are required, so the same code can
//! run on the board controller itself.

pub mod common;
pub mod config;
pub mod diff;
pub mod led;
pub mod moves;
pub mod position;
pub mod readiness;
pub mod snapshot;

pub use common::BoardError;
pub use config::*;
pub use diff::{diff, Edge, Transition};
pub use led::{default_layer, LedColor, LedInstruction, LedPlan, PulseClock};
pub use moves::{Command, MoveStateMachine, Phase, TimerSlot, TimerToken};
pub use position::{CellAddress, Coordinate, Port, PositionMap, UciMove};
pub use readiness::{is_ready, SetupReport};
pub use snapshot::SensorSnapshot;
