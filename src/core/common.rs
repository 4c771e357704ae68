//! Common error type for the board core.

/// Errors returned by position lookups and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Chip name is not `MCP1`..`MCP4`.
    InvalidChip,
    /// Port name is not `PA` or `PB`.
    InvalidPort,
    /// Pin name is malformed or belongs to another port.
    InvalidPin,
    /// Square is not in `a1`..`h8`.
    InvalidSquare,
    /// LED index is not wired to any square.
    UnknownLed(u8),
    /// Move string is not in UCI long algebraic form.
    InvalidMove,
    /// Wiring tables do not form a one-to-one mapping.
    InconsistentWiring,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::InvalidChip => write!(f, "Chip name must be MCP1..MCP4"),
            BoardError::InvalidPort => write!(f, "Port name must be PA or PB"),
            BoardError::InvalidPin => write!(f, "Pin name does not match its port"),
            BoardError::InvalidSquare => write!(f, "Square must be a1..h8"),
            BoardError::UnknownLed(led) => write!(f, "LED {} is not wired to a square", led),
            BoardError::InvalidMove => write!(f, "Move is not in UCI notation"),
            BoardError::InconsistentWiring => write!(f, "Wiring tables are not one-to-one"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
