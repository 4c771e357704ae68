//! The seam between the board bridge and whatever runs the actual game: a
//! [`GameClient`] receives committed moves, a [`BridgeHandle`] feeds game
//! state back in, and [`BridgeEvent`]s report what happened on the board.

use tokio::sync::mpsc;

use crate::core::{TimerSlot, TimerToken, UciMove};

/// Receives moves the player made on the physical board.
#[async_trait::async_trait]
pub trait GameClient: Send + Sync {
    /// Submit one move. Any error counts as a rejected move.
    async fn submit_move(&self, mv: &UciMove) -> anyhow::Result<()>;
}

/// What the bridge tells the game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    BoardConnected,
    /// The pieces reached the starting position.
    BoardReady,
    MoveSubmitted { mv: UciMove, accepted: bool },
    /// An opponent move was played out on the board and confirmed.
    OpponentMoveMirrored { mv: UciMove },
    BoardDisconnected,
}

/// Everything the endpoint actor reacts to besides inbound frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionInput {
    OpponentMove(UciMove),
    SetPlayerTurn(bool),
    EnableGameMode,
    TimerFired {
        epoch: u64,
        slot: TimerSlot,
        token: TimerToken,
    },
    Submitted {
        epoch: u64,
        mv: UciMove,
        accepted: bool,
    },
    Shutdown,
}

/// Cloneable handle for driving a running [`BoardEndpoint`](crate::BoardEndpoint).
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    tx: mpsc::UnboundedSender<SessionInput>,
}

impl BridgeHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionInput>) -> Self {
        Self { tx }
    }

    /// Mirror an opponent move, given in UCI notation, onto the board.
    pub fn opponent_move(&self, uci: &str) -> anyhow::Result<()> {
        let mv: UciMove = uci
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid move '{}': {}", uci.trim(), e))?;
        self.post(SessionInput::OpponentMove(mv))
    }

    pub fn set_player_turn(&self, turn: bool) -> anyhow::Result<()> {
        self.post(SessionInput::SetPlayerTurn(turn))
    }

    pub fn enable_game_mode(&self) -> anyhow::Result<()> {
        self.post(SessionInput::EnableGameMode)
    }

    /// Stop the endpoint after the current frame.
    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.post(SessionInput::Shutdown)
    }

    fn post(&self, input: SessionInput) -> anyhow::Result<()> {
        self.tx
            .send(input)
            .map_err(|_| anyhow::anyhow!("Board endpoint is not running"))
    }
}
