//! Terminal stand-in for a remote game session: prints the moves played on
//! the board and takes the opponent's replies from stdin.

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::core::UciMove;
use crate::game_client::{BridgeEvent, BridgeHandle, GameClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlayerColor {
    White,
    Black,
}

/// Accepts every move and echoes it to stdout.
#[derive(Debug, Default)]
pub struct ConsoleGameClient;

impl ConsoleGameClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl GameClient for ConsoleGameClient {
    async fn submit_move(&self, mv: &UciMove) -> anyhow::Result<()> {
        println!("You played {}", mv);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Quit,
}

/// Line-oriented console dialogue, separate from stdin so it can be driven
/// directly.
#[derive(Debug)]
pub struct ConsoleSession {
    handle: BridgeHandle,
    color: PlayerColor,
    awaiting_game_id: bool,
    game_id: Option<String>,
}

impl ConsoleSession {
    pub fn new(handle: BridgeHandle, color: PlayerColor) -> Self {
        Self {
            handle,
            color,
            awaiting_game_id: false,
            game_id: None,
        }
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn on_event(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::BoardConnected => println!("Board connected, set up the pieces"),
            BridgeEvent::BoardReady => {
                println!("Board ready. Enter a game id to start:");
                self.awaiting_game_id = true;
            }
            BridgeEvent::MoveSubmitted { mv, accepted: true } => {
                println!("Move {} sent. Enter the opponent's reply (e.g. e7e5):", mv);
            }
            BridgeEvent::MoveSubmitted { mv, accepted: false } => {
                println!("Move {} was not accepted, play it again", mv);
            }
            BridgeEvent::OpponentMoveMirrored { mv } => {
                println!("Opponent move {} is on the board. Your move", mv);
            }
            BridgeEvent::BoardDisconnected => {
                println!("Board disconnected, waiting for it to reconnect");
                self.awaiting_game_id = false;
            }
        }
    }

    pub fn on_line(&mut self, line: &str) -> anyhow::Result<LineOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }
        if line.eq_ignore_ascii_case("quit") {
            return Ok(LineOutcome::Quit);
        }

        if self.awaiting_game_id {
            self.awaiting_game_id = false;
            self.game_id = Some(line.to_string());
            info!("Starting game {} as {:?}", line, self.color);
            self.handle.enable_game_mode()?;
            self.handle.set_player_turn(self.color == PlayerColor::White)?;
            match self.color {
                PlayerColor::White => println!("Game {} started. Your move", line),
                PlayerColor::Black => {
                    println!("Game {} started. Enter the opponent's first move:", line)
                }
            }
            return Ok(LineOutcome::Continue);
        }

        match line {
            "resign" => println!("Resignation noted; confirm it in the game client"),
            "draw" => println!("Draw offer noted; confirm it in the game client"),
            uci => match self.handle.opponent_move(uci) {
                Ok(()) => debug!("Relaying opponent move {}", uci),
                Err(e) => println!("{}", e),
            },
        }
        Ok(LineOutcome::Continue)
    }
}

/// Drive a [`ConsoleSession`] from stdin and the endpoint's events until the
/// operator quits or the endpoint goes away.
pub async fn run_console(
    handle: BridgeHandle,
    mut events: mpsc::UnboundedReceiver<BridgeEvent>,
    color: PlayerColor,
) -> anyhow::Result<()> {
    let mut console = ConsoleSession::new(handle.clone(), color);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => console.on_event(&event),
                None => return Ok(()),
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if console.on_line(&line)? == LineOutcome::Quit {
                        handle.shutdown()?;
                        return Ok(());
                    }
                }
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
        }
    }
}
