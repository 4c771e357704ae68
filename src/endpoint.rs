//! The async side of a board connection: one actor per connection that owns
//! the [`BoardSession`] and multiplexes inbound frames with timer expiries,
//! submission results and commands from the game session.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::core::{Command, Phase, PositionMap, SessionConfig, TimerSlot, UciMove};
use crate::game_client::{BridgeEvent, BridgeHandle, GameClient, SessionInput};
use crate::session::BoardSession;
use crate::timers::TimerSlots;
use crate::transport::heartbeat::HeartbeatTransport;
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Default idle timeout: the controller sends a heartbeat well within this.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub session: SessionConfig,
    /// Drop a connection that sends nothing for this long. `None` disables
    /// the check.
    pub idle_timeout: Option<Duration>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }
}

enum Flow {
    Continue,
    Shutdown,
}

pub struct BoardEndpoint {
    map: PositionMap,
    config: EndpointConfig,
    client: Arc<dyn GameClient>,
    tx: mpsc::UnboundedSender<SessionInput>,
    rx: mpsc::UnboundedReceiver<SessionInput>,
    events: mpsc::UnboundedSender<BridgeEvent>,
    epoch: u64,
}

impl BoardEndpoint {
    pub fn new(
        map: PositionMap,
        config: EndpointConfig,
        client: Arc<dyn GameClient>,
    ) -> (Self, BridgeHandle, mpsc::UnboundedReceiver<BridgeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let handle = BridgeHandle::new(tx.clone());
        (
            Self {
                map,
                config,
                client,
                tx,
                rx,
                events,
                epoch: 0,
            },
            handle,
            events_rx,
        )
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Serve one board connection until it drops or shutdown is requested.
    ///
    /// Returns `Ok(())` after [`BridgeHandle::shutdown`] and an error
    /// describing the disconnect otherwise.
    pub async fn run<T: Transport>(&mut self, mut transport: T) -> anyhow::Result<()> {
        self.epoch += 1;
        let epoch = self.epoch;
        let mut session = BoardSession::new(self.map.clone(), &self.config.session);
        let mut timers = TimerSlots::new();
        let opened = Instant::now();

        info!("Board connected (session {})", epoch);
        self.emit(BridgeEvent::BoardConnected);

        let result = loop {
            tokio::select! {
                frame = transport.recv() => {
                    let frame = match frame {
                        Ok(frame) => frame,
                        Err(e) => break Err(e),
                    };
                    let outcome = session.handle_frame(&frame, opened.elapsed());
                    self.apply(&mut timers, epoch, outcome.commands);
                    if outcome.board_ready {
                        self.emit(BridgeEvent::BoardReady);
                    }
                    if let Some(response) = outcome.response {
                        if let Err(e) = transport.send(response).await {
                            break Err(e);
                        }
                    }
                }
                input = self.rx.recv() => {
                    let Some(input) = input else {
                        break Ok(());
                    };
                    if let Flow::Shutdown = self.handle_input(&mut session, &mut timers, epoch, input) {
                        info!("Shutdown requested");
                        break Ok(());
                    }
                }
            }
        };

        let commands = session.teardown();
        self.apply(&mut timers, epoch, commands);
        timers.cancel_all();
        match &result {
            Ok(()) => info!("Session {} closed", epoch),
            Err(e) => info!("Board disconnected (session {}): {}", epoch, e),
        }
        self.emit(BridgeEvent::BoardDisconnected);
        result
    }

    /// Wait for an input while no board is connected. Returns `true` once
    /// shutdown is requested.
    async fn idle_input(&mut self) -> bool {
        match self.rx.recv().await {
            None | Some(SessionInput::Shutdown) => true,
            Some(SessionInput::OpponentMove(mv)) => {
                warn!("No board connected; dropping opponent move {}", mv);
                false
            }
            Some(other) => {
                debug!("No board connected; dropping {:?}", other);
                false
            }
        }
    }

    fn handle_input(
        &mut self,
        session: &mut BoardSession,
        timers: &mut TimerSlots,
        epoch: u64,
        input: SessionInput,
    ) -> Flow {
        match input {
            SessionInput::OpponentMove(mv) => {
                let commands = session.opponent_move(mv);
                self.apply(timers, epoch, commands);
            }
            SessionInput::SetPlayerTurn(turn) => {
                let commands = session.set_player_turn(turn);
                self.apply(timers, epoch, commands);
            }
            SessionInput::EnableGameMode => session.enable_game_mode(),
            SessionInput::TimerFired {
                epoch: fired,
                slot,
                token,
            } => {
                if fired != epoch {
                    debug!("Dropping {:?} timer from session {}", slot, fired);
                    return Flow::Continue;
                }
                let relayed = match session.machine().phase() {
                    Phase::OpponentConfirming { mv } if slot == TimerSlot::OpponentConfirm => {
                        Some(mv)
                    }
                    _ => None,
                };
                let commands = session.on_timer(slot, token);
                self.apply(timers, epoch, commands);
                if let Some(mv) = relayed {
                    if !session.machine().opponent_move_pending() {
                        self.emit(BridgeEvent::OpponentMoveMirrored { mv });
                    }
                }
            }
            SessionInput::Submitted {
                epoch: submitted,
                mv,
                accepted,
            } => {
                if submitted != epoch {
                    debug!("Dropping result for {} from session {}", mv, submitted);
                    return Flow::Continue;
                }
                session.record_submission(mv, accepted);
                self.emit(BridgeEvent::MoveSubmitted { mv, accepted });
            }
            SessionInput::Shutdown => return Flow::Shutdown,
        }
        Flow::Continue
    }

    fn apply(&self, timers: &mut TimerSlots, epoch: u64, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::StartTimer { slot, token, delay } => {
                    timers.schedule(slot, token, delay, self.tx.clone(), epoch);
                }
                Command::CancelTimer { slot } => timers.cancel(slot),
                Command::Submit(mv) => self.submit(mv, epoch),
            }
        }
    }

    fn submit(&self, mv: UciMove, epoch: u64) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let accepted = match client.submit_move(&mv).await {
                Ok(()) => {
                    info!("Move {} accepted", mv);
                    true
                }
                Err(e) => {
                    warn!("Move {} rejected: {}", mv, e);
                    false
                }
            };
            let _ = tx.send(SessionInput::Submitted {
                epoch,
                mv,
                accepted,
            });
        });
    }

    fn emit(&self, event: BridgeEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for bridge events");
        }
    }
}

/// Accept boards one at a time and serve each until it disconnects. Returns
/// once shutdown is requested through the endpoint's [`BridgeHandle`].
pub async fn serve(listener: TcpListener, endpoint: &mut BoardEndpoint) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            stop = endpoint.idle_input() => {
                if stop {
                    return Ok(());
                }
                continue;
            }
        };
        info!("Accepted connection from {}", peer);
        let transport = TcpTransport::new(stream);
        let result = match endpoint.config().idle_timeout {
            Some(idle) => endpoint.run(HeartbeatTransport::new(transport, idle)).await,
            None => endpoint.run(HeartbeatTransport::disabled(transport)).await,
        };
        if result.is_ok() {
            return Ok(());
        }
    }
}
