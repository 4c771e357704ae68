//! Move detection: turns sensor transitions into committed moves and mirrors
//! opponent moves onto the physical board.
//!
//! The machine never sleeps or does I/O. Anything that has to happen later or
//! elsewhere is returned as a [`Command`]; the caller schedules timers, calls
//! back into [`MoveStateMachine::on_timer`] when they expire, and reports the
//! outcome of a submission through [`MoveStateMachine::record_submission`].

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use log::{debug, info, trace, warn};

use crate::core::config::SessionConfig;
use crate::core::diff::{Edge, Transition};
use crate::core::led::{LedColor, LedPlan};
use crate::core::position::{Coordinate, PositionMap, UciMove};
use crate::core::snapshot::SensorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Own piece lifted, waiting for it to be set down elsewhere.
    AwaitingPlacement { source: Coordinate },
    /// Piece set down on an empty square; commit timer running.
    ConfirmingMove { source: Coordinate, target: Coordinate },
    /// Piece set down on an occupied square; waiting for the captured piece
    /// to come off and the capturing piece to go back on.
    CaptureAwaitingRemoval { source: Coordinate, target: Coordinate },
    OpponentAwaitingLift { mv: UciMove },
    OpponentAwaitingPlacement { mv: UciMove },
    OpponentConfirming { mv: UciMove },
}

impl Phase {
    fn is_player_move(&self) -> bool {
        matches!(
            self,
            Phase::AwaitingPlacement { .. }
                | Phase::ConfirmingMove { .. }
                | Phase::CaptureAwaitingRemoval { .. }
        )
    }
}

/// Independent single-shot timers. Each slot holds at most one live timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    MoveConfirm,
    OpponentConfirm,
    CaptureNotice,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 3] = [
        TimerSlot::MoveConfirm,
        TimerSlot::OpponentConfirm,
        TimerSlot::CaptureNotice,
    ];

    pub fn index(self) -> usize {
        match self {
            TimerSlot::MoveConfirm => 0,
            TimerSlot::OpponentConfirm => 1,
            TimerSlot::CaptureNotice => 2,
        }
    }
}

/// Identifies one scheduling of a timer. Expiries carrying any other token
/// for the slot are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Schedule `slot` to expire after `delay`, replacing any earlier timer.
    StartTimer {
        slot: TimerSlot,
        token: TimerToken,
        delay: Duration,
    },
    CancelTimer { slot: TimerSlot },
    /// Hand the move to the game session.
    Submit(UciMove),
}

pub struct MoveStateMachine {
    phase: Phase,
    plan: LedPlan,
    occupied: u64,
    is_player_turn: bool,
    opponent_move_pending: bool,
    awaiting_submission: Option<UciMove>,
    capture_removal_registered: bool,
    timers: [Option<TimerToken>; 3],
    next_token: u64,
    confirm_delay: Duration,
    capture_notice_delay: Duration,
}

impl MoveStateMachine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: Phase::Idle,
            plan: LedPlan::new(),
            occupied: 0,
            is_player_turn: false,
            opponent_move_pending: false,
            awaiting_submission: None,
            capture_removal_registered: false,
            timers: [None; 3],
            next_token: 0,
            confirm_delay: config.confirm_delay,
            capture_notice_delay: config.capture_notice_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan(&self) -> &LedPlan {
        &self.plan
    }

    pub fn is_player_turn(&self) -> bool {
        self.is_player_turn
    }

    pub fn opponent_move_pending(&self) -> bool {
        self.opponent_move_pending
    }

    pub fn awaiting_submission(&self) -> Option<UciMove> {
        self.awaiting_submission
    }

    pub fn active_timer(&self, slot: TimerSlot) -> Option<TimerToken> {
        self.timers[slot.index()]
    }

    pub fn is_occupied(&self, square: Coordinate) -> bool {
        self.occupied & (1u64 << square.index()) != 0
    }

    /// Replace the tracked occupancy with what the sensors report.
    pub fn sync_occupancy(&mut self, map: &PositionMap, snapshot: &SensorSnapshot) {
        self.occupied = snapshot
            .occupied_squares(map)
            .fold(0u64, |bits, square| bits | (1u64 << square.index()));
    }

    /// Drop the move session: timers, overrides, phase and turn flags.
    pub fn reset(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        for slot in TimerSlot::ALL {
            self.cancel_timer(slot, &mut commands);
        }
        self.plan.clear_all();
        self.is_player_turn = false;
        self.opponent_move_pending = false;
        self.awaiting_submission = None;
        self.capture_removal_registered = false;
        self.enter(Phase::Idle);
        commands
    }

    pub fn set_player_turn(&mut self, turn: bool) -> Vec<Command> {
        let mut commands = Vec::new();
        if turn {
            if self.opponent_move_pending {
                warn!("Ignoring player turn while an opponent move is being relayed");
                return commands;
            }
            self.is_player_turn = true;
        } else {
            self.is_player_turn = false;
            if self.phase.is_player_move() {
                debug!("Turn lost mid-move; abandoning {:?}", self.phase);
                self.abandon_player_move(&mut commands);
            }
        }
        commands
    }

    /// The remote opponent moved; guide the operator through mirroring it.
    pub fn on_opponent_move(&mut self, mv: UciMove) -> Vec<Command> {
        let mut commands = Vec::new();
        for slot in TimerSlot::ALL {
            self.cancel_timer(slot, &mut commands);
        }
        self.capture_removal_registered = false;
        self.plan.clear_all();
        self.plan.set(mv.from, LedColor::Green, false);
        self.plan.set(mv.to, LedColor::Green, false);
        self.is_player_turn = false;
        self.opponent_move_pending = true;
        info!("Opponent played {}; waiting for it on the board", mv);
        self.enter(Phase::OpponentAwaitingLift { mv });
        commands
    }

    pub fn on_transition(&mut self, transition: &Transition) -> Vec<Command> {
        let mut commands = Vec::new();
        let square = transition.coordinate;
        let was_occupied = self.is_occupied(square);

        if self.opponent_move_pending {
            self.relay_transition(square, transition.edge(), &mut commands);
        } else if self.is_player_turn && self.awaiting_submission.is_none() {
            self.player_transition(square, transition.edge(), was_occupied, &mut commands);
        } else {
            trace!("Ignoring {:?} on {} outside the player's turn", transition.edge(), square);
        }

        if transition.to_state {
            self.occupied |= 1u64 << square.index();
        } else {
            self.occupied &= !(1u64 << square.index());
        }
        commands
    }

    /// A timer scheduled through [`Command::StartTimer`] expired.
    pub fn on_timer(&mut self, slot: TimerSlot, token: TimerToken) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.timers[slot.index()] != Some(token) {
            trace!("Stale {:?} timer {:?}", slot, token);
            return commands;
        }
        self.timers[slot.index()] = None;

        match (slot, self.phase) {
            (TimerSlot::MoveConfirm, Phase::ConfirmingMove { source, target }) => {
                let mv = UciMove::new(source, target);
                info!("Move {} confirmed", mv);
                self.cancel_timer(TimerSlot::CaptureNotice, &mut commands);
                self.capture_removal_registered = false;
                self.plan.clear_all();
                self.awaiting_submission = Some(mv);
                self.enter(Phase::Idle);
                commands.push(Command::Submit(mv));
            }
            (TimerSlot::OpponentConfirm, Phase::OpponentConfirming { mv }) => {
                info!("Opponent move {} mirrored on the board", mv);
                self.plan.clear_all();
                self.opponent_move_pending = false;
                self.is_player_turn = true;
                self.enter(Phase::Idle);
            }
            (TimerSlot::CaptureNotice, Phase::CaptureAwaitingRemoval { target, .. }) => {
                debug!("Captured piece on {} removed", target);
                self.capture_removal_registered = true;
            }
            (slot, phase) => {
                trace!("{:?} timer fired in {:?}; nothing to do", slot, phase);
            }
        }
        commands
    }

    /// Outcome of the [`Command::Submit`] for `mv`.
    pub fn record_submission(&mut self, mv: UciMove, accepted: bool) {
        if self.awaiting_submission == Some(mv) {
            self.awaiting_submission = None;
        }
        if accepted {
            self.is_player_turn = false;
        } else {
            warn!("Move {} was rejected; repeat it on the board", mv);
        }
    }

    /// One-line description of what the board expects next.
    pub fn status(&self) -> String {
        match self.phase {
            Phase::Idle => {
                if let Some(mv) = self.awaiting_submission {
                    alloc::format!("Submitting {}", mv)
                } else if self.is_player_turn {
                    String::from("Your move")
                } else {
                    String::from("Waiting for opponent")
                }
            }
            Phase::AwaitingPlacement { source } => alloc::format!("Piece lifted from {}", source),
            Phase::ConfirmingMove { source, target } => {
                alloc::format!("Confirming {}{}", source, target)
            }
            Phase::CaptureAwaitingRemoval { target, .. } if self.capture_removal_registered => {
                alloc::format!("Capture on {} registered, set your piece down", target)
            }
            Phase::CaptureAwaitingRemoval { target, .. } => {
                alloc::format!("Capture on {}: remove the captured piece", target)
            }
            Phase::OpponentAwaitingLift { mv } => {
                alloc::format!("Opponent played {}: lift the piece on {}", mv, mv.from)
            }
            Phase::OpponentAwaitingPlacement { mv } => {
                alloc::format!("Opponent played {}: place it on {}", mv, mv.to)
            }
            Phase::OpponentConfirming { mv } => alloc::format!("Confirming opponent move {}", mv),
        }
    }

    fn player_transition(
        &mut self,
        square: Coordinate,
        edge: Edge,
        was_occupied: bool,
        commands: &mut Vec<Command>,
    ) {
        match (self.phase, edge) {
            (Phase::Idle, Edge::Lift) => {
                self.plan.clear_all();
                self.plan.set(square, LedColor::Green, true);
                self.enter(Phase::AwaitingPlacement { source: square });
            }
            (Phase::AwaitingPlacement { source }, Edge::Place) if square == source => {
                trace!("Piece returned to {}", source);
            }
            (Phase::AwaitingPlacement { source }, Edge::Place) => {
                self.plan.set(square, LedColor::Green, true);
                if was_occupied {
                    self.capture_removal_registered = false;
                    self.enter(Phase::CaptureAwaitingRemoval {
                        source,
                        target: square,
                    });
                } else {
                    self.start_timer(TimerSlot::MoveConfirm, self.confirm_delay, commands);
                    self.enter(Phase::ConfirmingMove {
                        source,
                        target: square,
                    });
                }
            }
            (Phase::CaptureAwaitingRemoval { target, .. }, Edge::Lift) if square == target => {
                self.start_timer(TimerSlot::CaptureNotice, self.capture_notice_delay, commands);
            }
            (Phase::CaptureAwaitingRemoval { source, target }, Edge::Place) if square == target => {
                self.cancel_timer(TimerSlot::CaptureNotice, commands);
                self.capture_removal_registered = false;
                self.start_timer(TimerSlot::MoveConfirm, self.confirm_delay, commands);
                self.enter(Phase::ConfirmingMove { source, target });
            }
            (Phase::ConfirmingMove { source, target }, Edge::Lift) if square == target => {
                self.cancel_timer(TimerSlot::MoveConfirm, commands);
                self.plan.clear(target);
                self.enter(Phase::AwaitingPlacement { source });
            }
            (phase, edge) => {
                trace!("Ignoring {:?} on {} in {:?}", edge, square, phase);
            }
        }
    }

    fn relay_transition(&mut self, square: Coordinate, edge: Edge, commands: &mut Vec<Command>) {
        match (self.phase, edge) {
            (Phase::OpponentAwaitingLift { mv }, Edge::Lift) if square == mv.from => {
                self.plan.set(mv.from, LedColor::Green, true);
                self.enter(Phase::OpponentAwaitingPlacement { mv });
            }
            (Phase::OpponentAwaitingPlacement { mv }, Edge::Place) if square == mv.to => {
                self.plan.set(mv.to, LedColor::Green, true);
                self.start_timer(TimerSlot::OpponentConfirm, self.confirm_delay, commands);
                self.enter(Phase::OpponentConfirming { mv });
            }
            (Phase::OpponentConfirming { mv }, Edge::Lift) if square == mv.to => {
                self.cancel_timer(TimerSlot::OpponentConfirm, commands);
                self.plan.set(mv.to, LedColor::Green, false);
                self.enter(Phase::OpponentAwaitingPlacement { mv });
            }
            (phase, edge) => {
                trace!("Ignoring {:?} on {} while relaying ({:?})", edge, square, phase);
            }
        }
    }

    fn abandon_player_move(&mut self, commands: &mut Vec<Command>) {
        self.cancel_timer(TimerSlot::MoveConfirm, commands);
        self.cancel_timer(TimerSlot::CaptureNotice, commands);
        self.capture_removal_registered = false;
        self.plan.clear_all();
        self.enter(Phase::Idle);
    }

    fn start_timer(&mut self, slot: TimerSlot, delay: Duration, commands: &mut Vec<Command>) {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timers[slot.index()] = Some(token);
        commands.push(Command::StartTimer { slot, token, delay });
    }

    fn cancel_timer(&mut self, slot: TimerSlot, commands: &mut Vec<Command>) {
        if self.timers[slot.index()].take().is_some() {
            commands.push(Command::CancelTimer { slot });
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("{:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }
}
