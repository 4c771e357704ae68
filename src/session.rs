//! Per-connection state and the frame pipeline: diff, move detection,
//! readiness, LED merge and the decision whether to answer at all.

use std::time::Duration;

use log::{debug, info};

use crate::core::{
    default_layer, diff, is_ready, Command, MoveStateMachine, PositionMap, PulseClock,
    SensorSnapshot, SessionConfig, SetupReport, TimerSlot, TimerToken, UciMove,
};
use crate::protocol::{FrameEvent, InboundFrame, LedWire, OutboundFrame};

/// Result of feeding one inbound frame through the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Frame to send back, or `None` when nothing worth sending changed.
    pub response: Option<OutboundFrame>,
    /// Timer and submission work for the caller.
    pub commands: Vec<Command>,
    /// The board just reached the starting position.
    pub board_ready: bool,
}

pub struct BoardSession {
    map: PositionMap,
    previous: Option<SensorSnapshot>,
    ready: bool,
    game_mode: bool,
    frames_seen: u64,
    last_leds: Option<Vec<LedWire>>,
    pulse: PulseClock,
    machine: MoveStateMachine,
}

impl BoardSession {
    pub fn new(map: PositionMap, config: &SessionConfig) -> Self {
        Self {
            map,
            previous: None,
            ready: false,
            game_mode: false,
            frames_seen: 0,
            last_leds: None,
            pulse: PulseClock::new(config.pulse_interval),
            machine: MoveStateMachine::new(config),
        }
    }

    pub fn map(&self) -> &PositionMap {
        &self.map
    }

    pub fn machine(&self) -> &MoveStateMachine {
        &self.machine
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_game_mode(&self) -> bool {
        self.game_mode
    }

    pub fn last_snapshot(&self) -> Option<&SensorSnapshot> {
        self.previous.as_ref()
    }

    /// Process one frame. `now` is the time since the connection opened and
    /// drives the pulse clock.
    pub fn handle_frame(&mut self, frame: &InboundFrame, now: Duration) -> FrameOutcome {
        let first = self.frames_seen == 0;
        self.frames_seen += 1;

        let mut commands = Vec::new();
        let transitions = diff(&self.map, self.previous.as_ref(), &frame.snapshot);
        if self.game_mode {
            for transition in &transitions {
                commands.extend(self.machine.on_transition(transition));
            }
        } else if !transitions.is_empty() {
            debug!("{} sensor changes during setup", transitions.len());
        }
        self.previous = Some(frame.snapshot);

        let was_ready = self.ready;
        self.ready = is_ready(&self.map, &frame.snapshot);
        let board_ready = self.ready && !was_ready && !self.game_mode;
        if board_ready {
            info!("Board is in the starting position");
            commands.extend(self.machine.reset());
        }

        let leds = self.led_output(&frame.snapshot, now);
        let response = if self.should_respond(frame.event, &leds, first) {
            self.last_leds = Some(leds.clone());
            Some(OutboundFrame {
                leds,
                status: self.status(),
            })
        } else {
            None
        };

        FrameOutcome {
            response,
            commands,
            board_ready,
        }
    }

    /// Switch from setup highlighting to move detection.
    pub fn enable_game_mode(&mut self) {
        if let Some(snapshot) = self.previous {
            self.machine.sync_occupancy(&self.map, &snapshot);
        }
        if !self.game_mode {
            info!("Game mode enabled");
        }
        self.game_mode = true;
    }

    pub fn set_player_turn(&mut self, turn: bool) -> Vec<Command> {
        self.machine.set_player_turn(turn)
    }

    pub fn opponent_move(&mut self, mv: UciMove) -> Vec<Command> {
        self.machine.on_opponent_move(mv)
    }

    pub fn on_timer(&mut self, slot: TimerSlot, token: TimerToken) -> Vec<Command> {
        self.machine.on_timer(slot, token)
    }

    pub fn record_submission(&mut self, mv: UciMove, accepted: bool) {
        self.machine.record_submission(mv, accepted);
    }

    /// Drop the move session before the connection goes away.
    pub fn teardown(&mut self) -> Vec<Command> {
        self.machine.reset()
    }

    pub fn status(&self) -> String {
        if self.game_mode {
            return self.machine.status();
        }
        match &self.previous {
            Some(snapshot) => SetupReport::evaluate(&self.map, snapshot).status(),
            None => String::from("Waiting for sensor data"),
        }
    }

    /// Merged LED list for `snapshot`, sorted by LED index. The rank-derived
    /// layer only shows during setup.
    fn led_output(&mut self, snapshot: &SensorSnapshot, now: Duration) -> Vec<LedWire> {
        let defaults = if self.game_mode {
            Vec::new()
        } else {
            default_layer(&self.map, snapshot, self.pulse.color_at(now))
        };
        let mut leds: Vec<LedWire> = self
            .machine
            .plan()
            .merge(&defaults)
            .into_iter()
            .map(|instruction| LedWire {
                led: self.map.led_for_coordinate(instruction.coordinate),
                color: instruction.color,
                blink: instruction.blink,
            })
            .collect();
        leds.sort_by_key(|led| led.led);
        leds
    }

    fn should_respond(&self, event: FrameEvent, leds: &[LedWire], first: bool) -> bool {
        if first {
            return true;
        }
        match event {
            FrameEvent::Heartbeat | FrameEvent::PhaseChange => true,
            FrameEvent::ReedChange if !self.game_mode => true,
            FrameEvent::ReedChange
                if self.machine.is_player_turn() || self.machine.opponent_move_pending() =>
            {
                true
            }
            _ => self.last_leds.as_deref() != Some(leds),
        }
    }
}
