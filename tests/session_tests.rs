use std::time::Duration;

use chessboard_bridge::{
    BoardSession, Command, Coordinate, FrameEvent, InboundFrame, LedColor, LedWire, PositionMap,
    SensorSnapshot, SessionConfig, TimerSlot, UciMove,
};

fn sq(s: &str) -> Coordinate {
    s.parse().unwrap()
}

fn session() -> (BoardSession, PositionMap) {
    let map = PositionMap::standard().unwrap();
    (BoardSession::new(map.clone(), &SessionConfig::default()), map)
}

fn reed(snapshot: SensorSnapshot) -> InboundFrame {
    InboundFrame::new(FrameEvent::ReedChange, snapshot)
}

#[test]
fn status_before_first_frame() {
    let (session, _) = session();
    assert_eq!(session.status(), "Waiting for sensor data");
    assert!(session.last_snapshot().is_none());
}

#[test]
fn first_frame_always_gets_an_answer() {
    let (mut session, map) = session();
    let snapshot = SensorSnapshot::starting_position(&map).with_square(&map, sq("e4"), true);
    let outcome = session.handle_frame(&InboundFrame::bare(snapshot), Duration::ZERO);

    let response = outcome.response.expect("first frame must be answered");
    assert_eq!(response.status, "Piece on wrong square: e4");
    assert_eq!(
        response.leds,
        vec![LedWire {
            led: 52,
            color: LedColor::Red,
            blink: false
        }]
    );
    assert!(!outcome.board_ready);
}

#[test]
fn leds_are_sorted_by_index() {
    let (mut session, map) = session();
    let outcome = session.handle_frame(
        &InboundFrame::bare(SensorSnapshot::empty()),
        Duration::ZERO,
    );
    let leds = outcome.response.unwrap().leds;
    assert_eq!(leds.len(), 32);
    assert!(leds.windows(2).all(|pair| pair[0].led < pair[1].led));
    assert!(leds.iter().all(|led| led.color == LedColor::Orange && led.blink));
    assert_eq!(leds[0].led, map.led_for_coordinate(sq("a1")));
}

#[test]
fn ready_edge_is_reported_once() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);

    let not_yet = start.with_square(&map, sq("a1"), false);
    assert!(!session.handle_frame(&reed(not_yet), Duration::ZERO).board_ready);

    let outcome = session.handle_frame(&reed(start), Duration::ZERO);
    assert!(outcome.board_ready);
    assert!(session.is_ready());
    let response = outcome.response.unwrap();
    assert!(response.leds.is_empty());
    assert_eq!(response.status, "Ready to play");

    assert!(!session.handle_frame(&reed(start), Duration::ZERO).board_ready);
}

#[test]
fn setup_mode_answers_every_reed_change() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&reed(start), Duration::ZERO);
    assert!(session.handle_frame(&reed(start), Duration::ZERO).response.is_some());
    assert!(session.handle_frame(&reed(start), Duration::ZERO).response.is_some());
}

#[test]
fn unchanged_untagged_frames_are_suppressed() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    assert!(session.handle_frame(&InboundFrame::bare(start), Duration::ZERO).response.is_some());
    assert!(session.handle_frame(&InboundFrame::bare(start), Duration::ZERO).response.is_none());

    let changed = start.with_square(&map, sq("e2"), false);
    assert!(session.handle_frame(&InboundFrame::bare(changed), Duration::ZERO).response.is_some());
}

#[test]
fn pulse_changes_trigger_an_answer() {
    let (mut session, map) = session();
    let missing = SensorSnapshot::starting_position(&map).with_square(&map, sq("e2"), false);
    session.handle_frame(&InboundFrame::bare(missing), Duration::ZERO);
    assert!(session
        .handle_frame(&InboundFrame::bare(missing), Duration::from_millis(100))
        .response
        .is_none());

    let response = session
        .handle_frame(&InboundFrame::bare(missing), Duration::from_millis(250))
        .response
        .expect("pulse flip changes the LED output");
    assert_eq!(response.leds[0].color, LedColor::Yellow);
}

#[test]
fn reed_changes_off_turn_are_suppressed_in_game_mode() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&InboundFrame::new(FrameEvent::PhaseChange, start), Duration::ZERO);
    session.enable_game_mode();

    session.handle_frame(&reed(start), Duration::ZERO);
    assert!(session.handle_frame(&reed(start), Duration::ZERO).response.is_none());

    let heartbeat = InboundFrame::new(FrameEvent::Heartbeat, start);
    let response = session.handle_frame(&heartbeat, Duration::ZERO).response.unwrap();
    assert_eq!(response.status, "Waiting for opponent");
    assert!(response.leds.is_empty());
}

#[test]
fn game_mode_hides_setup_highlighting() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&reed(start), Duration::ZERO);
    session.enable_game_mode();
    session.set_player_turn(true);

    // A piece in the middle of the board is normal during a game.
    let moved = start
        .with_square(&map, sq("e2"), false)
        .with_square(&map, sq("e4"), true);
    let outcome = session.handle_frame(&reed(moved), Duration::ZERO);
    let response = outcome.response.unwrap();
    assert!(response.leds.iter().all(|led| led.color == LedColor::Green));
    assert!(!outcome.board_ready);
}

#[test]
fn move_is_detected_from_frames() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&reed(start), Duration::ZERO);
    session.enable_game_mode();
    session.set_player_turn(true);

    let lifted = start.with_square(&map, sq("e2"), false);
    let outcome = session.handle_frame(&reed(lifted), Duration::ZERO);
    assert!(outcome.commands.is_empty());
    let response = outcome.response.unwrap();
    assert_eq!(response.status, "Piece lifted from e2");
    assert_eq!(
        response.leds,
        vec![LedWire {
            led: 22,
            color: LedColor::Green,
            blink: true
        }]
    );

    let placed = lifted.with_square(&map, sq("e4"), true);
    let outcome = session.handle_frame(&reed(placed), Duration::ZERO);
    let token = match outcome.commands.as_slice() {
        [Command::StartTimer {
            slot: TimerSlot::MoveConfirm,
            token,
            ..
        }] => *token,
        other => panic!("unexpected commands {:?}", other),
    };
    assert_eq!(outcome.response.unwrap().leds.len(), 2);

    let mv: UciMove = "e2e4".parse().unwrap();
    assert_eq!(
        session.on_timer(TimerSlot::MoveConfirm, token),
        vec![Command::Submit(mv)]
    );
    session.record_submission(mv, true);
    assert_eq!(session.status(), "Waiting for opponent");
}

#[test]
fn capture_is_confirmed_when_the_captured_piece_is_lifted_second() {
    let (mut session, map) = session();
    let before = SensorSnapshot::starting_position(&map)
        .with_square(&map, sq("e2"), false)
        .with_square(&map, sq("e4"), true)
        .with_square(&map, sq("d7"), false)
        .with_square(&map, sq("d5"), true);
    session.handle_frame(&reed(before), Duration::ZERO);
    session.enable_game_mode();
    session.set_player_turn(true);

    let own_lifted = before.with_square(&map, sq("e4"), false);
    session.handle_frame(&reed(own_lifted), Duration::ZERO);
    let both_lifted = own_lifted.with_square(&map, sq("d5"), false);
    session.handle_frame(&reed(both_lifted), Duration::ZERO);

    let placed = both_lifted.with_square(&map, sq("d5"), true);
    let outcome = session.handle_frame(&reed(placed), Duration::ZERO);
    let token = match outcome.commands.as_slice() {
        [Command::StartTimer {
            slot: TimerSlot::MoveConfirm,
            token,
            ..
        }] => *token,
        other => panic!("unexpected commands {:?}", other),
    };
    assert_eq!(session.status(), "Confirming e4d5");
    assert_eq!(
        session.on_timer(TimerSlot::MoveConfirm, token),
        vec![Command::Submit("e4d5".parse().unwrap())]
    );
}

#[test]
fn lifting_the_captured_piece_first_stalls_the_move() {
    let (mut session, map) = session();
    let before = SensorSnapshot::starting_position(&map)
        .with_square(&map, sq("e2"), false)
        .with_square(&map, sq("e4"), true)
        .with_square(&map, sq("d7"), false)
        .with_square(&map, sq("d5"), true);
    session.handle_frame(&reed(before), Duration::ZERO);
    session.enable_game_mode();
    session.set_player_turn(true);

    // The first lift is taken as the moving piece.
    let captured_lifted = before.with_square(&map, sq("d5"), false);
    session.handle_frame(&reed(captured_lifted), Duration::ZERO);
    let both_lifted = captured_lifted.with_square(&map, sq("e4"), false);
    session.handle_frame(&reed(both_lifted), Duration::ZERO);
    let outcome = session.handle_frame(
        &reed(both_lifted.with_square(&map, sq("d5"), true)),
        Duration::ZERO,
    );
    assert!(outcome.commands.is_empty());
    assert_eq!(session.status(), "Piece lifted from d5");
}

#[test]
fn returning_to_start_in_game_mode_does_not_reset() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&reed(start), Duration::ZERO);
    session.enable_game_mode();
    session.opponent_move("e7e5".parse().unwrap());

    session.handle_frame(&reed(start.with_square(&map, sq("a1"), false)), Duration::ZERO);
    let outcome = session.handle_frame(&reed(start), Duration::ZERO);
    assert!(!outcome.board_ready);
    assert!(session.machine().opponent_move_pending());
    assert_eq!(outcome.response.unwrap().leds.len(), 2);
}

#[test]
fn teardown_cancels_pending_timers() {
    let (mut session, map) = session();
    let start = SensorSnapshot::starting_position(&map);
    session.handle_frame(&reed(start), Duration::ZERO);
    session.enable_game_mode();
    session.set_player_turn(true);
    let lifted = start.with_square(&map, sq("e2"), false);
    session.handle_frame(&reed(lifted), Duration::ZERO);
    session.handle_frame(&reed(lifted.with_square(&map, sq("e3"), true)), Duration::ZERO);

    assert_eq!(
        session.teardown(),
        vec![Command::CancelTimer {
            slot: TimerSlot::MoveConfirm
        }]
    );
}
