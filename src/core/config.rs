use core::time::Duration;

/// Number of MCP23017 expanders on the board.
pub const NUM_CHIPS: usize = 4;
/// Each expander exposes two 8-bit ports, `PA` and `PB`.
pub const PORTS_PER_CHIP: usize = 2;
pub const PINS_PER_PORT: usize = 8;
/// Total number of sensor cells (and playable squares).
pub const NUM_CELLS: usize = NUM_CHIPS * PORTS_PER_CHIP * PINS_PER_PORT;
/// Highest LED index on the strip. Only 64 of them sit under a square.
pub const MAX_LED_INDEX: u8 = 120;

/// LED index wired to each pin, indexed `[chip][port][pin]` with port 0 = `PA`.
pub const WIRING: [[[u8; PINS_PER_PORT]; PORTS_PER_CHIP]; NUM_CHIPS] = [
    [
        [1, 3, 5, 7, 9, 11, 13, 15],
        [30, 28, 26, 24, 22, 20, 18, 16],
    ],
    [
        [31, 33, 35, 37, 39, 41, 43, 45],
        [60, 58, 56, 54, 52, 50, 48, 46],
    ],
    [
        [61, 63, 65, 67, 69, 71, 73, 75],
        [90, 88, 86, 84, 82, 80, 78, 76],
    ],
    [
        [91, 93, 95, 97, 99, 101, 103, 105],
        [120, 118, 116, 114, 112, 110, 108, 106],
    ],
];

/// Square lit by each wired LED. The strip snakes across the board, so even
/// ranks run from h to a.
pub const LED_SQUARES: [(u8, &str); NUM_CELLS] = [
    (1, "a1"), (3, "b1"), (5, "c1"), (7, "d1"), (9, "e1"), (11, "f1"), (13, "g1"), (15, "h1"),
    (16, "h2"), (18, "g2"), (20, "f2"), (22, "e2"), (24, "d2"), (26, "c2"), (28, "b2"), (30, "a2"),
    (31, "a3"), (33, "b3"), (35, "c3"), (37, "d3"), (39, "e3"), (41, "f3"), (43, "g3"), (45, "h3"),
    (46, "h4"), (48, "g4"), (50, "f4"), (52, "e4"), (54, "d4"), (56, "c4"), (58, "b4"), (60, "a4"),
    (61, "a5"), (63, "b5"), (65, "c5"), (67, "d5"), (69, "e5"), (71, "f5"), (73, "g5"), (75, "h5"),
    (76, "h6"), (78, "g6"), (80, "f6"), (82, "e6"), (84, "d6"), (86, "c6"), (88, "b6"), (90, "a6"),
    (91, "a7"), (93, "b7"), (95, "c7"), (97, "d7"), (99, "e7"), (101, "f7"), (103, "g7"), (105, "h7"),
    (106, "h8"), (108, "g8"), (110, "f8"), (112, "e8"), (114, "d8"), (116, "c8"), (118, "b8"), (120, "a8"),
];

/// Debounce between a placement and committing the move.
pub const CONFIRM_DELAY: Duration = Duration::from_millis(1000);
/// Delay before a captured piece's removal counts as registered.
pub const CAPTURE_NOTICE_DELAY: Duration = Duration::from_millis(1000);
/// Half period of the yellow/orange pulse on empty starting squares.
pub const PULSE_INTERVAL: Duration = Duration::from_millis(200);

pub const SERVER_HOST: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 5000;

/// Timing knobs for one board session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub confirm_delay: Duration,
    pub capture_notice_delay: Duration,
    pub pulse_interval: Duration,
}

impl SessionConfig {
    /// Use the same delay for move and capture confirmation.
    pub fn with_confirm_delay(delay: Duration) -> Self {
        Self {
            confirm_delay: delay,
            capture_notice_delay: delay,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confirm_delay: CONFIRM_DELAY,
            capture_notice_delay: CAPTURE_NOTICE_DELAY,
            pulse_interval: PULSE_INTERVAL,
        }
    }
}
