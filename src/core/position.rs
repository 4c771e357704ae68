//! Board geometry: squares, sensor cell addresses and the lookup table
//! joining them to LED indices.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::core::common::BoardError;
use crate::core::config::{
    LED_SQUARES, MAX_LED_INDEX, NUM_CELLS, NUM_CHIPS, PINS_PER_PORT, PORTS_PER_CHIP, WIRING,
};

/// An algebraic square, `a1`..`h8`.
///
/// Ordering is rank-major so iteration runs `a1, b1, .., h8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    rank: u8,
    file: u8,
}

impl Coordinate {
    /// Build from zero-based file (0 = a) and rank (0 = rank 1).
    pub fn new(file: u8, rank: u8) -> Result<Self, BoardError> {
        if file >= 8 || rank >= 8 {
            return Err(BoardError::InvalidSquare);
        }
        Ok(Self { rank, file })
    }

    /// Square at `index` in rank-major order. Indices wrap modulo 64.
    pub fn from_index(index: usize) -> Self {
        let index = index % NUM_CELLS;
        Self {
            rank: (index / 8) as u8,
            file: (index % 8) as u8,
        }
    }

    pub fn index(self) -> usize {
        self.rank as usize * 8 + self.file as usize
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    /// Rank number as printed on the board, 1..=8.
    pub fn rank_number(self) -> u8 {
        self.rank + 1
    }

    /// Ranks 1, 2, 7 and 8 hold pieces in the starting position.
    pub fn is_boundary_rank(self) -> bool {
        matches!(self.rank, 0 | 1 | 6 | 7)
    }

    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..NUM_CELLS).map(Coordinate::from_index)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_number())
    }
}

impl FromStr for Coordinate {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(BoardError::InvalidSquare);
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Coordinate::new(file, rank)
    }
}

/// Port of an MCP23017 expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    A,
    B,
}

impl Port {
    pub fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Port::A => "PA",
            Port::B => "PB",
        }
    }

    fn from_index(index: usize) -> Self {
        if index == 0 {
            Port::A
        } else {
            Port::B
        }
    }
}

impl FromStr for Port {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PA" => Ok(Port::A),
            "PB" => Ok(Port::B),
            _ => Err(BoardError::InvalidPort),
        }
    }
}

/// One reed switch, addressed the way the board firmware reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    chip: u8,
    port: Port,
    pin: u8,
}

impl CellAddress {
    /// `chip` is zero-based (0 = `MCP1`), `pin` is 0..=7.
    pub fn new(chip: u8, port: Port, pin: u8) -> Result<Self, BoardError> {
        if chip as usize >= NUM_CHIPS {
            return Err(BoardError::InvalidChip);
        }
        if pin as usize >= PINS_PER_PORT {
            return Err(BoardError::InvalidPin);
        }
        Ok(Self { chip, port, pin })
    }

    /// Parse the firmware's names, e.g. `("MCP2", "PB", "PB5")`.
    pub fn parse(chip: &str, port: &str, pin: &str) -> Result<Self, BoardError> {
        let chip_no: u8 = chip
            .strip_prefix("MCP")
            .and_then(|n| n.parse().ok())
            .ok_or(BoardError::InvalidChip)?;
        if chip_no == 0 {
            return Err(BoardError::InvalidChip);
        }
        let port: Port = port.parse()?;
        let pin_no: u8 = pin
            .strip_prefix(port.name())
            .and_then(|n| n.parse().ok())
            .ok_or(BoardError::InvalidPin)?;
        CellAddress::new(chip_no - 1, port, pin_no)
    }

    /// Position in the fixed chip -> port -> pin enumeration.
    pub fn slot(self) -> usize {
        (self.chip as usize * PORTS_PER_CHIP + self.port.index()) * PINS_PER_PORT
            + self.pin as usize
    }

    /// Inverse of [`CellAddress::slot`]. Slots wrap modulo 64.
    pub fn from_slot(slot: usize) -> Self {
        let slot = slot % NUM_CELLS;
        Self {
            chip: (slot / (PORTS_PER_CHIP * PINS_PER_PORT)) as u8,
            port: Port::from_index((slot / PINS_PER_PORT) % PORTS_PER_CHIP),
            pin: (slot % PINS_PER_PORT) as u8,
        }
    }

    pub fn all() -> impl Iterator<Item = CellAddress> {
        (0..NUM_CELLS).map(CellAddress::from_slot)
    }

    pub fn chip(self) -> u8 {
        self.chip
    }

    pub fn port(self) -> Port {
        self.port
    }

    pub fn pin(self) -> u8 {
        self.pin
    }

    pub fn chip_name(self) -> String {
        alloc::format!("MCP{}", self.chip + 1)
    }

    pub fn pin_name(self) -> String {
        alloc::format!("{}{}", self.port.name(), self.pin)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCP{}/{}{}", self.chip + 1, self.port.name(), self.pin)
    }
}

/// Precomputed cell <-> LED <-> square table. Built once, then read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMap {
    led_by_slot: [u8; NUM_CELLS],
    coord_by_slot: [Coordinate; NUM_CELLS],
    slot_by_coord: [u8; NUM_CELLS],
    slot_by_led: [Option<u8>; MAX_LED_INDEX as usize + 1],
}

impl PositionMap {
    /// The board as shipped.
    pub fn standard() -> Result<Self, BoardError> {
        Self::from_tables(&WIRING, &LED_SQUARES)
    }

    /// Build from a pin -> LED table and an LED -> square table. Both must be
    /// one-to-one and cover all 64 cells.
    pub fn from_tables(
        wiring: &[[[u8; PINS_PER_PORT]; PORTS_PER_CHIP]; NUM_CHIPS],
        squares: &[(u8, &str)],
    ) -> Result<Self, BoardError> {
        let mut led_by_slot = [0u8; NUM_CELLS];
        let mut slot_by_led = [None; MAX_LED_INDEX as usize + 1];
        for cell in CellAddress::all() {
            let led = wiring[cell.chip as usize][cell.port.index()][cell.pin as usize];
            if led == 0 || led > MAX_LED_INDEX || slot_by_led[led as usize].is_some() {
                return Err(BoardError::InconsistentWiring);
            }
            led_by_slot[cell.slot()] = led;
            slot_by_led[led as usize] = Some(cell.slot() as u8);
        }

        let mut coord_by_slot = [Coordinate::from_index(0); NUM_CELLS];
        let mut slot_by_coord = [0u8; NUM_CELLS];
        let mut slot_seen = [false; NUM_CELLS];
        let mut coord_seen = [false; NUM_CELLS];
        for &(led, square) in squares {
            let coordinate: Coordinate = square.parse()?;
            let slot = slot_by_led
                .get(led as usize)
                .copied()
                .flatten()
                .ok_or(BoardError::UnknownLed(led))? as usize;
            if slot_seen[slot] || coord_seen[coordinate.index()] {
                return Err(BoardError::InconsistentWiring);
            }
            slot_seen[slot] = true;
            coord_seen[coordinate.index()] = true;
            coord_by_slot[slot] = coordinate;
            slot_by_coord[coordinate.index()] = slot as u8;
        }
        if slot_seen.iter().any(|seen| !seen) {
            return Err(BoardError::InconsistentWiring);
        }

        Ok(Self {
            led_by_slot,
            coord_by_slot,
            slot_by_coord,
            slot_by_led,
        })
    }

    pub fn led_for_cell(&self, cell: CellAddress) -> u8 {
        self.led_by_slot[cell.slot()]
    }

    pub fn coordinate_for_cell(&self, cell: CellAddress) -> Coordinate {
        self.coord_by_slot[cell.slot()]
    }

    pub fn cell_for_coordinate(&self, coordinate: Coordinate) -> CellAddress {
        CellAddress::from_slot(self.slot_by_coord[coordinate.index()] as usize)
    }

    pub fn led_for_coordinate(&self, coordinate: Coordinate) -> u8 {
        self.led_for_cell(self.cell_for_coordinate(coordinate))
    }

    pub fn cell_for_led(&self, led: u8) -> Option<CellAddress> {
        self.slot_by_led
            .get(led as usize)
            .copied()
            .flatten()
            .map(|slot| CellAddress::from_slot(slot as usize))
    }

    pub fn coordinate_for_led(&self, led: u8) -> Option<Coordinate> {
        self.cell_for_led(led).map(|cell| self.coordinate_for_cell(cell))
    }
}

/// A move in UCI long algebraic notation, e.g. `e2e4` or `e7e8q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Coordinate,
    pub to: Coordinate,
    pub promotion: Option<char>,
}

impl UciMove {
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece)?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(BoardError::InvalidMove);
        }
        let from: Coordinate = s[0..2].parse().map_err(|_| BoardError::InvalidMove)?;
        let to: Coordinate = s[2..4].parse().map_err(|_| BoardError::InvalidMove)?;
        if from == to {
            return Err(BoardError::InvalidMove);
        }
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(piece @ ('q' | 'r' | 'b' | 'n')) => Some(piece),
            Some(_) => return Err(BoardError::InvalidMove),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}
