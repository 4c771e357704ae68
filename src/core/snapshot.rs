//! Sensor snapshots: one occupancy bit per reed switch cell.

use crate::core::config::NUM_CELLS;
use crate::core::position::{CellAddress, Coordinate, PositionMap};

/// Occupancy of every reed switch at one instant, one bit per cell slot.
///
/// Cells a frame did not mention read as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SensorSnapshot {
    bits: u64,
}

impl SensorSnapshot {
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Snapshot with exactly the given squares occupied.
    pub fn from_occupied<I>(map: &PositionMap, squares: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut snapshot = Self::empty();
        for square in squares {
            snapshot.set(map.cell_for_coordinate(square), true);
        }
        snapshot
    }

    /// All pieces on ranks 1, 2, 7 and 8.
    pub fn starting_position(map: &PositionMap) -> Self {
        Self::from_occupied(map, Coordinate::all().filter(|c| c.is_boundary_rank()))
    }

    pub fn is_occupied(&self, cell: CellAddress) -> bool {
        self.bits & (1u64 << cell.slot()) != 0
    }

    pub fn is_square_occupied(&self, map: &PositionMap, square: Coordinate) -> bool {
        self.is_occupied(map.cell_for_coordinate(square))
    }

    pub fn set(&mut self, cell: CellAddress, occupied: bool) {
        let mask = 1u64 << cell.slot();
        if occupied {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    pub fn with(mut self, cell: CellAddress, occupied: bool) -> Self {
        self.set(cell, occupied);
        self
    }

    pub fn with_square(self, map: &PositionMap, square: Coordinate, occupied: bool) -> Self {
        self.with(map.cell_for_coordinate(square), occupied)
    }

    pub fn count_occupied(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Every cell with its bit, in chip -> port -> pin order.
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, bool)> + '_ {
        (0..NUM_CELLS).map(move |slot| {
            let cell = CellAddress::from_slot(slot);
            (cell, self.is_occupied(cell))
        })
    }

    pub fn occupied_squares<'a>(
        &'a self,
        map: &'a PositionMap,
    ) -> impl Iterator<Item = Coordinate> + 'a {
        self.cells()
            .filter(|(_, occupied)| *occupied)
            .map(move |(cell, _)| map.coordinate_for_cell(cell))
    }
}
