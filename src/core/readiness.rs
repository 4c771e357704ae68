//! Starting-position check for the setup phase.

use alloc::string::String;
use alloc::vec::Vec;

use crate::core::position::{Coordinate, PositionMap};
use crate::core::snapshot::SensorSnapshot;

/// True when every boundary-rank square is occupied and every middle-rank
/// square is empty.
pub fn is_ready(map: &PositionMap, snapshot: &SensorSnapshot) -> bool {
    snapshot.cells().all(|(cell, occupied)| {
        let square = map.coordinate_for_cell(cell);
        occupied == square.is_boundary_rank()
    })
}

/// What still stands between the board and the starting position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Empty starting squares.
    pub missing: Vec<Coordinate>,
    /// Occupied squares on ranks 3 to 6.
    pub misplaced: Vec<Coordinate>,
}

impl SetupReport {
    pub fn evaluate(map: &PositionMap, snapshot: &SensorSnapshot) -> Self {
        let mut report = Self::default();
        for square in Coordinate::all() {
            let occupied = snapshot.is_square_occupied(map, square);
            if square.is_boundary_rank() && !occupied {
                report.missing.push(square);
            } else if !square.is_boundary_rank() && occupied {
                report.misplaced.push(square);
            }
        }
        report
    }

    pub fn is_ready(&self) -> bool {
        self.missing.is_empty() && self.misplaced.is_empty()
    }

    /// Operator-facing summary. Misplaced pieces are reported first.
    pub fn status(&self) -> String {
        if !self.misplaced.is_empty() {
            let squares: Vec<String> = self
                .misplaced
                .iter()
                .map(|square| alloc::format!("{}", square))
                .collect();
            alloc::format!("Piece on wrong square: {}", squares.join(", "))
        } else if !self.missing.is_empty() {
            String::from("Place pieces on the starting ranks")
        } else {
            String::from("Ready to play")
        }
    }
}
