//! Per-cell transitions between two sensor snapshots.

use alloc::vec::Vec;

use crate::core::position::{CellAddress, Coordinate, PositionMap};
use crate::core::snapshot::SensorSnapshot;

/// Direction of a sensor change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Occupied -> empty.
    Lift,
    /// Empty -> occupied.
    Place,
}

/// One reed switch flipping between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub cell: CellAddress,
    pub coordinate: Coordinate,
    pub from_state: bool,
    pub to_state: bool,
}

impl Transition {
    pub fn lift(coordinate: Coordinate, map: &PositionMap) -> Self {
        Self {
            cell: map.cell_for_coordinate(coordinate),
            coordinate,
            from_state: true,
            to_state: false,
        }
    }

    pub fn place(coordinate: Coordinate, map: &PositionMap) -> Self {
        Self {
            cell: map.cell_for_coordinate(coordinate),
            coordinate,
            from_state: false,
            to_state: true,
        }
    }

    pub fn edge(&self) -> Edge {
        if self.to_state {
            Edge::Place
        } else {
            Edge::Lift
        }
    }
}

/// Transitions from `previous` to `current`, in chip -> port -> pin order.
///
/// Without a previous snapshot (first frame of a connection) nothing is
/// reported.
pub fn diff(
    map: &PositionMap,
    previous: Option<&SensorSnapshot>,
    current: &SensorSnapshot,
) -> Vec<Transition> {
    let Some(previous) = previous else {
        return Vec::new();
    };
    let mut changed = previous.bits() ^ current.bits();
    let mut transitions = Vec::with_capacity(changed.count_ones() as usize);
    while changed != 0 {
        let slot = changed.trailing_zeros() as usize;
        changed &= changed - 1;
        let cell = CellAddress::from_slot(slot);
        transitions.push(Transition {
            cell,
            coordinate: map.coordinate_for_cell(cell),
            from_state: previous.is_occupied(cell),
            to_state: current.is_occupied(cell),
        });
    }
    transitions
}
