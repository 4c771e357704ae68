//! LED output: rank-derived default highlighting plus explicit overrides.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::time::Duration;

use crate::core::config::PULSE_INTERVAL;
use crate::core::position::{Coordinate, PositionMap};
use crate::core::snapshot::SensorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum LedColor {
    Red,
    Green,
    Yellow,
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedInstruction {
    pub coordinate: Coordinate,
    pub color: LedColor,
    pub blink: bool,
}

/// Shared yellow/orange pulse for empty starting squares.
#[derive(Debug, Clone, Copy)]
pub struct PulseClock {
    interval: Duration,
    phase: bool,
    last_flip: Duration,
}

impl PulseClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            phase: false,
            last_flip: Duration::ZERO,
        }
    }

    /// Pulse color at `now` (time since the session started). Flips once more
    /// than one interval has passed since the previous flip.
    pub fn color_at(&mut self, now: Duration) -> LedColor {
        if now.saturating_sub(self.last_flip) > self.interval {
            self.phase = !self.phase;
            self.last_flip = now;
        }
        if self.phase {
            LedColor::Yellow
        } else {
            LedColor::Orange
        }
    }
}

impl Default for PulseClock {
    fn default() -> Self {
        Self::new(PULSE_INTERVAL)
    }
}

/// Default layer for the setup phase: empty starting squares pulse, pieces
/// standing on ranks 3 to 6 are red.
pub fn default_layer(
    map: &PositionMap,
    snapshot: &SensorSnapshot,
    pulse: LedColor,
) -> Vec<LedInstruction> {
    snapshot
        .cells()
        .filter_map(|(cell, occupied)| {
            let coordinate = map.coordinate_for_cell(cell);
            match (coordinate.is_boundary_rank(), occupied) {
                (true, false) => Some(LedInstruction {
                    coordinate,
                    color: pulse,
                    blink: true,
                }),
                (false, true) => Some(LedInstruction {
                    coordinate,
                    color: LedColor::Red,
                    blink: false,
                }),
                _ => None,
            }
        })
        .collect()
}

/// Override layer asserted by the move logic. One entry per square, last
/// write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedPlan {
    overrides: BTreeMap<Coordinate, (LedColor, bool)>,
}

impl LedPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, coordinate: Coordinate, color: LedColor, blink: bool) {
        self.overrides.insert(coordinate, (color, blink));
    }

    pub fn clear(&mut self, coordinate: Coordinate) {
        self.overrides.remove(&coordinate);
    }

    pub fn clear_all(&mut self) {
        self.overrides.clear();
    }

    pub fn get(&self, coordinate: Coordinate) -> Option<LedInstruction> {
        self.overrides
            .get(&coordinate)
            .map(|&(color, blink)| LedInstruction {
                coordinate,
                color,
                blink,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn instructions(&self) -> impl Iterator<Item = LedInstruction> + '_ {
        self.overrides
            .iter()
            .map(|(&coordinate, &(color, blink))| LedInstruction {
                coordinate,
                color,
                blink,
            })
    }

    /// Union of `defaults` and the overrides. A square present in both takes
    /// the override unchanged; the default is dropped, not blended.
    pub fn merge(&self, defaults: &[LedInstruction]) -> Vec<LedInstruction> {
        let mut merged: BTreeMap<Coordinate, LedInstruction> = defaults
            .iter()
            .map(|instruction| (instruction.coordinate, *instruction))
            .collect();
        for instruction in self.instructions() {
            merged.insert(instruction.coordinate, instruction);
        }
        merged.into_values().collect()
    }
}
