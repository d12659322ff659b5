use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of one compass sector in degrees
const SECTOR_DEGREES: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, specta::Type)]
/// One of the 8 cardinal and intercardinal compass points
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All points in clockwise order starting from north, index `i` is centered on `i * 45` degrees
    pub const ALL: [Self; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Map a heading in degrees (0 is north, clockwise) to the compass point whose sector
    /// `[center - 22.5, center + 22.5)` contains it. Any finite input is accepted and wrapped into
    /// `[0, 360)` first. Returns [None] for NaN or infinite headings.
    pub fn from_heading(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }

        let normalized = degrees.rem_euclid(360.0);
        // Shift by half a sector so every sector starts at a multiple of 45
        let sector = ((normalized + SECTOR_DEGREES / 2.0) / SECTOR_DEGREES).floor() as usize;

        Some(Self::ALL[sector % Self::ALL.len()])
    }

    /// The heading this point is centered on
    pub fn center_degrees(&self) -> f64 {
        // Discriminants follow the clockwise order of ALL
        (*self as usize) as f64 * SECTOR_DEGREES
    }

    /// Human readable label shown on the live screen
    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::NorthEast => "North East",
            Direction::East => "East",
            Direction::SouthEast => "South East",
            Direction::South => "South",
            Direction::SouthWest => "South West",
            Direction::West => "West",
            Direction::NorthWest => "North West",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
