//! Track positions and the coordinates used to address map tiles.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::UNITS_PER_TILE;

/// A discrete location on the track network plus a direction of travel.
///
/// `x` and `y` are world units, `z` is the base elevation of the segment and
/// `direction` is the quarter-turn heading (0-3). Equality is exact on all
/// four fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub direction: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32, direction: u8) -> Self {
        Self { x, y, z, direction }
    }

    /// Tile bucket containing this position.
    #[must_use]
    pub const fn tile(self) -> TileCoord {
        TileCoord {
            x: self.x / UNITS_PER_TILE,
            y: self.y / UNITS_PER_TILE,
        }
    }

    /// Copy of this position at another elevation.
    #[must_use]
    pub const fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) dir {}",
            self.x, self.y, self.z, self.direction
        )
    }
}

/// Address of a map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World position of this tile's origin.
    #[must_use]
    pub const fn origin(self, z: i32, direction: u8) -> Position {
        Position {
            x: self.x * UNITS_PER_TILE,
            y: self.y * UNITS_PER_TILE,
            z,
            direction,
        }
    }
}

/// Numeric segment type code reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackType(pub u16);

/// Direction a cursor moves along the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelDirection {
    /// Toward the segment the train is about to enter.
    Next,
    /// Toward the segment the train has just left.
    Previous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_truncates_world_units() {
        let pos = Position::new(95, 64, 8, 2);
        assert_eq!(pos.tile(), TileCoord::new(2, 2));
        assert_eq!(Position::new(31, 0, 0, 0).tile(), TileCoord::new(0, 0));
    }

    #[test]
    fn equality_covers_heading() {
        let a = Position::new(32, 32, 16, 1);
        assert_ne!(a, Position::new(32, 32, 16, 3));
        assert_eq!(a.with_z(24).z, 24);
        assert_eq!(TileCoord::new(1, 1).origin(16, 1), a);
    }
}
