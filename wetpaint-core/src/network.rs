//! Seam to the host's track network.
//!
//! The host owns the map; the engine only reads tile buckets and asks for
//! traversal cursors. Platform-specific implementations provide this.
use serde::{Deserialize, Serialize};

use crate::position::{Position, TileCoord, TrackType, TravelDirection};

/// Kind discriminator for an element stored in a tile bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Track,
    Surface,
    Footpath,
    Scenery,
}

/// One element of a tile bucket as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileElement {
    pub kind: ElementKind,
    pub base_z: i32,
    pub direction: u8,
    pub track_type: TrackType,
}

impl TileElement {
    #[must_use]
    pub const fn track(base_z: i32, direction: u8, track_type: TrackType) -> Self {
        Self {
            kind: ElementKind::Track,
            base_z,
            direction,
            track_type,
        }
    }

    #[must_use]
    pub const fn is_track(&self) -> bool {
        matches!(self.kind, ElementKind::Track)
    }
}

/// Traversal handle bound to one segment of the network.
pub trait TrackCursor {
    /// Move one segment in `direction`. Returns false when the network has no
    /// connected segment there; the cursor must not be read afterwards.
    fn advance(&mut self, direction: TravelDirection) -> bool;

    /// Type of the segment under the cursor, if the host knows it.
    fn segment_type(&self) -> Option<TrackType>;

    /// Position of the segment under the cursor.
    fn position(&self) -> Position;
}

/// Read access to the track network.
pub trait TrackNetwork {
    type Cursor<'a>: TrackCursor
    where
        Self: 'a;

    /// All elements stored on a tile, in bucket order.
    fn tile_elements(&self, tile: TileCoord) -> Vec<TileElement>;

    /// Start a cursor at `position`, using `element_index` to pick among the
    /// elements of its tile. Returns `None` when the host refuses.
    fn cursor_at(&self, position: Position, element_index: usize) -> Option<Self::Cursor<'_>>;
}
