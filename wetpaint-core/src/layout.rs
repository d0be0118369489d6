//! In-memory track network.
//!
//! `TrackLayout` is an ordered run of track pieces, either closed into a loop
//! or left open at both ends. Several pieces may share one tile (diagonals,
//! helices) and tiles may carry non-track elements ahead of or behind the
//! track, so bucket order matters exactly as it does on a real park map.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::network::{TileElement, TrackCursor, TrackNetwork};
use crate::position::{Position, TileCoord, TrackType, TravelDirection};

pub const STATION: TrackType = TrackType(1);
pub const STRAIGHT: TrackType = TrackType(2);
pub const TURN: TrackType = TrackType(3);

/// Default piece length in world units; car progress runs from zero to this.
pub const DEFAULT_PIECE_LENGTH: i32 = 32;

/// One segment of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPiece {
    pub tile: TileCoord,
    pub base_z: i32,
    pub direction: u8,
    pub track_type: TrackType,
    #[serde(default = "TrackPiece::default_length")]
    pub length: i32,
}

impl TrackPiece {
    #[must_use]
    pub const fn new(tile: TileCoord, base_z: i32, direction: u8, track_type: TrackType) -> Self {
        Self {
            tile,
            base_z,
            direction,
            track_type,
            length: DEFAULT_PIECE_LENGTH,
        }
    }

    const fn default_length() -> i32 {
        DEFAULT_PIECE_LENGTH
    }

    #[must_use]
    pub const fn with_length(mut self, length: i32) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.tile.origin(self.base_z, self.direction)
    }

    const fn element(&self) -> TileElement {
        TileElement::track(self.base_z, self.direction, self.track_type)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    element: TileElement,
    piece: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TrackLayout {
    pieces: Vec<TrackPiece>,
    closed: bool,
    tiles: HashMap<TileCoord, Vec<Slot>>,
    /// Piece indices whose link to the following piece is broken.
    severed: BTreeSet<usize>,
}

impl TrackLayout {
    /// Layout whose last piece connects back to the first.
    #[must_use]
    pub fn closed_loop(pieces: Vec<TrackPiece>) -> Self {
        Self::build(pieces, true)
    }

    /// Layout with dead ends at both extremities.
    #[must_use]
    pub fn open_line(pieces: Vec<TrackPiece>) -> Self {
        Self::build(pieces, false)
    }

    fn build(pieces: Vec<TrackPiece>, closed: bool) -> Self {
        let mut layout = Self {
            pieces: Vec::with_capacity(pieces.len()),
            closed,
            tiles: HashMap::new(),
            severed: BTreeSet::new(),
        };
        for piece in pieces {
            layout.push_piece(piece);
        }
        layout
    }

    fn push_piece(&mut self, piece: TrackPiece) {
        let index = self.pieces.len();
        self.tiles.entry(piece.tile).or_default().push(Slot {
            element: piece.element(),
            piece: Some(index),
        });
        self.pieces.push(piece);
    }

    /// Rectangular circuit around the tiles from `origin` spanning
    /// `width` x `height`. Headings: 0 = +x, 1 = +y, 2 = -x, 3 = -y.
    /// The first piece is a station, each leg starts with a turn.
    #[must_use]
    pub fn rectangle(origin: TileCoord, width: i32, height: i32, base_z: i32) -> Self {
        let width = width.max(2);
        let height = height.max(2);
        let legs = [
            (0_u8, 1, 0, width - 1),
            (1_u8, 0, 1, height - 1),
            (2_u8, -1, 0, width - 1),
            (3_u8, 0, -1, height - 1),
        ];
        let mut pieces = Vec::new();
        let mut tile = origin;
        for (direction, dx, dy, count) in legs {
            for step in 0..count {
                let track_type = if pieces.is_empty() {
                    STATION
                } else if step == 0 {
                    TURN
                } else {
                    STRAIGHT
                };
                pieces.push(TrackPiece::new(tile, base_z, direction, track_type));
                tile = TileCoord::new(tile.x + dx, tile.y + dy);
            }
        }
        Self::closed_loop(pieces)
    }

    /// Insert a non-track element at the front of a tile bucket so that track
    /// indices on that tile shift.
    pub fn insert_element(&mut self, tile: TileCoord, element: TileElement) {
        self.tiles.entry(tile).or_default().insert(
            0,
            Slot {
                element,
                piece: None,
            },
        );
    }

    /// Append a non-track element to a tile bucket.
    pub fn push_element(&mut self, tile: TileCoord, element: TileElement) {
        self.tiles.entry(tile).or_default().push(Slot {
            element,
            piece: None,
        });
    }

    /// Break the connection between `piece` and the piece after it.
    pub fn sever_after(&mut self, piece: usize) {
        self.severed.insert(piece);
    }

    /// Restore every severed connection.
    pub fn repair_all(&mut self) {
        self.severed.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn piece(&self, index: usize) -> Option<&TrackPiece> {
        self.pieces.get(index)
    }

    #[must_use]
    pub fn pieces(&self) -> &[TrackPiece] {
        &self.pieces
    }

    /// Index of the piece after `index`, honouring dead ends and severed links.
    #[must_use]
    pub fn next_index(&self, index: usize) -> Option<usize> {
        if index >= self.pieces.len() || self.severed.contains(&index) {
            return None;
        }
        if index + 1 < self.pieces.len() {
            Some(index + 1)
        } else if self.closed {
            Some(0)
        } else {
            None
        }
    }

    /// Index of the piece before `index`, honouring dead ends and severed links.
    #[must_use]
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        if index >= self.pieces.len() {
            return None;
        }
        let previous = if index > 0 {
            index - 1
        } else if self.closed {
            self.pieces.len() - 1
        } else {
            return None;
        };
        if self.severed.contains(&previous) {
            None
        } else {
            Some(previous)
        }
    }

    /// Piece index found `offset` pieces away from `index` (positive = next).
    #[must_use]
    pub fn offset_index(&self, index: usize, offset: i32) -> Option<usize> {
        let mut current = index;
        for _ in 0..offset.unsigned_abs() {
            current = if offset > 0 {
                self.next_index(current)?
            } else {
                self.previous_index(current)?
            };
        }
        Some(current)
    }

    /// Bucket index of a piece within its tile.
    #[must_use]
    pub fn element_index_of(&self, piece: usize) -> Option<usize> {
        let tile = self.pieces.get(piece)?.tile;
        self.tiles
            .get(&tile)?
            .iter()
            .position(|slot| slot.piece == Some(piece))
    }
}

impl TrackNetwork for TrackLayout {
    type Cursor<'a> = LayoutCursor<'a>;

    fn tile_elements(&self, tile: TileCoord) -> Vec<TileElement> {
        self.tiles
            .get(&tile)
            .map(|slots| slots.iter().map(|slot| slot.element).collect())
            .unwrap_or_default()
    }

    fn cursor_at(&self, position: Position, element_index: usize) -> Option<LayoutCursor<'_>> {
        let slot = self.tiles.get(&position.tile())?.get(element_index)?;
        let piece = slot.piece?;
        Some(LayoutCursor {
            layout: self,
            piece,
        })
    }
}

/// Cursor over a [`TrackLayout`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutCursor<'a> {
    layout: &'a TrackLayout,
    piece: usize,
}

impl LayoutCursor<'_> {
    #[must_use]
    pub const fn piece_index(&self) -> usize {
        self.piece
    }
}

impl TrackCursor for LayoutCursor<'_> {
    fn advance(&mut self, direction: TravelDirection) -> bool {
        let target = match direction {
            TravelDirection::Next => self.layout.next_index(self.piece),
            TravelDirection::Previous => self.layout.previous_index(self.piece),
        };
        match target {
            Some(piece) => {
                self.piece = piece;
                true
            }
            None => false,
        }
    }

    fn segment_type(&self) -> Option<TrackType> {
        self.layout.pieces.get(self.piece).map(|p| p.track_type)
    }

    fn position(&self) -> Position {
        self.layout.pieces[self.piece].position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ElementKind;

    #[test]
    fn rectangle_forms_closed_circuit() {
        let layout = TrackLayout::rectangle(TileCoord::new(2, 2), 4, 3, 16);
        assert_eq!(layout.len(), 10);
        assert!(layout.is_closed());
        assert_eq!(layout.next_index(9), Some(0));
        assert_eq!(layout.previous_index(0), Some(9));
        let first = layout.piece(0).unwrap();
        let last = layout.piece(9).unwrap();
        assert_eq!(first.track_type, STATION);
        assert_eq!(last.tile, TileCoord::new(2, 3));
    }

    #[test]
    fn open_line_and_severed_links_stop_traversal() {
        let pieces = (0..4)
            .map(|x| TrackPiece::new(TileCoord::new(x, 0), 0, 0, STRAIGHT))
            .collect();
        let mut layout = TrackLayout::open_line(pieces);
        assert_eq!(layout.next_index(3), None);
        assert_eq!(layout.previous_index(0), None);
        layout.sever_after(1);
        assert_eq!(layout.next_index(1), None);
        assert_eq!(layout.previous_index(2), None);
        assert_eq!(layout.offset_index(0, 1), Some(1));
        assert_eq!(layout.offset_index(0, 2), None);
        layout.repair_all();
        assert_eq!(layout.offset_index(0, 3), Some(3));
    }

    #[test]
    fn inserted_elements_shift_bucket_indices() {
        let mut layout = TrackLayout::rectangle(TileCoord::new(0, 0), 2, 2, 0);
        assert_eq!(layout.element_index_of(0), Some(0));
        let surface = TileElement {
            kind: ElementKind::Surface,
            base_z: 0,
            direction: 0,
            track_type: TrackType::default(),
        };
        layout.insert_element(TileCoord::new(0, 0), surface);
        assert_eq!(layout.element_index_of(0), Some(1));
        let position = layout.piece(0).unwrap().position();
        assert!(layout.cursor_at(position, 0).is_none());
        let cursor = layout.cursor_at(position, 1).unwrap();
        assert_eq!(cursor.piece_index(), 0);
        assert_eq!(cursor.position(), position);
    }
}
