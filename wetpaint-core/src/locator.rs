//! Resolves a position to a traversal cursor on the network.
use log::debug;
use smallvec::SmallVec;

use crate::error::PaintError;
use crate::network::{TileElement, TrackNetwork};
use crate::position::Position;
use crate::walker::Cursor;

/// Bucket indices of the track elements that sit at `position`'s elevation
/// and face its heading, in bucket order.
#[must_use]
pub fn matching_element_indices(elements: &[TileElement], position: Position) -> SmallVec<[usize; 2]> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| {
            element.is_track()
                && element.base_z == position.z
                && element.direction == position.direction
        })
        .map(|(index, _)| index)
        .collect()
}

/// Start a cursor at the segment under `position`.
///
/// Diagonals and helices can put more than one matching segment on a tile.
/// The last match in bucket order is used; that choice is a heuristic that
/// tends to pick the correct stacked layer, not a proven disambiguation.
///
/// # Errors
///
/// Returns [`PaintError::LocateFailed`] when nothing on the tile matches or the
/// network refuses to start a cursor at the chosen element.
pub fn locate<N: TrackNetwork>(network: &N, position: Position) -> Result<Cursor<N::Cursor<'_>>, PaintError> {
    let elements = network.tile_elements(position.tile());
    let matches = matching_element_indices(&elements, position);
    let Some(&element_index) = matches.last() else {
        debug!("no track found at {position}");
        return Err(PaintError::LocateFailed { position });
    };
    if matches.len() > 1 {
        debug!(
            "{} segments match {position}; using bucket index {element_index}",
            matches.len()
        );
    }
    network
        .cursor_at(position, element_index)
        .map(Cursor::new)
        .ok_or_else(|| {
            debug!("could not start a cursor at {position}, index {element_index}");
            PaintError::LocateFailed { position }
        })
}

/// Every track element on the tile under `position`, regardless of
/// elevation or heading.
#[must_use]
pub fn track_elements_at<N: TrackNetwork>(network: &N, position: Position) -> Vec<TileElement> {
    network
        .tile_elements(position.tile())
        .into_iter()
        .filter(TileElement::is_track)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{STRAIGHT, TrackLayout, TrackPiece};
    use crate::network::ElementKind;
    use crate::position::{TileCoord, TrackType};

    fn scenery() -> TileElement {
        TileElement {
            kind: ElementKind::Scenery,
            base_z: 8,
            direction: 0,
            track_type: TrackType::default(),
        }
    }

    #[test]
    fn matching_skips_non_track_and_wrong_heading() {
        let position = Position::new(0, 0, 8, 0);
        let elements = [
            scenery(),
            TileElement::track(8, 1, STRAIGHT),
            TileElement::track(16, 0, STRAIGHT),
            TileElement::track(8, 0, STRAIGHT),
        ];
        assert_eq!(matching_element_indices(&elements, position).as_slice(), &[3]);
    }

    #[test]
    fn locate_returns_cursor_at_input_position() {
        let layout = TrackLayout::rectangle(TileCoord::new(1, 1), 3, 3, 8);
        for piece in layout.pieces() {
            let cursor = locate(&layout, piece.position()).unwrap();
            assert_eq!(cursor.position(), piece.position());
        }
    }

    #[test]
    fn locate_fails_on_empty_tile_and_refused_cursor() {
        let layout = TrackLayout::rectangle(TileCoord::new(1, 1), 3, 3, 8);
        let nowhere = Position::new(320, 320, 8, 0);
        assert_eq!(
            locate(&layout, nowhere).err(),
            Some(PaintError::LocateFailed { position: nowhere })
        );
        let wrong_height = layout.piece(0).unwrap().position().with_z(64);
        assert!(locate(&layout, wrong_height).is_err());
    }

    #[test]
    fn ambiguous_tile_prefers_last_match() {
        let tile = TileCoord::new(0, 0);
        let lower = TrackPiece::new(tile, 0, 0, STRAIGHT);
        let upper = TrackPiece::new(tile, 0, 0, TrackType(9));
        let tail = TrackPiece::new(TileCoord::new(1, 0), 0, 0, STRAIGHT);
        let mut layout = TrackLayout::closed_loop(vec![lower, upper, tail]);
        layout.push_element(tile, scenery());
        let position = lower.position();
        let first = locate(&layout, position).unwrap();
        let again = locate(&layout, position).unwrap();
        assert_eq!(first.segment_type(), Some(TrackType(9)));
        assert_eq!(again.segment_type(), Some(TrackType(9)));
        assert_eq!(track_elements_at(&layout, position).len(), 2);
    }
}
