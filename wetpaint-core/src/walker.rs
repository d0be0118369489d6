//! Walks the network from an anchor position, collecting the segments visited.
//!
//! Sign convention: a positive step count walks *behind* the anchor (toward
//! the previous segment), a negative count walks *ahead* of it (toward the
//! next segment). Rule language says "N segments before the train", which is
//! ahead in the direction of travel, hence callers negate it.
use log::debug;
use smallvec::SmallVec;

use crate::error::PaintError;
use crate::locator::locate;
use crate::network::{TrackCursor, TrackNetwork};
use crate::position::{Position, TrackType, TravelDirection};

/// Segments collected by one walk, anchor first.
pub type SegmentList = SmallVec<[TrackSegment; 8]>;

/// A segment chosen for painting, before colours are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSegment {
    pub position: Position,
    pub track_type: TrackType,
    /// Boundary segments go back to the ride's main colour scheme.
    pub main: bool,
}

/// Cursor that is valid by construction.
///
/// [`Cursor::step`] consumes the cursor and only hands it back when the host
/// advanced successfully, so a cursor that failed to move can never be read.
#[derive(Debug, Clone)]
pub struct Cursor<C> {
    inner: C,
}

impl<C: TrackCursor> Cursor<C> {
    pub(crate) const fn new(inner: C) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.inner.position()
    }

    /// Segment type under the cursor; unknown types read as 0.
    #[must_use]
    pub fn segment_type(&self) -> Option<TrackType> {
        self.inner.segment_type()
    }

    /// Advance one segment, or `None` if the network ends there.
    #[must_use]
    pub fn step(mut self, direction: TravelDirection) -> Option<Self> {
        self.inner.advance(direction).then_some(self)
    }

    #[must_use]
    pub fn segment(&self, main: bool) -> TrackSegment {
        TrackSegment {
            position: self.position(),
            track_type: self.segment_type().unwrap_or_default(),
            main,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

const fn direction_for(steps: i32) -> TravelDirection {
    if steps > 0 {
        TravelDirection::Previous
    } else {
        TravelDirection::Next
    }
}

/// Walk `steps` segments from `anchor`, returning the anchor segment followed
/// by every segment visited.
///
/// # Errors
///
/// Returns [`PaintError::LocateFailed`] if the anchor cannot be resolved and
/// [`PaintError::WalkAborted`] if any step fails. Partial walks are never
/// returned.
pub fn try_walk_from<N: TrackNetwork>(
    network: &N,
    anchor: Position,
    steps: i32,
    main: bool,
) -> Result<SegmentList, PaintError> {
    let mut cursor = locate(network, anchor)?;
    let direction = direction_for(steps);
    let mut segments = SegmentList::new();
    segments.push(cursor.segment(main));
    for completed in 0..steps.unsigned_abs() {
        cursor = cursor.step(direction).ok_or(PaintError::WalkAborted {
            anchor,
            steps,
            completed,
        })?;
        segments.push(cursor.segment(main));
    }
    Ok(segments)
}

/// Fail-closed form of [`try_walk_from`]: any failure yields an empty list so
/// a broken walk never paints a partial run.
#[must_use]
pub fn walk_from<N: TrackNetwork>(
    network: &N,
    anchor: Position,
    steps: i32,
    main: bool,
) -> SegmentList {
    try_walk_from(network, anchor, steps, main).unwrap_or_else(|err| {
        debug!("discarding walk: {err}");
        SegmentList::new()
    })
}

/// Only the segment reached after consuming all `steps`. Zero steps yields
/// the anchor itself.
///
/// # Errors
///
/// Same failure modes as [`try_walk_from`].
pub fn nth_node_behind<N: TrackNetwork>(
    network: &N,
    anchor: Position,
    steps: i32,
    main: bool,
) -> Result<TrackSegment, PaintError> {
    let mut cursor = locate(network, anchor)?;
    let direction = direction_for(steps);
    for completed in 0..steps.unsigned_abs() {
        cursor = cursor.step(direction).ok_or(PaintError::WalkAborted {
            anchor,
            steps,
            completed,
        })?;
    }
    Ok(cursor.segment(main))
}

/// Type of the segment under `position`.
///
/// # Errors
///
/// Returns [`PaintError::LocateFailed`] when no segment matches.
pub fn segment_type_at<N: TrackNetwork>(network: &N, position: Position) -> Result<TrackType, PaintError> {
    locate(network, position).map(|cursor| cursor.segment_type().unwrap_or_default())
}

/// The segment a car is sitting on, keeping the car's own position.
///
/// # Errors
///
/// Returns [`PaintError::LocateFailed`] when no segment matches.
pub fn segment_at<N: TrackNetwork>(network: &N, position: Position, main: bool) -> Result<TrackSegment, PaintError> {
    segment_type_at(network, position).map(|track_type| TrackSegment {
        position,
        track_type,
        main,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{TrackLayout, TrackPiece, STRAIGHT};
    use crate::position::TileCoord;

    fn loop_layout() -> TrackLayout {
        TrackLayout::rectangle(TileCoord::new(0, 0), 4, 4, 0)
    }

    fn line_layout() -> TrackLayout {
        let pieces = (0..5)
            .map(|x| TrackPiece::new(TileCoord::new(x, 0), 0, 0, STRAIGHT))
            .collect();
        TrackLayout::open_line(pieces)
    }

    #[test]
    fn zero_steps_returns_anchor_only() {
        let layout = loop_layout();
        let anchor = layout.piece(3).unwrap().position();
        let walk = walk_from(&layout, anchor, 0, false);
        assert_eq!(walk.len(), 1);
        assert_eq!(walk[0].position, anchor);
        assert!(!walk[0].main);
    }

    #[test]
    fn positive_steps_walk_backward() {
        let layout = loop_layout();
        let anchor = layout.piece(1).unwrap().position();
        let walk = walk_from(&layout, anchor, 3, true);
        let expected: Vec<Position> = [1, 0, 11, 10]
            .iter()
            .map(|&i| layout.piece(i).unwrap().position())
            .collect();
        let got: Vec<Position> = walk.iter().map(|s| s.position).collect();
        assert_eq!(got, expected);
        assert!(walk.iter().all(|s| s.main));
    }

    #[test]
    fn negative_steps_walk_forward() {
        let layout = loop_layout();
        let anchor = layout.piece(10).unwrap().position();
        let walk = walk_from(&layout, anchor, -3, false);
        let got: Vec<Position> = walk.iter().map(|s| s.position).collect();
        let expected: Vec<Position> = [10, 11, 0, 1]
            .iter()
            .map(|&i| layout.piece(i).unwrap().position())
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn failed_step_discards_entire_walk() {
        let layout = line_layout();
        let anchor = layout.piece(1).unwrap().position();
        assert!(walk_from(&layout, anchor, 2, false).is_empty());
        assert_eq!(
            try_walk_from(&layout, anchor, 2, false),
            Err(PaintError::WalkAborted {
                anchor,
                steps: 2,
                completed: 1
            })
        );
        assert_eq!(walk_from(&layout, anchor, 1, false).len(), 2);
    }

    #[test]
    fn nth_node_behind_returns_single_segment() {
        let layout = line_layout();
        let anchor = layout.piece(4).unwrap().position();
        let segment = nth_node_behind(&layout, anchor, 3, true).unwrap();
        assert_eq!(segment.position, layout.piece(1).unwrap().position());
        assert!(segment.main);
        assert_eq!(
            nth_node_behind(&layout, anchor, 0, true).unwrap().position,
            anchor
        );
        assert!(nth_node_behind(&layout, anchor, 5, true).is_err());
        assert!(nth_node_behind(&layout, anchor, -1, true).is_err());
    }

    #[test]
    fn segment_at_keeps_car_position() {
        let layout = loop_layout();
        let anchor = layout.piece(0).unwrap().position();
        let segment = segment_at(&layout, anchor, false).unwrap();
        assert_eq!(segment.position, anchor);
        assert_eq!(segment.track_type, crate::layout::STATION);
        assert!(segment_at(&layout, anchor.with_z(8), false).is_err());
    }
}
