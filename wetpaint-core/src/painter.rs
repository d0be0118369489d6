//! Paint targets and the seam to the host's recolouring commands.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::host::RideId;
use crate::locator::track_elements_at;
use crate::network::TrackNetwork;
use crate::position::{Position, TrackType};
use crate::props::{SetCount, TrackColours, VehicleColours};
use crate::walker::TrackSegment;

/// Targets produced for one train in one tick.
pub type PaintTargets = SmallVec<[PaintTarget; 4]>;

/// Which of the ride's four palettes a segment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ColourScheme {
    Main,
    Alternative1,
    Alternative2,
    Alternative3,
}

impl ColourScheme {
    /// Overlay scheme for a set slot (0-based).
    #[must_use]
    pub const fn for_slot(slot: usize) -> Self {
        match slot % 3 {
            0 => Self::Alternative1,
            1 => Self::Alternative2,
            _ => Self::Alternative3,
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Main => 0,
            Self::Alternative1 => 1,
            Self::Alternative2 => 2,
            Self::Alternative3 => 3,
        }
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Self::Main)
    }
}

impl From<ColourScheme> for u8 {
    fn from(scheme: ColourScheme) -> Self {
        scheme.index()
    }
}

impl fmt::Display for ColourScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// One recolouring instruction. Lives for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaintTarget {
    pub ride: RideId,
    pub position: Position,
    pub track_type: TrackType,
    pub colours: TrackColours,
    pub scheme: ColourScheme,
}

impl PaintTarget {
    /// Attach colours to a segment. Main segments always use scheme 0; the
    /// rest use the overlay scheme of `slot`.
    #[must_use]
    pub const fn from_segment(ride: RideId, segment: TrackSegment, colours: TrackColours, slot: usize) -> Self {
        let scheme = if segment.main {
            ColourScheme::Main
        } else {
            ColourScheme::for_slot(slot)
        };
        Self {
            ride,
            position: segment.position,
            track_type: segment.track_type,
            colours,
            scheme,
        }
    }
}

/// How the ride colours its vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleScheme {
    AllSame,
    PerTrain,
    PerCar,
}

/// Failure reported by the host when applying a change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PainterError {
    #[error("no segment of type {track_type:?} at {position}")]
    NoSegment {
        position: Position,
        track_type: TrackType,
    },
    #[error("host rejected the change: {0}")]
    Rejected(String),
}

/// Applies colour changes in the host.
pub trait Painter {
    /// Set the track colours of one of the ride's schemes.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the change.
    fn set_track_colours(
        &mut self,
        ride: RideId,
        scheme: ColourScheme,
        colours: TrackColours,
    ) -> Result<(), PainterError>;

    /// Switch one segment to a colour scheme.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::NoSegment`] when nothing of that type is at the
    /// position, or another error if the host rejects the change.
    fn set_segment_scheme(
        &mut self,
        ride: RideId,
        position: Position,
        track_type: TrackType,
        scheme: ColourScheme,
    ) -> Result<(), PainterError>;

    /// # Errors
    ///
    /// Returns an error if the host rejects the change.
    fn set_vehicle_scheme(&mut self, ride: RideId, scheme: VehicleScheme) -> Result<(), PainterError>;

    /// Paint the vehicles of one train.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the change.
    fn set_vehicle_colours(
        &mut self,
        ride: RideId,
        train_index: usize,
        colours: VehicleColours,
    ) -> Result<(), PainterError>;
}

/// Apply one target: load the overlay scheme's track colours, then switch the
/// segment. When the host finds no segment at the computed elevation the
/// nearest same-type segment on the tile is tried once.
///
/// # Errors
///
/// Returns the host's error if the target could not be applied.
pub fn dispatch_target<P: Painter, N: TrackNetwork>(
    painter: &mut P,
    network: &N,
    target: &PaintTarget,
) -> Result<(), PainterError> {
    if !target.scheme.is_main() {
        painter.set_track_colours(target.ride, target.scheme, target.colours)?;
    }
    match painter.set_segment_scheme(target.ride, target.position, target.track_type, target.scheme) {
        Err(PainterError::NoSegment { .. }) => {
            let Some(z) = nearest_elevation(network, target.position, target.track_type) else {
                debug!("no {:?} segment anywhere on the tile at {}", target.track_type, target.position);
                return Err(PainterError::NoSegment {
                    position: target.position,
                    track_type: target.track_type,
                });
            };
            if z == target.position.z {
                return Err(PainterError::NoSegment {
                    position: target.position,
                    track_type: target.track_type,
                });
            }
            debug!("retrying {} at corrected elevation {z}", target.position);
            painter.set_segment_scheme(
                target.ride,
                target.position.with_z(z),
                target.track_type,
                target.scheme,
            )
        }
        other => other,
    }
}

/// Base elevation of the same-type track element closest to `position.z`.
fn nearest_elevation<N: TrackNetwork>(network: &N, position: Position, track_type: TrackType) -> Option<i32> {
    track_elements_at(network, position)
        .into_iter()
        .filter(|element| element.track_type == track_type)
        .min_by_key(|element| (element.base_z - position.z).abs())
        .map(|element| element.base_z)
}

/// Dispatch targets in order. Failures are logged and do not stop the rest.
/// Returns how many were applied.
pub fn dispatch_all<P: Painter, N: TrackNetwork>(painter: &mut P, network: &N, targets: &[PaintTarget]) -> usize {
    targets
        .iter()
        .filter(|target| match dispatch_target(painter, network, target) {
            Ok(()) => true,
            Err(err) => {
                warn!("could not paint ride {} at {}: {err}", target.ride, target.position);
                false
            }
        })
        .count()
}

/// Vehicle colours for each of `train_count` trains, cycling through sets.
#[must_use]
pub fn vehicle_colour_plan(
    sets: &[VehicleColours],
    count: SetCount,
    train_count: usize,
) -> Vec<(usize, VehicleColours)> {
    (0..train_count)
        .filter_map(|train| sets.get(count.slot_for(train)).map(|colours| (train, *colours)))
        .collect()
}
