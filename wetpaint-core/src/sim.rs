//! Headless host used by tests and the scenario tester.
//!
//! [`SimHost`] moves trains along a [`TrackLayout`] and answers ride and car
//! queries; [`RecordingPainter`] records every colour change instead of
//! applying it.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::host::{CarId, CarSample, RideHost, RideId, TrainId};
use crate::layout::TrackLayout;
use crate::painter::{ColourScheme, Painter, PainterError, VehicleScheme};
use crate::position::{Position, TileCoord, TrackType};
use crate::props::{TrackColours, VehicleColours};

/// Distance between the fronts of consecutive cars.
pub const CAR_SPACING: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimCar {
    piece: usize,
    progress: i32,
}

#[derive(Debug, Clone, Default)]
struct SimTrain {
    cars: Vec<CarId>,
    speed: i32,
}

#[derive(Debug, Clone, Default)]
struct SimRide {
    trains: Vec<SimTrain>,
    desynced: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimHost {
    rides: BTreeMap<RideId, SimRide>,
    cars: HashMap<CarId, SimCar>,
    detached: HashSet<CarId>,
    positions: HashMap<CarId, Position>,
    next_car: u32,
    refreshes: usize,
}

/// Move `distance` units along the layout from `(piece, progress)`. Forward
/// when positive. Stops at a dead end.
fn travel(layout: &TrackLayout, mut piece: usize, mut progress: i32, distance: i32) -> (usize, i32) {
    let length = |index: usize| layout.piece(index).map_or(1, |p| p.length.max(1));
    progress += distance;
    while progress >= length(piece) {
        match layout.next_index(piece) {
            Some(next) => {
                progress -= length(piece);
                piece = next;
            }
            None => return (piece, length(piece) - 1),
        }
    }
    while progress < 0 {
        match layout.previous_index(piece) {
            Some(previous) => {
                piece = previous;
                progress += length(piece);
            }
            None => return (piece, 0),
        }
    }
    (piece, progress)
}

impl SimHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ride(&mut self, ride: RideId) {
        self.rides.entry(ride).or_default();
    }

    /// Demolish a ride and all of its trains.
    pub fn remove_ride(&mut self, ride: RideId) {
        if let Some(removed) = self.rides.remove(&ride) {
            for car in removed.trains.iter().flat_map(|train| &train.cars) {
                self.cars.remove(car);
                self.positions.remove(car);
            }
        }
    }

    /// Place a train with its front car at `(piece, progress)` and the rest
    /// trailing behind at [`CAR_SPACING`].
    pub fn add_train(
        &mut self,
        layout: &TrackLayout,
        ride: RideId,
        piece: usize,
        progress: i32,
        car_count: usize,
    ) -> TrainId {
        let mut cars = Vec::with_capacity(car_count);
        let mut offset = 0;
        for _ in 0..car_count {
            let id = CarId(self.next_car);
            self.next_car += 1;
            let (car_piece, car_progress) = travel(layout, piece, progress, -offset);
            self.place(layout, id, car_piece, car_progress);
            cars.push(id);
            offset += CAR_SPACING;
        }
        let entry = self.rides.entry(ride).or_default();
        entry.trains.push(SimTrain { cars, speed: 0 });
        TrainId::new(ride, entry.trains.len() - 1)
    }

    fn place(&mut self, layout: &TrackLayout, car: CarId, piece: usize, progress: i32) {
        self.cars.insert(car, SimCar { piece, progress });
        if let Some(found) = layout.piece(piece) {
            self.positions.insert(car, found.position());
        }
    }

    fn train(&self, train: TrainId) -> Option<&SimTrain> {
        self.rides.get(&train.ride)?.trains.get(train.index)
    }

    pub fn set_speed(&mut self, train: TrainId, speed: i32) {
        if let Some(found) = self
            .rides
            .get_mut(&train.ride)
            .and_then(|ride| ride.trains.get_mut(train.index))
        {
            found.speed = speed;
        }
    }

    /// Move every car of `train` forward by `distance`.
    pub fn advance_train(&mut self, layout: &TrackLayout, train: TrainId, distance: i32) {
        let cars = self.train(train).map(|t| t.cars.clone()).unwrap_or_default();
        for car in cars {
            if let Some(current) = self.cars.get(&car).copied() {
                let (piece, progress) = travel(layout, current.piece, current.progress, distance);
                self.place(layout, car, piece, progress);
            }
        }
    }

    /// Move every train by its own speed.
    pub fn step(&mut self, layout: &TrackLayout) {
        let moves: Vec<(TrainId, i32)> = self
            .rides
            .iter()
            .flat_map(|(&ride, entry)| {
                entry
                    .trains
                    .iter()
                    .enumerate()
                    .map(move |(index, train)| (TrainId::new(ride, index), train.speed))
            })
            .collect();
        for (train, speed) in moves {
            self.advance_train(layout, train, speed);
        }
    }

    /// Make the ride report no train list while it still exists.
    pub fn set_desynced(&mut self, ride: RideId, desynced: bool) {
        if let Some(entry) = self.rides.get_mut(&ride) {
            entry.desynced = desynced;
        }
    }

    /// Remove every car from a train, leaving the train in place.
    pub fn empty_train(&mut self, train: TrainId) {
        let cars = self
            .rides
            .get_mut(&train.ride)
            .and_then(|ride| ride.trains.get_mut(train.index))
            .map(|found| std::mem::take(&mut found.cars))
            .unwrap_or_default();
        for car in cars {
            self.cars.remove(&car);
            self.positions.remove(&car);
        }
    }

    /// Keep the car listed on its train but make it unreadable.
    pub fn detach_car(&mut self, car: CarId) {
        self.detached.insert(car);
    }

    /// Current segment piece and progress of a car.
    #[must_use]
    pub fn car_state(&self, car: CarId) -> Option<(usize, i32)> {
        self.cars.get(&car).map(|c| (c.piece, c.progress))
    }

    #[must_use]
    pub const fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl RideHost for SimHost {
    fn ride_ids(&self) -> Vec<RideId> {
        self.rides.keys().copied().collect()
    }

    fn ride_exists(&self, ride: RideId) -> bool {
        self.rides.contains_key(&ride)
    }

    fn refresh_ride(&mut self, ride: RideId) {
        if self.rides.contains_key(&ride) {
            self.refreshes += 1;
        }
    }

    fn trains_of(&self, ride: RideId) -> Option<Vec<TrainId>> {
        let entry = self.rides.get(&ride)?;
        if entry.desynced {
            return None;
        }
        Some(
            (0..entry.trains.len())
                .map(|index| TrainId::new(ride, index))
                .collect(),
        )
    }

    fn cars_of(&self, train: TrainId) -> Vec<CarId> {
        self.train(train).map(|t| t.cars.clone()).unwrap_or_default()
    }

    fn car_sample(&mut self, car: CarId) -> Option<CarSample> {
        if self.detached.contains(&car) {
            return None;
        }
        let state = self.cars.get(&car)?;
        let position = *self.positions.get(&car)?;
        Some(CarSample {
            progress: state.progress,
            position,
        })
    }
}

/// One call received by [`RecordingPainter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum PaintCall {
    TrackColours {
        ride: RideId,
        scheme: ColourScheme,
        colours: TrackColours,
    },
    SegmentScheme {
        ride: RideId,
        position: Position,
        track_type: TrackType,
        scheme: ColourScheme,
    },
    VehicleScheme {
        ride: RideId,
        scheme: VehicleScheme,
    },
    VehicleColours {
        ride: RideId,
        train_index: usize,
        colours: VehicleColours,
    },
}

/// Painter that records calls and tracks the resulting segment schemes.
#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    calls: Vec<PaintCall>,
    schemes: HashMap<Position, ColourScheme>,
    /// When set, only these `(tile, base_z, type)` triples accept a scheme.
    known_segments: Option<HashSet<(TileCoord, i32, TrackType)>>,
    rejected_rides: BTreeSet<RideId>,
}

impl RecordingPainter {
    /// Accepts every segment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects segments that do not exist in `layout` at the exact elevation.
    #[must_use]
    pub fn strict(layout: &TrackLayout) -> Self {
        let known = layout
            .pieces()
            .iter()
            .map(|piece| (piece.tile, piece.base_z, piece.track_type))
            .collect();
        Self {
            known_segments: Some(known),
            ..Self::default()
        }
    }

    /// Every change for `ride` fails from now on.
    pub fn reject_ride(&mut self, ride: RideId) {
        self.rejected_rides.insert(ride);
    }

    #[must_use]
    pub fn calls(&self) -> &[PaintCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<PaintCall> {
        std::mem::take(&mut self.calls)
    }

    /// Last scheme applied to the segment at `position`.
    #[must_use]
    pub fn scheme_at(&self, position: Position) -> Option<ColourScheme> {
        self.schemes.get(&position).copied()
    }

    /// Segment scheme changes recorded so far.
    pub fn segment_calls(&self) -> impl Iterator<Item = (Position, ColourScheme)> + '_ {
        self.calls.iter().filter_map(|call| match call {
            PaintCall::SegmentScheme {
                position, scheme, ..
            } => Some((*position, *scheme)),
            _ => None,
        })
    }

    fn check_ride(&self, ride: RideId) -> Result<(), PainterError> {
        if self.rejected_rides.contains(&ride) {
            Err(PainterError::Rejected(format!("ride {ride} is locked")))
        } else {
            Ok(())
        }
    }
}

impl Painter for RecordingPainter {
    fn set_track_colours(
        &mut self,
        ride: RideId,
        scheme: ColourScheme,
        colours: TrackColours,
    ) -> Result<(), PainterError> {
        self.check_ride(ride)?;
        self.calls.push(PaintCall::TrackColours {
            ride,
            scheme,
            colours,
        });
        Ok(())
    }

    fn set_segment_scheme(
        &mut self,
        ride: RideId,
        position: Position,
        track_type: TrackType,
        scheme: ColourScheme,
    ) -> Result<(), PainterError> {
        self.check_ride(ride)?;
        if let Some(known) = &self.known_segments
            && !known.contains(&(position.tile(), position.z, track_type))
        {
            return Err(PainterError::NoSegment {
                position,
                track_type,
            });
        }
        self.schemes.insert(position, scheme);
        self.calls.push(PaintCall::SegmentScheme {
            ride,
            position,
            track_type,
            scheme,
        });
        Ok(())
    }

    fn set_vehicle_scheme(&mut self, ride: RideId, scheme: VehicleScheme) -> Result<(), PainterError> {
        self.check_ride(ride)?;
        self.calls.push(PaintCall::VehicleScheme { ride, scheme });
        Ok(())
    }

    fn set_vehicle_colours(
        &mut self,
        ride: RideId,
        train_index: usize,
        colours: VehicleColours,
    ) -> Result<(), PainterError> {
        self.check_ride(ride)?;
        self.calls.push(PaintCall::VehicleColours {
            ride,
            train_index,
            colours,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TrackLayout {
        TrackLayout::rectangle(TileCoord::new(0, 0), 3, 3, 0)
    }

    #[test]
    fn cars_trail_behind_the_front_car() {
        let layout = layout();
        let mut host = SimHost::new();
        let train = host.add_train(&layout, RideId(1), 2, 10, 3);
        let cars = host.cars_of(train);
        assert_eq!(host.car_state(cars[0]), Some((2, 10)));
        assert_eq!(host.car_state(cars[1]), Some((1, 18)));
        assert_eq!(host.car_state(cars[2]), Some((0, 26)));
    }

    #[test]
    fn advancing_wraps_the_loop_and_resets_progress() {
        let layout = layout();
        let mut host = SimHost::new();
        let train = host.add_train(&layout, RideId(1), 7, 20, 1);
        host.advance_train(&layout, train, 20);
        let car = host.cars_of(train)[0];
        assert_eq!(host.car_state(car), Some((0, 8)));
        let sample = host.car_sample(car).unwrap();
        assert_eq!(sample.position, layout.piece(0).unwrap().position());
        host.detach_car(car);
        assert!(host.car_sample(car).is_none());
    }

    #[test]
    fn desynced_ride_has_no_train_list() {
        let layout = layout();
        let mut host = SimHost::new();
        host.add_train(&layout, RideId(5), 0, 0, 2);
        host.set_desynced(RideId(5), true);
        assert!(host.ride_exists(RideId(5)));
        assert!(host.trains_of(RideId(5)).is_none());
        host.remove_ride(RideId(5));
        assert!(!host.ride_exists(RideId(5)));
    }

    #[test]
    fn strict_painter_rejects_wrong_elevation() {
        let layout = layout();
        let mut painter = RecordingPainter::strict(&layout);
        let piece = *layout.piece(0).unwrap();
        let position = piece.position();
        assert!(
            painter
                .set_segment_scheme(RideId(1), position, piece.track_type, ColourScheme::Main)
                .is_ok()
        );
        assert_eq!(
            painter.set_segment_scheme(RideId(1), position.with_z(8), piece.track_type, ColourScheme::Main),
            Err(PainterError::NoSegment {
                position: position.with_z(8),
                track_type: piece.track_type
            })
        );
        assert_eq!(painter.scheme_at(position), Some(ColourScheme::Main));
    }
}
