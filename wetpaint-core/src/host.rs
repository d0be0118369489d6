//! Seam to the host simulation's rides, trains and cars.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::position::Position;

/// Identifier of a ride in the park.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub u16);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical train, addressed by ride and its index on that ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainId {
    pub ride: RideId,
    pub index: usize,
}

impl TrainId {
    #[must_use]
    pub const fn new(ride: RideId, index: usize) -> Self {
        Self { ride, index }
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.ride, self.index)
    }
}

/// Host entity id of one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub u32);

/// Progress along the current segment and the segment's position, read
/// fresh from the host once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSample {
    pub progress: i32,
    pub position: Position,
}

/// Access to rides, trains and cars.
pub trait RideHost {
    /// Every ride currently in the park.
    fn ride_ids(&self) -> Vec<RideId>;

    fn ride_exists(&self, ride: RideId) -> bool;

    /// Re-read the ride's train list from the simulation.
    fn refresh_ride(&mut self, ride: RideId);

    /// Trains of a ride in index order. `None` means the host has no train
    /// list for a ride that exists, which only happens when the save state
    /// and the stored configuration have drifted apart.
    fn trains_of(&self, ride: RideId) -> Option<Vec<TrainId>>;

    /// Cars of a train, front to back.
    fn cars_of(&self, train: TrainId) -> Vec<CarId>;

    /// Refresh one car and sample it.
    fn car_sample(&mut self, car: CarId) -> Option<CarSample>;
}
