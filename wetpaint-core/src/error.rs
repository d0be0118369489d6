//! Error kinds raised by the engine.
//!
//! None of these are fatal: the tick path turns every one of them into
//! "paint nothing this tick" or "reload and retry next tick".
use thiserror::Error;

use crate::config::ModeKind;
use crate::host::{RideId, TrainId};
use crate::position::Position;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaintError {
    #[error("no track segment matches {position}")]
    LocateFailed { position: Position },
    #[error("walk of {steps} steps from {anchor} broke after {completed}")]
    WalkAborted {
        anchor: Position,
        steps: i32,
        completed: u32,
    },
    #[error("train {train} is missing car data")]
    CarMissing { train: TrainId },
    #[error("ride {ride} no longer matches its stored configuration")]
    ConfigDesync { ride: RideId },
    #[error("colour {value} is outside 0-{max}")]
    InvalidColour { value: u8, max: u8 },
    #[error("set count must be 1-3 (got {value})")]
    InvalidSetCount { value: u8 },
    #[error("segment count must be 0-{max} (got {value})")]
    InvalidSegmentCount { value: u32, max: u32 },
    #[error("pattern value must be 0-3 (got {value})")]
    InvalidPatternValue { value: u8 },
    #[error("ride {ride} is not in {expected} mode")]
    WrongMode { ride: RideId, expected: ModeKind },
    #[error("ride {ride} does not exist in the park")]
    UnknownRide { ride: RideId },
}

/// Errors raised by persistence implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("stored configuration could not be encoded or decoded: {0}")]
    Serde(#[from] serde_json::Error),
}
