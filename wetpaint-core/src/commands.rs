//! Edits to a ride's configuration, queued and applied between ticks.
use serde::{Deserialize, Serialize};

use crate::config::{ModeKind, PaintConfig, PaintMode};
use crate::error::PaintError;
use crate::host::RideId;
use crate::props::{
    Colour, PaintEnd, PaintStart, PatternChoice, PatternValue, SegmentCount, SegmentSide, SetCount,
    SetSlot, TrackColourPart, VehicleColourPart,
};

/// One editing operation on a ride's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ConfigCommand {
    SetEnabled { enabled: bool },
    /// Switching mode discards the old payload.
    SetMode { mode: ModeKind },
    Reset,

    // Train mode
    SetPaintStart { slot: SetSlot, start: PaintStart },
    SetPaintEnd { slot: SetSlot, end: PaintEnd },
    SetNSegments { slot: SetSlot, side: SegmentSide, count: u32 },
    SetNumberOfSets { count: u8 },
    SetTrackColour { slot: SetSlot, part: TrackColourPart, colour: u8 },
    SetVehicleColour { slot: SetSlot, part: VehicleColourPart, colour: u8 },

    // Tail mode
    AddToPattern { choice: PatternChoice, value: u8 },
    RemoveFromPattern { choice: PatternChoice },
    SetPattern { choice: PatternChoice, values: Vec<u8> },
    SetStartValue { choice: PatternChoice, value: usize },
    SetPatternChoice { choice: PatternChoice },
    SetTailTrackColour { slot: SetSlot, part: TrackColourPart, colour: u8 },
    SetNumberOfTailSets { count: u8 },
}

/// What an applied command changed, beyond the stored rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Rules,
    /// Vehicle colours or the number of sets changed; trains need repainting.
    VehicleColours,
}

/// Notification sent to observers after the configuration list changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    Changed(PaintConfig),
    Removed(RideId),
    /// All configurations were reloaded from storage.
    Reloaded { count: usize },
}

impl ConfigCommand {
    /// Apply to `config`, validating every value first so a rejected command
    /// leaves the configuration untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::InvalidColour`], [`PaintError::InvalidSetCount`],
    /// [`PaintError::InvalidSegmentCount`] or [`PaintError::InvalidPatternValue`]
    /// for out-of-range input, and
    /// [`PaintError::WrongMode`] when the command targets the inactive mode.
    pub fn apply(self, config: &mut PaintConfig) -> Result<ChangeKind, PaintError> {
        let ride = config.ride;
        let wrong_mode = |expected| PaintError::WrongMode { ride, expected };
        match self {
            Self::SetEnabled { enabled } => config.enabled = enabled,
            Self::SetMode { mode } => {
                if config.mode.kind() != mode {
                    config.mode = PaintMode::default_for(mode);
                }
            }
            Self::Reset => config.reset(),
            Self::SetPaintStart { slot, start } => {
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_paint_start(slot, start);
            }
            Self::SetPaintEnd { slot, end } => {
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_paint_end(slot, end);
            }
            Self::SetNSegments { slot, side, count } => {
                let count = SegmentCount::new(count)?;
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_n_segments(slot, side, count);
            }
            Self::SetNumberOfSets { count } => {
                let count = SetCount::new(count)?;
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_number_of_sets(count);
                return Ok(ChangeKind::VehicleColours);
            }
            Self::SetTrackColour { slot, part, colour } => {
                let colour = Colour::new(colour)?;
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_track_colour(slot, part, colour);
            }
            Self::SetVehicleColour { slot, part, colour } => {
                let colour = Colour::new(colour)?;
                let PaintMode::Train(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Train));
                };
                props.set_vehicle_colour(slot, part, colour);
                return Ok(ChangeKind::VehicleColours);
            }
            Self::AddToPattern { choice, value } => {
                let value = PatternValue::try_from(value)?;
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.add_to_pattern(choice, value);
            }
            Self::RemoveFromPattern { choice } => {
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.remove_from_pattern(choice);
            }
            Self::SetPattern { choice, values } => {
                let values = values
                    .into_iter()
                    .map(PatternValue::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.set_pattern(choice, values);
            }
            Self::SetStartValue { choice, value } => {
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.set_start_value(choice, value);
            }
            Self::SetPatternChoice { choice } => {
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.set_pattern_choice(choice);
            }
            Self::SetTailTrackColour { slot, part, colour } => {
                let colour = Colour::new(colour)?;
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.set_track_colour(slot, part, colour);
            }
            Self::SetNumberOfTailSets { count } => {
                let count = SetCount::new(count)?;
                let PaintMode::Tail(props) = &mut config.mode else {
                    return Err(wrong_mode(ModeKind::Tail));
                };
                props.set_number_of_tail_sets(count);
            }
        }
        Ok(ChangeKind::Rules)
    }
}
