//! User-configured painting rules and colour sets.
use serde::{Deserialize, Serialize};

use crate::constants::{
    COLOUR_MAX, DEFAULT_N_SEGMENTS, DEFAULT_NUMBER_TAIL_SETS, DEFAULT_NUMBER_VEHICLE_SETS,
    DEFAULT_TAIL_START_AFTER, DEFAULT_TAIL_START_BEFORE, MAX_N_SEGMENTS, MAX_SETS,
};
use crate::error::PaintError;

/// A palette entry, 0-31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Colour(u8);

impl Colour {
    /// # Errors
    ///
    /// Returns [`PaintError::InvalidColour`] for values above 31.
    pub const fn new(value: u8) -> Result<Self, PaintError> {
        if value > COLOUR_MAX {
            Err(PaintError::InvalidColour {
                value,
                max: COLOUR_MAX,
            })
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Colour {
    type Error = PaintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Colour> for u8 {
    fn from(colour: Colour) -> Self {
        colour.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackColours {
    pub main: Colour,
    pub additional: Colour,
    pub supports: Colour,
}

impl TrackColours {
    pub const fn set(&mut self, part: TrackColourPart, colour: Colour) {
        match part {
            TrackColourPart::Main => self.main = colour,
            TrackColourPart::Additional => self.additional = colour,
            TrackColourPart::Supports => self.supports = colour,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VehicleColours {
    pub body: Colour,
    pub trim: Colour,
    pub tertiary: Colour,
}

impl VehicleColours {
    pub const fn set(&mut self, part: VehicleColourPart, colour: Colour) {
        match part {
            VehicleColourPart::Body => self.body = colour,
            VehicleColourPart::Trim => self.trim = colour,
            VehicleColourPart::Tertiary => self.tertiary = colour,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackColourPart {
    Main,
    Additional,
    Supports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleColourPart {
    Body,
    Trim,
    Tertiary,
}

/// Vehicle and track colours of one train set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColourSet {
    pub vehicle_colours: VehicleColours,
    pub track_colours: TrackColours,
}

/// How many sets are in use, 1-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SetCount(u8);

impl SetCount {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);

    /// # Errors
    ///
    /// Returns [`PaintError::InvalidSetCount`] outside 1-3.
    pub const fn new(value: u8) -> Result<Self, PaintError> {
        if value == 0 || value as usize > MAX_SETS {
            Err(PaintError::InvalidSetCount { value })
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Slot used by the train at `train_index`; cycles through the sets.
    #[must_use]
    pub const fn slot_for(self, train_index: usize) -> usize {
        train_index % self.0 as usize
    }
}

impl TryFrom<u8> for SetCount {
    type Error = PaintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SetCount> for u8 {
    fn from(count: SetCount) -> Self {
        count.0
    }
}

/// Segments covered by an N-segment rule, 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SegmentCount(u32);

impl SegmentCount {
    pub const DEFAULT: Self = Self(DEFAULT_N_SEGMENTS);

    /// # Errors
    ///
    /// Returns [`PaintError::InvalidSegmentCount`] above 255.
    pub const fn new(value: u32) -> Result<Self, PaintError> {
        if value > MAX_N_SEGMENTS {
            Err(PaintError::InvalidSegmentCount {
                value,
                max: MAX_N_SEGMENTS,
            })
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SegmentCount {
    type Error = PaintError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SegmentCount> for u32 {
    fn from(count: SegmentCount) -> Self {
        count.0
    }
}

/// One of the three configurable sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetSlot {
    First,
    Second,
    Third,
}

impl SetSlot {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaintStart {
    #[default]
    WithFirstCar,
    AfterLastCar,
    BeforeNSegments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaintEnd {
    AfterFirstCar,
    AfterLastCar,
    #[default]
    Perpetual,
    AfterNSegments,
}

/// Start rule with its segment count resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartRule {
    WithFirstCar,
    AfterLastCar,
    BeforeNSegments(u32),
}

/// End rule with its segment count resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndRule {
    AfterFirstCar,
    AfterLastCar,
    Perpetual,
    AfterNSegments(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentSide {
    Before,
    After,
}

/// Everything the rule engine needs for one train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainSetInfo {
    pub slot: usize,
    pub vehicle_colours: VehicleColours,
    pub track_colours: TrackColours,
    pub start: StartRule,
    pub end: EndRule,
}

/// Train mode: up to three independently configured train sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainModeProps {
    pub number_vehicle_sets: SetCount,
    pub colour_sets: [ColourSet; MAX_SETS],
    pub paint_start: [PaintStart; MAX_SETS],
    pub paint_end: [PaintEnd; MAX_SETS],
    #[serde(default = "TrainModeProps::default_n_segments")]
    pub number_of_n_segments_before: [SegmentCount; MAX_SETS],
    #[serde(default = "TrainModeProps::default_n_segments")]
    pub number_of_n_segments_after: [SegmentCount; MAX_SETS],
}

impl Default for TrainModeProps {
    fn default() -> Self {
        Self {
            number_vehicle_sets: SetCount(DEFAULT_NUMBER_VEHICLE_SETS),
            colour_sets: [ColourSet::default(); MAX_SETS],
            paint_start: [PaintStart::default(); MAX_SETS],
            paint_end: [PaintEnd::default(); MAX_SETS],
            number_of_n_segments_before: Self::default_n_segments(),
            number_of_n_segments_after: Self::default_n_segments(),
        }
    }
}

impl TrainModeProps {
    const fn default_n_segments() -> [SegmentCount; MAX_SETS] {
        [SegmentCount::DEFAULT; MAX_SETS]
    }

    /// Rules and colours for the train at `train_index`. The lookup cycles
    /// through the configured sets so it never leaves the 1-3 range.
    #[must_use]
    pub const fn train_set(&self, train_index: usize) -> TrainSetInfo {
        let slot = self.number_vehicle_sets.slot_for(train_index);
        let start = match self.paint_start[slot] {
            PaintStart::WithFirstCar => StartRule::WithFirstCar,
            PaintStart::AfterLastCar => StartRule::AfterLastCar,
            PaintStart::BeforeNSegments => {
                StartRule::BeforeNSegments(self.number_of_n_segments_before[slot].get())
            }
        };
        let end = match self.paint_end[slot] {
            PaintEnd::AfterFirstCar => EndRule::AfterFirstCar,
            PaintEnd::AfterLastCar => EndRule::AfterLastCar,
            PaintEnd::Perpetual => EndRule::Perpetual,
            PaintEnd::AfterNSegments => EndRule::AfterNSegments(self.number_of_n_segments_after[slot].get()),
        };
        TrainSetInfo {
            slot,
            vehicle_colours: self.colour_sets[slot].vehicle_colours,
            track_colours: self.colour_sets[slot].track_colours,
            start,
            end,
        }
    }

    pub const fn set_paint_start(&mut self, slot: SetSlot, start: PaintStart) {
        self.paint_start[slot.index()] = start;
    }

    pub const fn set_paint_end(&mut self, slot: SetSlot, end: PaintEnd) {
        self.paint_end[slot.index()] = end;
    }

    pub const fn set_n_segments(&mut self, slot: SetSlot, side: SegmentSide, count: SegmentCount) {
        match side {
            SegmentSide::Before => self.number_of_n_segments_before[slot.index()] = count,
            SegmentSide::After => self.number_of_n_segments_after[slot.index()] = count,
        }
    }

    pub const fn set_track_colour(&mut self, slot: SetSlot, part: TrackColourPart, colour: Colour) {
        self.colour_sets[slot.index()].track_colours.set(part, colour);
    }

    pub const fn set_vehicle_colour(&mut self, slot: SetSlot, part: VehicleColourPart, colour: Colour) {
        self.colour_sets[slot.index()].vehicle_colours.set(part, colour);
    }

    pub const fn set_number_of_sets(&mut self, count: SetCount) {
        self.number_vehicle_sets = count;
    }
}

/// One entry of a tail pattern: 0 is the ride's main scheme, 1-3 pick a
/// tail colour set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PatternValue(u8);

impl PatternValue {
    pub const MAIN: Self = Self(0);

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value as usize > MAX_SETS {
            None
        } else {
            Some(Self(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PatternValue {
    type Error = PaintError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PaintError::InvalidPatternValue { value })
    }
}

impl From<PatternValue> for u8 {
    fn from(value: PatternValue) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternChoice {
    #[default]
    Before,
    After,
}

/// Tail mode: colour patterns laid ahead of and behind the train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailModeProps {
    pub track_colour_sets: [TrackColours; MAX_SETS],
    pub number_of_tail_sets: SetCount,
    #[serde(default)]
    pub pattern_before: Vec<PatternValue>,
    #[serde(default)]
    pub pattern_after: Vec<PatternValue>,
    #[serde(default)]
    pub pattern_choice: PatternChoice,
    #[serde(default = "TailModeProps::default_start_before")]
    pub start_before: usize,
    #[serde(default = "TailModeProps::default_start_after")]
    pub start_after: usize,
}

impl Default for TailModeProps {
    fn default() -> Self {
        Self {
            track_colour_sets: [TrackColours::default(); MAX_SETS],
            number_of_tail_sets: SetCount(DEFAULT_NUMBER_TAIL_SETS),
            pattern_before: Vec::new(),
            pattern_after: Vec::new(),
            pattern_choice: PatternChoice::default(),
            start_before: Self::default_start_before(),
            start_after: Self::default_start_after(),
        }
    }
}

impl TailModeProps {
    const fn default_start_before() -> usize {
        DEFAULT_TAIL_START_BEFORE
    }

    const fn default_start_after() -> usize {
        DEFAULT_TAIL_START_AFTER
    }

    #[must_use]
    pub fn pattern(&self, choice: PatternChoice) -> &[PatternValue] {
        match choice {
            PatternChoice::Before => &self.pattern_before,
            PatternChoice::After => &self.pattern_after,
        }
    }

    fn pattern_mut(&mut self, choice: PatternChoice) -> &mut Vec<PatternValue> {
        match choice {
            PatternChoice::Before => &mut self.pattern_before,
            PatternChoice::After => &mut self.pattern_after,
        }
    }

    /// Walk index at which the pattern starts: 0 is the segment under the car.
    #[must_use]
    pub const fn start(&self, choice: PatternChoice) -> usize {
        match choice {
            PatternChoice::Before => self.start_before,
            PatternChoice::After => self.start_after,
        }
    }

    pub fn add_to_pattern(&mut self, choice: PatternChoice, value: PatternValue) {
        self.pattern_mut(choice).push(value);
    }

    pub fn remove_from_pattern(&mut self, choice: PatternChoice) -> Option<PatternValue> {
        self.pattern_mut(choice).pop()
    }

    pub fn set_pattern(&mut self, choice: PatternChoice, values: Vec<PatternValue>) {
        *self.pattern_mut(choice) = values;
    }

    pub const fn set_start_value(&mut self, choice: PatternChoice, value: usize) {
        match choice {
            PatternChoice::Before => self.start_before = value,
            PatternChoice::After => self.start_after = value,
        }
    }

    pub const fn set_pattern_choice(&mut self, choice: PatternChoice) {
        self.pattern_choice = choice;
    }

    pub const fn set_track_colour(&mut self, slot: SetSlot, part: TrackColourPart, colour: Colour) {
        self.track_colour_sets[slot.index()].set(part, colour);
    }

    pub const fn set_number_of_tail_sets(&mut self, count: SetCount) {
        self.number_of_tail_sets = count;
    }

    /// Tail set slot for a non-main pattern value, cycling through the sets
    /// in use.
    #[must_use]
    pub const fn slot_for(&self, value: PatternValue) -> Option<usize> {
        if value.0 == 0 {
            None
        } else {
            Some(self.number_of_tail_sets.slot_for(value.0 as usize - 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_rejects_out_of_range() {
        assert!(Colour::new(31).is_ok());
        assert_eq!(
            Colour::new(32),
            Err(PaintError::InvalidColour { value: 32, max: 31 })
        );
        let parsed: Result<Colour, _> = serde_json::from_str("40");
        assert!(parsed.is_err());
    }

    #[test]
    fn set_count_bounds_and_cycling() {
        assert!(SetCount::new(0).is_err());
        assert!(SetCount::new(4).is_err());
        let two = SetCount::new(2).unwrap();
        assert_eq!(two.slot_for(0), 0);
        assert_eq!(two.slot_for(1), 1);
        assert_eq!(two.slot_for(5), 1);
    }

    #[test]
    fn segment_count_is_capped_on_input_and_decode() {
        assert_eq!(SegmentCount::new(255).map(SegmentCount::get), Ok(255));
        assert_eq!(
            SegmentCount::new(256),
            Err(PaintError::InvalidSegmentCount { value: 256, max: 255 })
        );
        let mut stored = serde_json::to_value(TrainModeProps::default()).unwrap();
        stored["numberOfNSegmentsBefore"][1] = 255.into();
        assert!(serde_json::from_value::<TrainModeProps>(stored.clone()).is_ok());
        stored["numberOfNSegmentsBefore"][1] = 4_000_000_000_u32.into();
        assert!(serde_json::from_value::<TrainModeProps>(stored).is_err());
    }

    #[test]
    fn train_set_resolves_segment_counts() {
        let mut props = TrainModeProps::default();
        props.set_number_of_sets(SetCount::TWO);
        props.set_paint_start(SetSlot::Second, PaintStart::BeforeNSegments);
        props.set_paint_end(SetSlot::Second, PaintEnd::AfterNSegments);
        props.set_n_segments(SetSlot::Second, SegmentSide::Before, SegmentCount(5));
        props.set_n_segments(SetSlot::Second, SegmentSide::After, SegmentCount(7));
        props.set_track_colour(SetSlot::Second, TrackColourPart::Supports, Colour(12));

        let info = props.train_set(3);
        assert_eq!(info.slot, 1);
        assert_eq!(info.start, StartRule::BeforeNSegments(5));
        assert_eq!(info.end, EndRule::AfterNSegments(7));
        assert_eq!(info.track_colours.supports, Colour(12));

        let first = props.train_set(4);
        assert_eq!(first.start, StartRule::WithFirstCar);
        assert_eq!(first.end, EndRule::Perpetual);
    }

    #[test]
    fn tail_pattern_editing() {
        let mut tail = TailModeProps::default();
        let one = PatternValue::new(1).unwrap();
        let three = PatternValue::new(3).unwrap();
        tail.add_to_pattern(PatternChoice::After, one);
        tail.add_to_pattern(PatternChoice::After, three);
        assert_eq!(tail.pattern(PatternChoice::After), &[one, three]);
        assert_eq!(tail.remove_from_pattern(PatternChoice::After), Some(three));
        assert!(tail.pattern(PatternChoice::Before).is_empty());
        assert_eq!(tail.remove_from_pattern(PatternChoice::Before), None);
        assert_eq!(tail.slot_for(PatternValue::MAIN), None);
        assert_eq!(tail.slot_for(three), Some(0));
        assert!(PatternValue::new(4).is_none());
    }

    #[test]
    fn train_props_use_stored_key_names() {
        let value = serde_json::to_value(TrainModeProps::default()).unwrap();
        assert_eq!(value["numberVehicleSets"], 1);
        assert_eq!(value["paintStart"][0], "withFirstCar");
        assert_eq!(value["paintEnd"][2], "perpetual");
        assert_eq!(value["numberOfNSegmentsBefore"][1], 3);
        assert_eq!(value["colourSets"][0]["trackColours"]["main"], 0);
    }
}
