//! Rule engine: decides whether a train needs repainting this tick and which
//! segments it touches.
//!
//! A segment counts as "just entered" while the car's progress along it is
//! under [`LAZY_PROGRESS_THRESHOLD`]. Outside that window nothing is looked up.
use log::{debug, trace};

use crate::config::{PaintConfig, PaintMode};
use crate::constants::{
    AFTER_FIRST_CAR_WALK, LAZY_PROGRESS_THRESHOLD, TAIL_END_AFTER_SEGMENT, TAIL_START_BEFORE_SEGMENT,
};
use crate::error::PaintError;
use crate::host::{CarSample, RideHost, TrainId};
use crate::network::TrackNetwork;
use crate::painter::{PaintTarget, PaintTargets};
use crate::props::{
    EndRule, PatternChoice, PatternValue, StartRule, TailModeProps, TrackColours, TrainModeProps,
};
use crate::walker::{nth_node_behind, segment_at, walk_from, SegmentList, TrackSegment};

/// Front, second and rear car of one train, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainSample {
    pub first: CarSample,
    /// Falls back to the last car on single-car trains.
    pub second: CarSample,
    pub last: CarSample,
}

impl TrainSample {
    /// Build from cars ordered front to back.
    #[must_use]
    pub fn from_cars(cars: &[CarSample]) -> Option<Self> {
        let first = *cars.first()?;
        let last = *cars.last()?;
        let second = cars.get(1).copied().unwrap_or(last);
        Some(Self { first, second, last })
    }
}

const fn just_entered(sample: &CarSample) -> bool {
    sample.progress < LAZY_PROGRESS_THRESHOLD
}

fn to_steps(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Sample the first, last and second car of `train`, in that order.
///
/// # Errors
///
/// Returns [`PaintError::CarMissing`] when the train has no cars or any of
/// the three cars cannot be sampled.
pub fn sample<H: RideHost>(host: &mut H, train: TrainId) -> Result<TrainSample, PaintError> {
    let missing = PaintError::CarMissing { train };
    let cars = host.cars_of(train);
    let (Some(&first_id), Some(&last_id)) = (cars.first(), cars.last()) else {
        return Err(missing);
    };
    let first = host.car_sample(first_id).ok_or_else(|| missing.clone())?;
    let last = host.car_sample(last_id).ok_or_else(|| missing.clone())?;
    let second = match cars.get(1) {
        Some(&id) => host.car_sample(id).ok_or(missing)?,
        None => last,
    };
    Ok(TrainSample { first, second, last })
}

/// Cheap gate run before any track lookup.
#[must_use]
pub fn should_recompute(mode: &PaintMode, train_index: usize, sample: &TrainSample) -> bool {
    let first = just_entered(&sample.first);
    let last = just_entered(&sample.last);
    match mode {
        PaintMode::Train(props) => {
            let info = props.train_set(train_index);
            let watches_first = matches!(info.start, StartRule::WithFirstCar)
                || matches!(info.end, EndRule::AfterFirstCar);
            let watches_last = matches!(info.start, StartRule::AfterLastCar)
                || matches!(info.end, EndRule::AfterLastCar);
            let watches_either = matches!(info.start, StartRule::BeforeNSegments(_))
                || matches!(info.end, EndRule::AfterNSegments(_));
            (watches_first && first) || (watches_last && last) || (watches_either && (first || last))
        }
        PaintMode::Tail(_) => first || last,
    }
}

/// Targets for a train in train mode: start rule first, then end rule.
#[must_use]
pub fn compute_train<N: TrackNetwork>(
    network: &N,
    props: &TrainModeProps,
    train: TrainId,
    sample: &TrainSample,
) -> PaintTargets {
    let info = props.train_set(train.index);
    let mut segments = SegmentList::new();

    match info.start {
        StartRule::WithFirstCar => {
            if just_entered(&sample.first) {
                push_single(&mut segments, segment_at(network, sample.first.position, false));
            }
        }
        StartRule::AfterLastCar => {
            if just_entered(&sample.last) {
                push_single(&mut segments, segment_at(network, sample.last.position, false));
            }
        }
        StartRule::BeforeNSegments(count) => {
            segments.extend(walk_from(network, sample.first.position, -to_steps(count), false));
        }
    }

    match info.end {
        EndRule::AfterFirstCar => {
            if just_entered(&sample.second) {
                segments.extend(walk_from(network, sample.second.position, AFTER_FIRST_CAR_WALK, true));
            }
        }
        EndRule::AfterLastCar => {
            if just_entered(&sample.last) {
                push_single(&mut segments, segment_at(network, sample.last.position, true));
            }
        }
        EndRule::AfterNSegments(count) => {
            push_single(
                &mut segments,
                nth_node_behind(network, sample.last.position, to_steps(count), true),
            );
        }
        EndRule::Perpetual => {}
    }

    segments
        .into_iter()
        .map(|segment| PaintTarget::from_segment(train.ride, segment, info.track_colours, info.slot))
        .collect()
}

fn push_single(segments: &mut SegmentList, segment: Result<TrackSegment, PaintError>) {
    match segment {
        Ok(segment) => segments.push(segment),
        Err(err) => debug!("dropping single-segment target: {err}"),
    }
}

/// Targets for a train in tail mode: the pattern ahead of the first car, then
/// the pattern behind the last car.
#[must_use]
pub fn compute_tail<N: TrackNetwork>(
    network: &N,
    props: &TailModeProps,
    train: TrainId,
    sample: &TrainSample,
) -> PaintTargets {
    let mut targets = PaintTargets::new();
    for (choice, anchor) in [
        (PatternChoice::Before, sample.first.position),
        (PatternChoice::After, sample.last.position),
    ] {
        let pattern = props.pattern(choice);
        if pattern.is_empty() {
            continue;
        }
        let steps = to_steps(u32::try_from(pattern.len()).unwrap_or(u32::MAX));
        let mut walk = match choice {
            PatternChoice::Before => walk_from(network, anchor, -steps, false),
            PatternChoice::After => walk_from(network, anchor, steps, false),
        };
        match choice {
            PatternChoice::Before => {
                let skip = TAIL_START_BEFORE_SEGMENT.min(walk.len());
                walk.drain(..skip);
            }
            PatternChoice::After => {
                walk.truncate(walk.len().saturating_sub(TAIL_END_AFTER_SEGMENT));
            }
        }
        targets.extend(tag_pattern(props, train, &walk, pattern, props.start(choice)));
    }
    targets
}

/// Tag walk entries `start..start + pattern.len()` with successive pattern
/// values. Value 0 paints the main scheme, any other value picks a tail set.
fn tag_pattern<'a>(
    props: &'a TailModeProps,
    train: TrainId,
    walk: &'a [TrackSegment],
    pattern: &'a [PatternValue],
    start: usize,
) -> impl Iterator<Item = PaintTarget> + 'a {
    walk.iter()
        .skip(start)
        .zip(pattern)
        .map(move |(segment, &value)| match props.slot_for(value) {
            None => PaintTarget::from_segment(
                train.ride,
                TrackSegment {
                    main: true,
                    ..*segment
                },
                TrackColours::default(),
                0,
            ),
            Some(slot) => PaintTarget::from_segment(
                train.ride,
                TrackSegment {
                    main: false,
                    ..*segment
                },
                props.track_colour_sets[slot],
                slot,
            ),
        })
}

/// Sample, gate and compute in one call.
///
/// # Errors
///
/// Returns [`PaintError::CarMissing`] when the train cannot be sampled. Track
/// lookup failures never surface here; they only shrink the target list.
pub fn evaluate<H: RideHost, N: TrackNetwork>(
    config: &PaintConfig,
    host: &mut H,
    network: &N,
    train: TrainId,
) -> Result<PaintTargets, PaintError> {
    let sample = sample(host, train)?;
    if !should_recompute(&config.mode, train.index, &sample) {
        return Ok(PaintTargets::new());
    }
    let targets = match &config.mode {
        PaintMode::Train(props) => compute_train(network, props, train, &sample),
        PaintMode::Tail(props) => compute_tail(network, props, train, &sample),
    };
    trace!("train {train}: {} target(s)", targets.len());
    Ok(targets)
}
