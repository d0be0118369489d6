use std::collections::BTreeSet;
use wetpaint_core::{
    ConfigCommand, ModeKind, PaintEnd, PaintStart, PatternChoice, RideId, SegmentSide, SetSlot,
    TrackColourPart, VehicleColourPart,
};

use super::{ParkEvent, ParkPlan, RidePlan, Scenario};
use crate::logic::RunSummary;

pub fn catalog_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "default-train",
            "Default rules: each first car paints the segment it enters",
            ParkPlan::new(8, 6).with_ride(RidePlan::new(1, 2, 3)),
            default_train_expectation,
        ),
        Scenario::new(
            "multi-set",
            "Three train sets cycle schemes 1-3 and vehicle colours",
            ParkPlan::new(10, 6).with_ride(multi_set_ride()),
            multi_set_expectation,
        ),
        Scenario::new(
            "n-segments",
            "Paint N segments ahead of the train and restore N behind",
            ParkPlan::new(8, 8).with_ride(n_segments_ride()),
            main_and_overlay_expectation,
        ),
        Scenario::new(
            "after-first-car",
            "Restore main colours two segments behind the second car",
            ParkPlan::new(8, 6).with_ride(
                RidePlan::new(1, 2, 4).with_command(ConfigCommand::SetPaintEnd {
                    slot: SetSlot::First,
                    end: PaintEnd::AfterFirstCar,
                }),
            ),
            main_and_overlay_expectation,
        ),
        Scenario::new(
            "tail-pattern",
            "Tail mode lays colour patterns ahead of and behind each train",
            ParkPlan::new(9, 7).with_ride(tail_ride()),
            tail_expectation,
        ),
        Scenario::new(
            "desync-recovery",
            "A ride losing its train list triggers a reset reload",
            ParkPlan::new(8, 6)
                .with_ride(RidePlan::new(1, 1, 2))
                .with_ride(RidePlan::new(2, 1, 2))
                .with_event(25, ParkEvent::Desync(RideId(2))),
            desync_expectation,
        ),
        Scenario::new(
            "demolish",
            "Demolishing a ride drops its configuration and saved entry",
            ParkPlan::new(8, 6)
                .with_ride(RidePlan::new(1, 1, 2))
                .with_ride(RidePlan::new(2, 1, 2))
                .with_event(20, ParkEvent::Demolish(RideId(2))),
            demolish_expectation,
        ),
        Scenario::new(
            "disable",
            "Disabling a ride stops painting but keeps its saved entry",
            ParkPlan::new(8, 6).with_ride(RidePlan::new(1, 2, 2)).with_event(
                20,
                ParkEvent::Command(RideId(1), ConfigCommand::SetEnabled { enabled: false }),
            ),
            disable_expectation,
        ),
        Scenario::new(
            "broken-track",
            "Walks across a severed link paint nothing instead of a partial run",
            ParkPlan::new(8, 6)
                .with_ride(n_segments_ride())
                .with_event(10, ParkEvent::Sever(5))
                .with_event(30, ParkEvent::Repair),
            broken_track_expectation,
        ),
        Scenario::new(
            "strict-host",
            "Every target resolves to an existing segment at its exact elevation",
            ParkPlan::new(8, 6).with_ride(n_segments_ride()).strict(),
            strict_host_expectation,
        ),
    ]
}

fn multi_set_ride() -> RidePlan {
    let mut ride = RidePlan::new(1, 3, 2).with_command(ConfigCommand::SetNumberOfSets { count: 3 });
    for (slot, colour) in SetSlot::ALL.into_iter().zip([4_u8, 12, 20]) {
        ride = ride
            .with_command(ConfigCommand::SetTrackColour {
                slot,
                part: TrackColourPart::Main,
                colour,
            })
            .with_command(ConfigCommand::SetVehicleColour {
                slot,
                part: VehicleColourPart::Body,
                colour,
            });
    }
    ride
}

fn n_segments_ride() -> RidePlan {
    RidePlan::new(1, 2, 2)
        .with_command(ConfigCommand::SetPaintStart {
            slot: SetSlot::First,
            start: PaintStart::BeforeNSegments,
        })
        .with_command(ConfigCommand::SetPaintEnd {
            slot: SetSlot::First,
            end: PaintEnd::AfterNSegments,
        })
        .with_command(ConfigCommand::SetNSegments {
            slot: SetSlot::First,
            side: SegmentSide::Before,
            count: 3,
        })
        .with_command(ConfigCommand::SetNSegments {
            slot: SetSlot::First,
            side: SegmentSide::After,
            count: 2,
        })
}

fn tail_ride() -> RidePlan {
    RidePlan::new(1, 2, 3)
        .with_command(ConfigCommand::SetMode { mode: ModeKind::Tail })
        .with_command(ConfigCommand::SetPattern {
            choice: PatternChoice::Before,
            values: vec![1, 2, 0],
        })
        .with_command(ConfigCommand::SetPattern {
            choice: PatternChoice::After,
            values: vec![2, 1],
        })
        .with_command(ConfigCommand::SetTailTrackColour {
            slot: SetSlot::Second,
            part: TrackColourPart::Supports,
            colour: 9,
        })
}

fn require(condition: bool, message: impl Into<String>) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message.into())
    }
}

fn require_schemes(summary: &RunSummary, schemes: &[u8]) -> Result<(), String> {
    for scheme in schemes {
        require(
            summary.schemes_seen.contains(scheme),
            format!("scheme {scheme} never painted (saw {:?})", summary.schemes_seen),
        )?;
    }
    Ok(())
}

fn default_train_expectation(summary: &RunSummary) -> Result<(), String> {
    require(summary.totals.painted > 0, "nothing was painted")?;
    require(summary.desync_ticks == 0, "unexpected desync")?;
    require(
        summary.schemes_seen == BTreeSet::from([1]),
        format!("expected only scheme 1, saw {:?}", summary.schemes_seen),
    )
}

fn multi_set_expectation(summary: &RunSummary) -> Result<(), String> {
    require_schemes(summary, &[1, 2, 3])?;
    require(
        summary.vehicle_calls >= 3,
        format!("only {} vehicle colour calls", summary.vehicle_calls),
    )
}

fn main_and_overlay_expectation(summary: &RunSummary) -> Result<(), String> {
    require(summary.totals.painted > 0, "nothing was painted")?;
    require_schemes(summary, &[0, 1])
}

fn tail_expectation(summary: &RunSummary) -> Result<(), String> {
    require_schemes(summary, &[0, 1, 2])?;
    require(
        !summary.schemes_seen.contains(&3),
        "scheme 3 used with two tail sets",
    )
}

fn desync_expectation(summary: &RunSummary) -> Result<(), String> {
    require(
        summary.desync_ticks == 1,
        format!("expected one desync tick, got {}", summary.desync_ticks),
    )?;
    require(summary.reloads >= 1, "no reload event observed")?;
    require(summary.final_configs.is_empty(), "configurations survived the reset")?;
    require(summary.stored_rides == 0, "stored entries survived the reset")
}

fn demolish_expectation(summary: &RunSummary) -> Result<(), String> {
    require(
        summary.final_configs == [RideId(1)],
        format!("unexpected active rides {:?}", summary.final_configs),
    )?;
    require(summary.removals >= 1, "no removal event observed")?;
    require(summary.stored_rides == 1, "demolished ride still stored")
}

fn disable_expectation(summary: &RunSummary) -> Result<(), String> {
    require(summary.final_configs.is_empty(), "disabled ride still active")?;
    require(summary.stored_rides == 1, "disabled ride lost its saved entry")?;
    require(summary.removals == 1, "expected exactly one removal event")
}

fn broken_track_expectation(summary: &RunSummary) -> Result<(), String> {
    require(summary.totals.painted > 0, "nothing was painted")?;
    require(summary.desync_ticks == 0, "unexpected desync")
}

fn strict_host_expectation(summary: &RunSummary) -> Result<(), String> {
    require(summary.totals.targets > 0, "no targets computed")?;
    require(
        summary.totals.painted == summary.totals.targets,
        format!(
            "{} of {} targets rejected",
            summary.totals.targets - summary.totals.painted,
            summary.totals.targets
        ),
    )
}
