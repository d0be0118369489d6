//! Runs a park plan through the engine tick by tick.
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use wetpaint_core::{
    ConfigEvent, MemoryStorage, PaintCall, PaintDriver, RecordingPainter, RideId, SimHost,
    TickReport, TileCoord, TrackLayout,
};

use crate::scenario::{ParkEvent, ParkPlan};
use crate::util::digest;

const BASE_Z: i32 = 16;
const MIN_SPEED: i32 = 3;
/// Stays under the progress threshold so no segment entry is skipped.
const MAX_SPEED: i32 = 12;

/// What happened over one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: usize,
    pub totals: TickReport,
    pub desync_ticks: usize,
    pub schemes_seen: BTreeSet<u8>,
    pub segment_calls: usize,
    pub vehicle_calls: usize,
    pub changes: usize,
    pub removals: usize,
    pub reloads: usize,
    pub final_configs: Vec<RideId>,
    pub stored_rides: usize,
    /// Hash of every painter call in order.
    pub digest: u64,
}

#[derive(Debug, Default)]
struct EventCounts {
    changes: usize,
    removals: usize,
    reloads: usize,
}

fn apply_event(
    event: &ParkEvent,
    driver: &mut PaintDriver<MemoryStorage>,
    host: &mut SimHost,
    layout: &mut TrackLayout,
) {
    debug!("park event: {event:?}");
    match event {
        ParkEvent::Command(ride, command) => driver.submit(*ride, command.clone()),
        ParkEvent::Desync(ride) => host.set_desynced(*ride, true),
        ParkEvent::Demolish(ride) => host.remove_ride(*ride),
        ParkEvent::Sever(piece) => layout.sever_after(*piece),
        ParkEvent::Repair => layout.repair_all(),
    }
}

/// Simulate `plan` for `ticks` ticks. Train placement and speeds come from
/// `seed`, so equal inputs give equal digests.
pub fn run_plan(plan: &ParkPlan, seed: u64, ticks: usize) -> RunSummary {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut layout = TrackLayout::rectangle(TileCoord::new(0, 0), plan.width, plan.height, BASE_Z);
    let mut host = SimHost::new();

    let total_trains = plan.rides.iter().map(|ride| ride.trains).sum::<usize>().max(1);
    let mut slot = 0;
    for ride in &plan.rides {
        host.add_ride(ride.ride);
        for _ in 0..ride.trains {
            let piece = slot * layout.len() / total_trains;
            let progress = rng.gen_range(0..32);
            let train = host.add_train(&layout, ride.ride, piece, progress, ride.cars);
            host.set_speed(train, rng.gen_range(MIN_SPEED..=MAX_SPEED));
            slot += 1;
        }
    }

    let storage = MemoryStorage::new();
    let mut driver = PaintDriver::new(storage.clone());
    let counts = Rc::new(RefCell::new(EventCounts::default()));
    let sink = Rc::clone(&counts);
    driver.subscribe(move |event| {
        let mut counts = sink.borrow_mut();
        match event {
            ConfigEvent::Changed(_) => counts.changes += 1,
            ConfigEvent::Removed(_) => counts.removals += 1,
            ConfigEvent::Reloaded { .. } => counts.reloads += 1,
        }
    });
    for ride in &plan.rides {
        for command in &ride.commands {
            driver.submit(ride.ride, command.clone());
        }
    }

    let mut painter = if plan.strict_elevation {
        RecordingPainter::strict(&layout)
    } else {
        RecordingPainter::new()
    };

    let mut summary = RunSummary {
        ticks,
        ..RunSummary::default()
    };
    for tick in 0..ticks {
        for (_, event) in plan.events.iter().filter(|(at, _)| *at == tick) {
            apply_event(event, &mut driver, &mut host, &mut layout);
        }
        let report = driver.tick(&mut host, &layout, &mut painter);
        if report.desynced {
            summary.desync_ticks += 1;
        }
        summary.totals.absorb(&report);
        host.step(&layout);
    }

    for call in painter.calls() {
        match call {
            PaintCall::SegmentScheme { scheme, .. } => {
                summary.segment_calls += 1;
                summary.schemes_seen.insert(scheme.index());
            }
            PaintCall::VehicleColours { .. } => summary.vehicle_calls += 1,
            PaintCall::TrackColours { .. } | PaintCall::VehicleScheme { .. } => {}
        }
    }
    summary.digest = digest(&serde_json::to_vec(painter.calls()).unwrap_or_default());
    let counts = counts.borrow();
    summary.changes = counts.changes;
    summary.removals = counts.removals;
    summary.reloads = counts.reloads;
    summary.final_configs = driver.configs().iter().map(|config| config.ride).collect();
    summary.stored_rides = storage.len();
    summary
}
