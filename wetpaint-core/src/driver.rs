//! Per-tick orchestration over every ride with painting enabled.
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::checker::evaluate;
use crate::commands::{ChangeKind, ConfigCommand, ConfigEvent};
use crate::config::PaintConfig;
use crate::error::PaintError;
use crate::host::{RideHost, RideId};
use crate::network::TrackNetwork;
use crate::painter::{dispatch_all, vehicle_colour_plan, Painter, PainterError, VehicleScheme};
use crate::props::VehicleColours;
use crate::store::{load_all, PaintStorage};

/// Counters for one call to [`PaintDriver::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub commands_applied: usize,
    pub commands_rejected: usize,
    pub configs_removed: usize,
    pub rides_checked: usize,
    pub trains_checked: usize,
    pub trains_skipped: usize,
    pub targets: usize,
    pub painted: usize,
    pub desynced: bool,
}

impl TickReport {
    /// Add another report's counters to this one.
    pub fn absorb(&mut self, other: &Self) {
        self.commands_applied += other.commands_applied;
        self.commands_rejected += other.commands_rejected;
        self.configs_removed += other.configs_removed;
        self.rides_checked += other.rides_checked;
        self.trains_checked += other.trains_checked;
        self.trains_skipped += other.trains_skipped;
        self.targets += other.targets;
        self.painted += other.painted;
        self.desynced |= other.desynced;
    }
}

type Observer = Box<dyn FnMut(&ConfigEvent)>;

/// Owns the active configurations and drives painting each tick.
///
/// Configuration edits arrive through [`PaintDriver::submit`] and only take
/// effect at the start of the next tick, so a tick always sees one
/// consistent set of rules.
pub struct PaintDriver<S: PaintStorage> {
    storage: S,
    configs: Vec<PaintConfig>,
    pending: VecDeque<(RideId, ConfigCommand)>,
    observers: Vec<Observer>,
}

impl<S: PaintStorage> fmt::Debug for PaintDriver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaintDriver")
            .field("configs", &self.configs)
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: PaintStorage> PaintDriver<S> {
    /// Driver with no active configurations.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            configs: Vec::new(),
            pending: VecDeque::new(),
            observers: Vec::new(),
        }
    }

    /// Driver holding every enabled configuration stored for rides in the
    /// park.
    ///
    /// # Errors
    ///
    /// Returns the storage error if loading fails.
    pub fn load<H: RideHost>(storage: S, host: &H) -> Result<Self, S::Error> {
        let configs = load_all(&storage, host, false)?
            .into_iter()
            .filter(|config| config.enabled)
            .collect();
        Ok(Self {
            configs,
            ..Self::new(storage)
        })
    }

    #[must_use]
    pub fn configs(&self) -> &[PaintConfig] {
        &self.configs
    }

    #[must_use]
    pub fn config(&self, ride: RideId) -> Option<&PaintConfig> {
        self.configs.iter().find(|config| config.ride == ride)
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Register a callback for configuration changes.
    pub fn subscribe(&mut self, observer: impl FnMut(&ConfigEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Queue an edit for the start of the next tick.
    pub fn submit(&mut self, ride: RideId, command: ConfigCommand) {
        self.pending.push_back((ride, command));
    }

    fn notify(&mut self, event: &ConfigEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }

    /// Apply queued edits in submission order. Returns `(applied, rejected)`.
    pub fn apply_pending<H: RideHost, P: Painter>(&mut self, host: &H, painter: &mut P) -> (usize, usize) {
        let mut applied = 0;
        let mut rejected = 0;
        while let Some((ride, command)) = self.pending.pop_front() {
            match self.apply_command(host, painter, ride, command) {
                Ok(()) => applied += 1,
                Err(err) => {
                    warn!("rejected edit for ride {ride}: {err}");
                    rejected += 1;
                }
            }
        }
        (applied, rejected)
    }

    fn apply_command<H: RideHost, P: Painter>(
        &mut self,
        host: &H,
        painter: &mut P,
        ride: RideId,
        command: ConfigCommand,
    ) -> Result<(), PaintError> {
        if !host.ride_exists(ride) {
            return Err(PaintError::UnknownRide { ride });
        }
        let mut config = match self.config(ride) {
            Some(existing) => existing.clone(),
            None => self.stored_or_default(ride),
        };
        let change = command.apply(&mut config)?;
        if let Err(err) = self.storage.save(&config) {
            warn!("could not save configuration for ride {ride}: {err}");
        }
        if change == ChangeKind::VehicleColours
            && let Err(err) = recolour_vehicles(host, painter, &config)
        {
            warn!("could not recolour vehicles on ride {ride}: {err}");
        }
        // An active ride that was just disabled stays until the next prune.
        match self.configs.iter_mut().find(|existing| existing.ride == ride) {
            Some(existing) => *existing = config.clone(),
            None if config.enabled => self.configs.push(config.clone()),
            None => {}
        }
        self.notify(&ConfigEvent::Changed(config));
        Ok(())
    }

    fn stored_or_default(&self, ride: RideId) -> PaintConfig {
        match self.storage.load(ride) {
            Ok(Some(config)) => config,
            Ok(None) => PaintConfig::new(ride),
            Err(err) => {
                warn!("could not read stored configuration for ride {ride}: {err}");
                PaintConfig::new(ride)
            }
        }
    }

    /// Drop disabled configurations and those whose ride is gone.
    fn prune<H: RideHost>(&mut self, host: &H) -> usize {
        let (keep, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.configs)
            .into_iter()
            .partition(|config| config.enabled && host.ride_exists(config.ride));
        self.configs = keep;
        for config in &removed {
            if !host.ride_exists(config.ride) {
                debug!("ride {} no longer exists, forgetting its configuration", config.ride);
                if let Err(err) = self.storage.clear(config.ride) {
                    warn!("could not clear stored configuration for ride {}: {err}", config.ride);
                }
            }
            self.notify(&ConfigEvent::Removed(config.ride));
        }
        removed.len()
    }

    /// Replace every configuration with what storage holds. With `reset`
    /// storage is cleared first.
    pub fn reload<H: RideHost>(&mut self, host: &H, reset: bool) {
        match load_all(&self.storage, host, reset) {
            Ok(configs) => {
                self.configs = configs.into_iter().filter(|config| config.enabled).collect();
                let count = self.configs.len();
                info!("reloaded {count} ride configuration(s)");
                self.notify(&ConfigEvent::Reloaded { count });
            }
            Err(err) => warn!("could not reload ride configurations: {err}"),
        }
    }

    /// Run one simulation tick: apply queued edits, drop stale
    /// configurations, then evaluate and paint every train of every enabled
    /// ride.
    pub fn tick<H, N, P>(&mut self, host: &mut H, network: &N, painter: &mut P) -> TickReport
    where
        H: RideHost,
        N: TrackNetwork,
        P: Painter,
    {
        let mut report = TickReport::default();
        let (applied, rejected) = self.apply_pending(host, painter);
        report.commands_applied = applied;
        report.commands_rejected = rejected;
        report.configs_removed = self.prune(host);

        for config in &self.configs {
            report.rides_checked += 1;
            host.refresh_ride(config.ride);
            let Some(trains) = host.trains_of(config.ride) else {
                warn!("{}", PaintError::ConfigDesync { ride: config.ride });
                report.desynced = true;
                continue;
            };
            if let Some(&first) = trains.first()
                && host.cars_of(first).is_empty()
            {
                debug!("ride {} has no cars yet", config.ride);
                continue;
            }
            for train in trains {
                report.trains_checked += 1;
                match evaluate(config, host, network, train) {
                    Ok(targets) => {
                        report.targets += targets.len();
                        report.painted += dispatch_all(painter, network, &targets);
                    }
                    Err(err) => {
                        debug!("skipping train {train}: {err}");
                        report.trains_skipped += 1;
                    }
                }
            }
        }

        if report.desynced {
            self.reload(host, true);
        }
        report
    }
}

/// Switch the ride to per-train vehicle colours and paint each train with
/// its set's colours.
///
/// # Errors
///
/// Returns the first error reported by the painter.
pub fn recolour_vehicles<H: RideHost, P: Painter>(
    host: &H,
    painter: &mut P,
    config: &PaintConfig,
) -> Result<(), PainterError> {
    let Some(props) = config.train_props() else {
        return Ok(());
    };
    let train_count = host.trains_of(config.ride).map_or(0, |trains| trains.len());
    painter.set_vehicle_scheme(config.ride, VehicleScheme::PerTrain)?;
    let sets: Vec<VehicleColours> = props.colour_sets.iter().map(|set| set.vehicle_colours).collect();
    for (train_index, colours) in vehicle_colour_plan(&sets, props.number_vehicle_sets, train_count) {
        painter.set_vehicle_colours(config.ride, train_index, colours)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TrackLayout;
    use crate::position::TileCoord;
    use crate::props::{SetSlot, TrackColourPart, VehicleColourPart};
    use crate::sim::{PaintCall, RecordingPainter, SimHost};
    use crate::store::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (TrackLayout, SimHost) {
        let layout = TrackLayout::rectangle(TileCoord::new(0, 0), 4, 4, 0);
        let mut host = SimHost::new();
        host.add_train(&layout, RideId(1), 3, 0, 2);
        (layout, host)
    }

    #[test]
    fn commands_apply_at_next_tick_and_notify() {
        let (layout, mut host) = setup();
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        driver.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        driver.submit(RideId(1), ConfigCommand::SetEnabled { enabled: true });
        assert!(driver.config(RideId(1)).is_none());
        assert_eq!(driver.pending(), 1);

        let report = driver.tick(&mut host, &layout, &mut painter);
        assert_eq!(report.commands_applied, 1);
        assert_eq!(report.trains_checked, 1);
        assert_eq!(report.painted, 1);
        assert!(driver.config(RideId(1)).is_some_and(|c| c.enabled));
        assert!(driver.storage().raw(RideId(1)).is_some());
        assert!(matches!(events.borrow()[0], ConfigEvent::Changed(_)));
    }

    #[test]
    fn unknown_ride_and_bad_values_are_rejected() {
        let (layout, mut host) = setup();
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        driver.submit(RideId(9), ConfigCommand::SetEnabled { enabled: true });
        driver.submit(RideId(1), ConfigCommand::SetNumberOfSets { count: 4 });
        let report = driver.tick(&mut host, &layout, &mut painter);
        assert_eq!(report.commands_rejected, 2);
        assert!(driver.configs().is_empty());
    }

    #[test]
    fn disabled_and_demolished_rides_are_dropped_lazily() {
        let (layout, mut host) = setup();
        host.add_train(&layout, RideId(2), 8, 0, 1);
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        driver.submit(RideId(1), ConfigCommand::SetEnabled { enabled: true });
        driver.submit(RideId(2), ConfigCommand::SetEnabled { enabled: true });
        driver.tick(&mut host, &layout, &mut painter);
        assert_eq!(driver.configs().len(), 2);

        driver.submit(RideId(1), ConfigCommand::SetEnabled { enabled: false });
        host.remove_ride(RideId(2));
        let report = driver.tick(&mut host, &layout, &mut painter);
        assert_eq!(report.configs_removed, 2);
        assert!(driver.configs().is_empty());
        assert!(driver.storage().raw(RideId(1)).is_some());
        assert!(driver.storage().raw(RideId(2)).is_none());
    }

    #[test]
    fn editing_an_inactive_ride_saves_without_activating_it() {
        let (layout, mut host) = setup();
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        driver.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        driver.submit(
            RideId(1),
            ConfigCommand::SetTrackColour {
                slot: SetSlot::First,
                part: TrackColourPart::Main,
                colour: 7,
            },
        );
        let report = driver.tick(&mut host, &layout, &mut painter);
        assert_eq!(report.commands_applied, 1);
        assert_eq!(report.configs_removed, 0);
        assert_eq!(report.rides_checked, 0);
        assert!(driver.configs().is_empty());
        assert!(driver.storage().raw(RideId(1)).is_some());
        assert_eq!(events.borrow().len(), 1);
        assert!(matches!(events.borrow()[0], ConfigEvent::Changed(_)));

        driver.submit(RideId(1), ConfigCommand::SetEnabled { enabled: true });
        driver.tick(&mut host, &layout, &mut painter);
        let config = driver.config(RideId(1)).unwrap();
        assert_eq!(
            config.train_props().unwrap().colour_sets[0].track_colours.main.value(),
            7
        );
    }

    #[test]
    fn vehicle_colour_edit_repaints_trains() {
        let (layout, mut host) = setup();
        host.add_train(&layout, RideId(1), 9, 0, 2);
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        driver.submit(RideId(1), ConfigCommand::SetNumberOfSets { count: 2 });
        driver.submit(
            RideId(1),
            ConfigCommand::SetVehicleColour {
                slot: SetSlot::Second,
                part: VehicleColourPart::Body,
                colour: 12,
            },
        );
        driver.apply_pending(&host, &mut painter);
        let last_two: Vec<&PaintCall> = painter.calls().iter().rev().take(2).collect();
        assert!(matches!(
            last_two[0],
            PaintCall::VehicleColours { train_index: 1, colours, .. } if colours.body.value() == 12
        ));
        assert!(matches!(
            last_two[1],
            PaintCall::VehicleColours { train_index: 0, .. }
        ));
        assert!(driver.tick(&mut host, &layout, &mut painter).rides_checked == 0);
    }

    #[test]
    fn desync_reloads_with_reset() {
        let (layout, mut host) = setup();
        let mut painter = RecordingPainter::new();
        let mut driver = PaintDriver::new(MemoryStorage::new());
        driver.submit(RideId(1), ConfigCommand::SetEnabled { enabled: true });
        driver.tick(&mut host, &layout, &mut painter);

        host.set_desynced(RideId(1), true);
        let report = driver.tick(&mut host, &layout, &mut painter);
        assert!(report.desynced);
        assert!(driver.configs().is_empty());
        assert!(driver.storage().is_empty());
    }
}
