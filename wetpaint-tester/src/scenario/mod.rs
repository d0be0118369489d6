mod catalog;

use wetpaint_core::{ConfigCommand, RideId};

use crate::logic::RunSummary;

pub use catalog::catalog_scenarios;

/// Something that happens to the park at a given tick.
#[derive(Debug, Clone)]
pub enum ParkEvent {
    Command(RideId, ConfigCommand),
    Desync(RideId),
    Demolish(RideId),
    Sever(usize),
    Repair,
}

#[derive(Debug, Clone)]
pub struct RidePlan {
    pub ride: RideId,
    pub trains: usize,
    pub cars: usize,
    /// Submitted before the first tick.
    pub commands: Vec<ConfigCommand>,
}

impl RidePlan {
    pub fn new(ride: u16, trains: usize, cars: usize) -> Self {
        Self {
            ride: RideId(ride),
            trains,
            cars,
            commands: vec![ConfigCommand::SetEnabled { enabled: true }],
        }
    }

    pub fn with_command(mut self, command: ConfigCommand) -> Self {
        self.commands.push(command);
        self
    }
}

/// A park to simulate: one rectangular circuit shared by every ride.
#[derive(Debug, Clone)]
pub struct ParkPlan {
    pub width: i32,
    pub height: i32,
    pub rides: Vec<RidePlan>,
    pub events: Vec<(usize, ParkEvent)>,
    pub strict_elevation: bool,
}

impl ParkPlan {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            rides: Vec::new(),
            events: Vec::new(),
            strict_elevation: false,
        }
    }

    pub fn with_ride(mut self, ride: RidePlan) -> Self {
        self.rides.push(ride);
        self
    }

    pub fn with_event(mut self, tick: usize, event: ParkEvent) -> Self {
        self.events.push((tick, event));
        self
    }

    pub const fn strict(mut self) -> Self {
        self.strict_elevation = true;
        self
    }
}

pub type Expectation = fn(&RunSummary) -> Result<(), String>;

pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    pub plan: ParkPlan,
    pub expectation: Expectation,
}

impl Scenario {
    pub const fn new(
        key: &'static str,
        description: &'static str,
        plan: ParkPlan,
        expectation: Expectation,
    ) -> Self {
        Self {
            key,
            description,
            plan,
            expectation,
        }
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn get_scenario(key: &str) -> Option<Scenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}
