pub mod reports;
pub mod simulation;
pub mod tester;

pub use simulation::{RunSummary, run_plan};
pub use tester::{LogicTester, ScenarioResult};
