use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::simulation::{RunSummary, run_plan};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub ticks: usize,
    pub targets: usize,
    pub painted: usize,
    pub desync_ticks: usize,
    pub schemes_seen: Vec<u8>,
    pub digest: String,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(&self, scenario: &Scenario, seeds: &[u64], ticks: usize) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed}, ticks: {ticks})",
                        scenario.key.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, ticks)
            })
            .collect()
    }

    fn run_single_scenario(&self, scenario: &Scenario, seed: u64, ticks: usize) -> ScenarioResult {
        let start_time = Instant::now();
        let summary = run_plan(&scenario.plan, seed, ticks);
        let replay = run_plan(&scenario.plan, seed, ticks);
        let duration = start_time.elapsed();

        let mut failures = Vec::new();
        if summary.digest != replay.digest {
            failures.push(format!(
                "replay diverged: {:016x} != {:016x}",
                summary.digest, replay.digest
            ));
        }
        if let Err(err) = (scenario.expectation)(&summary) {
            failures.push(format!("{err} | {}", describe(&summary)));
        }

        if self.verbose {
            if failures.is_empty() {
                println!("  ✅ passed ({duration:?}) {}", describe(&summary));
            } else {
                for failure in &failures {
                    println!("  ❌ {}", failure.clone().red());
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            seed,
            passed: failures.is_empty(),
            ticks,
            targets: summary.totals.targets,
            painted: summary.totals.painted,
            desync_ticks: summary.desync_ticks,
            schemes_seen: summary.schemes_seen.iter().copied().collect(),
            digest: format!("{:016x}", summary.digest),
            failures,
            duration,
        }
    }
}

fn describe(summary: &RunSummary) -> String {
    format!(
        "trains checked {} skipped {} | targets {} painted {} | segment calls {} vehicle calls {} | schemes {:?}",
        summary.totals.trains_checked,
        summary.totals.trains_skipped,
        summary.totals.targets,
        summary.totals.painted,
        summary.segment_calls,
        summary.vehicle_calls,
        summary.schemes_seen
    )
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
