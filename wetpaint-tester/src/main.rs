mod logic;
mod scenario;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{LogicTester, ScenarioResult};
use scenario::{Scenario, catalog_scenarios, get_scenario, list_scenarios};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "wetpaint-tester", version = "0.1.0")]
#[command(about = "Seeded scenario runner for the Wet Paint track painting engine")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-prefixed hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Simulation ticks per run
    #[arg(long, default_value_t = 400)]
    ticks: usize,

    /// Report format
    #[arg(long, default_value = "console", value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Print per-run progress
    #[arg(short, long)]
    verbose: bool,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = resolve_scenarios(&args.scenarios)?;
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    if seeds.is_empty() {
        bail!("no seeds given");
    }

    let tester = LogicTester::new(args.verbose);
    let results: Vec<ScenarioResult> = scenarios
        .iter()
        .flat_map(|scenario| tester.run_scenario(scenario, &seeds, args.ticks))
        .collect();

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|result| !result.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    eprintln!("{}", "🎨 Wet Paint Scenario Tester".bright_cyan().bold());
    eprintln!("{}", "============================".cyan());
}

fn resolve_scenarios(selection: &str) -> Result<Vec<Scenario>> {
    let keys = split_csv(selection);
    if keys.iter().any(|key| key == "all") {
        return Ok(catalog_scenarios());
    }
    keys.iter()
        .map(|key| get_scenario(key).with_context(|| format!("unknown scenario '{key}'")))
        .collect()
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Wet Paint Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, results, duration)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            ticks: 50,
            report: "console".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn sample_result() -> ScenarioResult {
        ScenarioResult {
            scenario_name: "default-train".to_string(),
            seed: 1337,
            passed: true,
            ticks: 50,
            targets: 6,
            painted: 6,
            desync_ticks: 0,
            schemes_seen: vec![1],
            digest: "00000000deadbeef".to_string(),
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn resolve_scenarios_expands_all_and_rejects_unknown() {
        assert_eq!(
            resolve_scenarios("all").unwrap().len(),
            catalog_scenarios().len()
        );
        let picked = resolve_scenarios("demolish, disable").unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].key, "demolish");
        assert!(resolve_scenarios("nonexistent").is_err());
    }

    #[test]
    fn list_scenarios_writes_to_file() {
        let temp = std::env::temp_dir().join("wetpaint-list-scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("tail-pattern"));
    }

    #[test]
    fn write_reports_emits_markdown_placeholder_without_results() {
        let temp = std::env::temp_dir().join("wetpaint-report-empty.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let temp = std::env::temp_dir().join("wetpaint-report-console.txt");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result()], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("default-train"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
