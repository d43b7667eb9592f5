use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fuzzy_autopilot::pilot::{FallbackPolicy, FuzzyPilot, ShipObservation};
use fuzzy_autopilot::sweep::{run_sweep, SweepConfig};
use fuzzy_autopilot::variable::VariableRole;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fuzzy-autopilot", about = "Fuzzy-logic ship controller tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered variables, their terms, and the rule count.
    Describe,
    /// Run one inference cycle over an observation JSON file.
    Eval {
        /// Path to a ShipObservation JSON file.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Sweep the distance x bearing grid and write summary.json / runs.csv.
    Sweep {
        #[arg(long)]
        out: PathBuf,
        /// Samples per axis.
        #[arg(long, default_value_t = 41)]
        steps: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Describe => describe(),
        Command::Eval { input, pretty } => eval(&input, pretty),
        Command::Sweep { out, steps } => sweep(out, steps),
    }
}

fn describe() -> Result<()> {
    let pilot = FuzzyPilot::new(FallbackPolicy::Neutral)?;
    for variable in pilot.engine().registry().variables() {
        let role = match variable.role() {
            VariableRole::Antecedent => "input",
            VariableRole::Consequent => "output",
        };
        let labels: Vec<&str> = variable.labels().collect();
        println!(
            "{} ({role}, [{}, {})): {}",
            variable.name(),
            variable.universe().min(),
            variable.universe().max(),
            labels.join(", ")
        );
    }
    println!("{} rules", pilot.engine().rules().len());
    Ok(())
}

fn eval(input: &PathBuf, pretty: bool) -> Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed reading {}", input.display()))?;
    let observation: ShipObservation =
        serde_json::from_str(&raw).with_context(|| format!("failed parsing {}", input.display()))?;
    let mut pilot = FuzzyPilot::new(FallbackPolicy::Neutral)?;
    let command = pilot.next_command(&observation)?;
    let json = if pretty {
        serde_json::to_string_pretty(&command)?
    } else {
        serde_json::to_string(&command)?
    };
    println!("{json}");
    Ok(())
}

fn sweep(out: PathBuf, steps: usize) -> Result<()> {
    let mut config = SweepConfig::new(out);
    config.distance_steps = steps;
    config.angle_steps = steps;
    let report = run_sweep(&config)?;
    println!(
        "{} runs, {} firing, thrust [{:.1}, {:.1}], rotation [{:.1}, {:.1}] -> {}",
        report.summary.run_count,
        report.summary.fire_count,
        report.summary.thrust_min,
        report.summary.thrust_max,
        report.summary.rotation_min,
        report.summary.rotation_max,
        config.out_dir.display()
    );
    Ok(())
}
