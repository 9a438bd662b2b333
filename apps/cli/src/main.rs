#![deny(warnings)]

//! Headless CLI for running, comparing and sweeping circular construction scenarios.

use anyhow::{Context, Result};
use circ_core::PolicyLever;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{resolve_volumes, PolicyOverrides, ScenarioFile, VolumeOverrides};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

/// Estimate material flows and CO₂ for a housing construction/demolition cycle.
#[derive(Parser, Debug)]
#[command(name = "circ", version = VERSION, long_about = None)]
struct Cli {
    /// Scenario YAML file; missing sections fall back to built-in defaults.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    volumes: VolumeArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single scenario.
    Run(PolicyArgs),
    /// Compare scenario A against scenario B from the config file.
    Compare,
    /// Sweep one policy lever across [0,1], holding the others fixed.
    Sweep {
        #[arg(long, value_enum)]
        lever: LeverArg,
        /// Number of grid points, endpoints included.
        #[arg(long, default_value_t = 11)]
        steps: usize,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args, Debug, Default)]
struct PolicyArgs {
    /// Share of demolished concrete recycled, in [0,1].
    #[arg(long)]
    concrete_recycle: Option<f64>,
    /// Share of excavated soil reused, in [0,1].
    #[arg(long)]
    soil_reuse: Option<f64>,
    /// Recycled aggregate ceiling as a share of concrete demand, in [0,1].
    #[arg(long)]
    max_rca: Option<f64>,
}

impl From<&PolicyArgs> for PolicyOverrides {
    fn from(a: &PolicyArgs) -> Self {
        PolicyOverrides {
            concrete_recycle: a.concrete_recycle,
            soil_reuse: a.soil_reuse,
            max_rca_permitted: a.max_rca,
        }
    }
}

#[derive(Args, Debug, Default)]
struct VolumeArgs {
    /// Houses built per year.
    #[arg(long, global = true)]
    houses_built: Option<u64>,
    /// Houses demolished per year.
    #[arg(long, global = true)]
    houses_demolished: Option<u64>,
}

impl From<&VolumeArgs> for VolumeOverrides {
    fn from(a: &VolumeArgs) -> Self {
        VolumeOverrides {
            houses_built: a.houses_built,
            houses_demolished: a.houses_demolished,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LeverArg {
    ConcreteRecycle,
    SoilReuse,
    MaxRca,
}

impl From<LeverArg> for PolicyLever {
    fn from(arg: LeverArg) -> Self {
        match arg {
            LeverArg::ConcreteRecycle => PolicyLever::ConcreteRecycle,
            LeverArg::SoilReuse => PolicyLever::SoilReuse,
            LeverArg::MaxRca => PolicyLever::MaxRcaPermitted,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<String> {
    let file = match &cli.config {
        Some(path) => ScenarioFile::load(path)?,
        None => ScenarioFile::default(),
    };
    let engine = file.engine()?;
    let volumes = resolve_volumes(&file, (&cli.volumes).into());

    match &cli.command {
        Command::Run(args) => {
            let policy = PolicyOverrides::from(args).apply(file.policy());
            let result = engine.try_simulate(&policy, volumes)?;
            info!(total_co2 = result.total_co2, "simulation completed");
            Ok(match cli.format {
                OutputFormat::Table => render::run_table(&policy, volumes, &result)?,
                OutputFormat::Json => render::run_json(&policy, volumes, &result)?,
            })
        }
        Command::Compare => {
            let a = file.scenario_a();
            let b = file.scenario_b();
            let cmp = circ_engine::try_compare(&engine, &a, &b, volumes)?;
            info!("comparison completed");
            Ok(match cli.format {
                OutputFormat::Table => {
                    let mut out = render::comparison_table(&cmp)?;
                    out.push('\n');
                    out.push_str(&render::comparison_chart(&cmp)?);
                    out
                }
                OutputFormat::Json => render::comparison_json(&a, &b, volumes, &cmp)?,
            })
        }
        Command::Sweep {
            lever,
            steps,
            policy,
        } => {
            let base = PolicyOverrides::from(policy).apply(file.policy());
            let points = circ_engine::sweep(&engine, &base, volumes, (*lever).into(), *steps)?;
            info!(points = points.len(), "sweep completed");
            Ok(match cli.format {
                OutputFormat::Table => render::sweep_table(&points)?,
                OutputFormat::Json => render::sweep_json(&points)?,
            })
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!(version = VERSION, config = ?cli.config, "starting CLI");

    let out = execute(&cli).context("simulation failed")?;
    print!("{out}");
    Ok(())
}
