//! sweeprun CLI: run hyperparameter sweeps of the reference optimizers.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use sweeprun_core::ConfigOverrides;
use sweeprun_core::algorithms::DecayKind;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// sweeprun: checkpointed hyperparameter sweeps for iterative optimizers
#[derive(Parser, Debug)]
#[command(name = "sweeprun", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory the result tables are written to
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Experiment name used in artifact names
    #[arg(short, long, global = true)]
    experiment: Option<String>,

    /// Seed for every run
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Checkpoint iterations, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    iterations: Option<Vec<usize>>,

    /// Attempt budget per run
    #[arg(long, global = true)]
    max_attempts: Option<usize>,

    /// Skip fitness curves
    #[arg(long, global = true)]
    no_curves: bool,

    /// Problem to optimize
    #[arg(long, global = true, value_enum, default_value_t = ProblemKind::Onemax)]
    problem: ProblemKind,

    /// Bit-string length
    #[arg(long, global = true, default_value_t = 32)]
    length: usize,

    /// Four Peaks threshold as a fraction of the length
    #[arg(long, global = true, default_value_t = 0.1)]
    t_pct: f64,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProblemKind {
    Onemax,
    Fourpeaks,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Random-restart hill climbing over restart counts
    Rhc {
        /// Restart counts to sweep, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = [0usize, 2, 4])]
        restarts: Vec<usize>,
    },
    /// Simulated annealing over initial temperatures and decay kinds
    Sa {
        /// Initial temperatures to sweep, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = [1.0, 10.0, 50.0])]
        temperatures: Vec<f64>,

        /// Decay kinds to sweep: geometric, arithmetic, exponential
        #[arg(long, value_delimiter = ',', default_values = ["geometric"])]
        decays: Vec<DecayKind>,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            experiment_name: self.experiment.clone(),
            seed: self.seed,
            iteration_list: self.iterations.clone(),
            max_attempts: self.max_attempts,
            generate_curves: self.no_curves.then_some(false),
            output_directory: self.output_dir.clone(),
            runner_name: None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "sweeprun", "sweeprun")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "sweeprun.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = sweeprun_core::load_config(cli.config.as_deref(), Some(&cli.overrides()))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let problem = commands::build_problem(cli.problem, cli.length, cli.t_pct)?;
    commands::handle_command(cli.command, config, problem.as_ref())
}
