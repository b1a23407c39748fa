use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use shuttle_core::DefaultExperiment;
use shuttle_io::DEFAULT_PRECISION;

/// Run an FMI simulation unit and record its outputs.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "shuttle")]
#[command(about = "Run an FMI simulation unit and record its outputs as CSV")]
#[command(override_usage = "shuttle [OPTIONS] [--me] <ARCHIVE> [INPUT_CSV] <OUTPUT_CSV>")]
pub struct Args {
    /// Use model exchange even if the archive also supports co-simulation
    #[arg(long = "me")]
    pub force_model_exchange: bool,

    /// Simulation unit archive
    pub archive: PathBuf,

    /// Input table, or the output table if it is the last path given
    first: PathBuf,

    /// Output table
    second: Option<PathBuf>,

    /// Start time, overriding the archive's default experiment
    #[arg(long)]
    pub start: Option<f64>,

    /// Stop time, overriding the archive's default experiment
    #[arg(long)]
    pub stop: Option<f64>,

    /// Nominal step size, overriding the archive's default experiment
    #[arg(long)]
    pub step: Option<f64>,

    /// Relative tolerance handed to the unit (0 leaves it undefined)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Decimals written per output value
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    pub precision: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Input table path, if one was given.
    #[must_use]
    pub fn input(&self) -> Option<&Path> {
        self.second.as_ref().map(|_| self.first.as_path())
    }

    /// Output table path.
    #[must_use]
    pub fn output(&self) -> &Path {
        self.second.as_deref().unwrap_or(&self.first)
    }

    /// Experiment values set on the command line.
    #[must_use]
    pub fn overrides(&self) -> DefaultExperiment {
        DefaultExperiment {
            start_time: self.start,
            stop_time: self.stop,
            step_size: self.step,
            tolerance: self.tolerance,
        }
    }
}
