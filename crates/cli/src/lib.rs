//! Command surface for Shuttle.
//!
//! ```text
//! shuttle [OPTIONS] [--me] <ARCHIVE> [INPUT_CSV] <OUTPUT_CSV>
//! ```
//!
//! Extracting an archive and binding its symbols is platform work that lives
//! behind the [`Loader`] trait. A host binary supplies a loader and calls
//! [`main_with`]:
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     shuttle_cli::main_with(MyLoader::default())
//! }
//! ```
//!
//! The experiment is layered from the built-in defaults, then the archive's
//! declared defaults, then the `--start`, `--stop`, `--step` and
//! `--tolerance` options.

mod args;
mod error;


use std::{error::Error as StdError, ffi::OsStr, path::Path, process::ExitCode};

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use shuttle_core::{Experiment, ModelDescription};
use shuttle_fmi::Fmu;
use shuttle_io::{CsvRecorder, read_inputs_from_path};
use shuttle_master::{Bindings, Solution, simulate_unobserved};

pub use args::Args;
pub use error::CliError;

/// Loads a simulation unit archive.
pub trait Loader {
    type Error: StdError + Send + Sync + 'static;

    /// Loads the archive at `path` and parses its description.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the archive cannot be opened or is not a
    /// usable simulation unit.
    fn load(&mut self, path: &Path) -> Result<(Fmu, ModelDescription), Self::Error>;
}

/// Runs one simulation as described by `args`.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure.
pub fn run<L: Loader>(args: &Args, loader: &mut L) -> Result<Solution, CliError> {
    let (fmu, description) = loader
        .load(&args.archive)
        .map_err(|err| CliError::load(args.archive.clone(), err))?;
    info!(
        "loaded FMI {} archive `{}`",
        fmu.version(),
        args.archive.display()
    );

    let experiment = Experiment::default()
        .with_defaults(&description.default_experiment)
        .with_defaults(&args.overrides());

    let instance_name = args
        .archive
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("unit");
    let profile = fmu.select(instance_name, args.force_model_exchange)?;

    let inputs = args
        .input()
        .map(|path| {
            read_inputs_from_path(path).map_err(|source| CliError::Inputs {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()?;
    let mut bindings = Bindings::new(&description, inputs.as_ref())?;

    let output = args.output();
    let mut recorder = CsvRecorder::create(output)
        .map_err(|source| CliError::Output {
            path: output.to_path_buf(),
            source,
        })?
        .with_precision(args.precision);

    let solution = simulate_unobserved(profile, &mut bindings, &experiment, &mut recorder)?;
    info!(
        "wrote {} rows to `{}`",
        recorder.rows(),
        output.display()
    );
    Ok(solution)
}

/// Parses the process arguments, runs, and maps the outcome to an exit code.
pub fn main_with<L: Loader>(mut loader: L) -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args, &mut loader) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err.report());
            ExitCode::from(err.exit_code())
        }
    }
}

/// `RUST_LOG` takes precedence over the verbosity count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
