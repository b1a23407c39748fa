use std::error::Error as StdError;

use log::{error, warn};
use shuttle_core::ExperimentError;
use thiserror::Error;

use crate::interpolate::InterpolationError;

/// Errors that end a run.
///
/// None of these are retried: after a fault the unit's state is not trusted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid experiment: {0}")]
    InvalidExperiment(#[from] ExperimentError),

    #[error("input signal `{name}` has no counterpart in the unit")]
    UnresolvedSignal { name: String },

    #[error("input signal `{signal}` cannot be interpolated at t = {time}")]
    MalformedSeries {
        signal: String,
        time: f64,
        #[source]
        source: InterpolationError,
    },

    #[error("unit failed to instantiate")]
    Instantiation,

    #[error("unit rejected {stage}")]
    Initialization { stage: &'static str },

    #[error("{primitive} failed at t = {time}")]
    ModuleFault { primitive: &'static str, time: f64 },

    #[error("step of {step_size} does not advance the clock at t = {time}")]
    StalledClock { time: f64, step_size: f64 },

    #[error("unit requested termination at t = {time}")]
    PrematureTermination { time: f64 },

    #[error("recorder failed")]
    Recorder(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn recorder<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Recorder(Box::new(err))
    }
}

/// Turns a primitive's status into a result, logging anything unusual.
pub(crate) fn check(
    status: shuttle_core::Status,
    primitive: &'static str,
    time: f64,
) -> Result<(), Error> {
    match status {
        shuttle_core::Status::Success => Ok(()),
        shuttle_core::Status::Warning => {
            warn!("{primitive} returned a warning at t = {time}");
            Ok(())
        }
        shuttle_core::Status::Fatal => {
            error!("{primitive} failed at t = {time}");
            Err(Error::ModuleFault { primitive, time })
        }
    }
}
