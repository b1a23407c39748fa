//! Event-driven master algorithm for hybrid simulation units.
//!
//! [`simulate`] drives a unit bound to a [`Profile`] through its whole
//! lifecycle:
//!
//! ```text
//! Instantiated → Initialized → Stepping → Terminated
//! ```
//!
//! - **Model exchange**: the master owns the continuous state, detects time,
//!   state and step events, runs event iterations, and integrates with
//!   forward Euler (see [`euler`] and [`events`]).
//! - **Co-simulation**: the unit owns its state; the master calls its step
//!   primitive once per communication step.
//!
//! In both modes inputs are interpolated from an [`InputTable`] (see
//! [`interpolate`]) and one row is written to a [`Recorder`] at the start
//! time and after every completed step.
//!
//! The unit is freed exactly once on the way out, and the recorder closed
//! exactly once, whether the run succeeded or failed. Any primitive that
//! reports [`shuttle_core::Status::Fatal`] ends the run with
//! [`Error::ModuleFault`]; nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use shuttle_core::{Experiment, Table};
//! use shuttle_master::{Bindings, simulate_unobserved};
//!
//! let mut bindings = Bindings::new(&description, Some(&inputs))?;
//! let mut table = Table::new();
//! let solution = simulate_unobserved(profile, &mut bindings, &Experiment::default(), &mut table)?;
//!
//! for row in &table.rows {
//!     println!("t={}: {:?}", row.time, row.values);
//! }
//! ```
//!
//! [`InputTable`]: shuttle_core::InputTable

mod bindings;
mod co_simulation;
mod error;
mod event;
mod model_exchange;
mod solution;

pub mod euler;
pub mod events;
pub mod interpolate;

#[cfg(test)]
mod test_utils;

pub use bindings::Bindings;
pub use error::Error;
pub use event::{Action, Event};
pub use solution::{Solution, Status};

use log::{error, info, warn};
use shuttle_core::{Experiment, Observer, Profile, Recorder, Unit};

use error::check;

/// Runs a unit from its experiment's start time to its stop time.
///
/// The observer receives an [`Event`] after initialization, after every
/// event iteration, and after every recorded row, and may return
/// [`Action::StopEarly`] to end the run cleanly.
///
/// # Errors
///
/// Returns an error if the experiment is invalid, the unit fails to
/// instantiate or initialize, a primitive fails, an input cannot be
/// interpolated, the unit requests termination, or the recorder fails.
pub fn simulate<R, Obs>(
    profile: Profile,
    bindings: &mut Bindings<'_>,
    experiment: &Experiment,
    recorder: &mut R,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    R: Recorder,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    experiment.validate()?;
    info!(
        "simulating FMI {} unit ({}) from {} to {} with step {}",
        profile.version(),
        profile.mode(),
        experiment.start_time,
        experiment.stop_time,
        experiment.step_size
    );

    recorder
        .open(bindings.output_names())
        .map_err(Error::recorder)?;

    let result = match profile {
        Profile::ModelExchange(mut unit) => session(unit.as_mut(), experiment, |unit| {
            model_exchange::run(unit, bindings, experiment, recorder, &mut observer)
        }),
        Profile::CoSimulation(mut unit) => session(unit.as_mut(), experiment, |unit| {
            co_simulation::run(unit, bindings, experiment, recorder, &mut observer)
        }),
    };

    let closed = recorder.close().map_err(Error::recorder);
    match (result, closed) {
        (Ok(solution), Ok(())) => {
            info!(
                "run finished at t = {} after {} steps",
                solution.final_time, solution.steps
            );
            Ok(solution)
        }
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            error!("recorder failed to close after an aborted run: {close_err}");
            Err(err)
        }
    }
}

/// Runs a unit without observation.
///
/// This is a convenience wrapper around [`simulate`] that discards events.
///
/// # Errors
///
/// See [`simulate`].
pub fn simulate_unobserved<R: Recorder>(
    profile: Profile,
    bindings: &mut Bindings<'_>,
    experiment: &Experiment,
    recorder: &mut R,
) -> Result<Solution, Error> {
    simulate(profile, bindings, experiment, recorder, ())
}

/// Instantiates and initializes the unit, runs the loop, then terminates and
/// frees the unit.
///
/// A unit that failed to instantiate is never freed. A unit that faulted is
/// freed without being terminated.
fn session<U, F>(unit: &mut U, experiment: &Experiment, run: F) -> Result<Solution, Error>
where
    U: Unit + ?Sized,
    F: FnOnce(&mut U) -> Result<Solution, Error>,
{
    if !unit.instantiate().is_ok() {
        error!("unit failed to instantiate");
        return Err(Error::Instantiation);
    }
    info!("unit instantiated");

    let result = match initialize(unit, experiment) {
        Ok(()) => run(unit),
        Err(err) => Err(err),
    };

    let result = match result {
        Ok(solution) => check(unit.terminate(), "terminate", solution.final_time).map(|()| solution),
        Err(Error::PrematureTermination { time }) => {
            if !unit.terminate().is_ok() {
                warn!("terminate failed after the unit asked to stop at t = {time}");
            }
            Err(Error::PrematureTermination { time })
        }
        Err(err) => Err(err),
    };

    unit.free_instance();
    info!("unit released");
    result
}

fn initialize<U: Unit + ?Sized>(unit: &mut U, experiment: &Experiment) -> Result<(), Error> {
    stage(
        unit.enter_initialization_mode(experiment),
        "enter initialization mode",
    )?;
    stage(unit.exit_initialization_mode(), "exit initialization mode")?;

    info!("unit initialized");
    Ok(())
}

fn stage(status: shuttle_core::Status, stage: &'static str) -> Result<(), Error> {
    match status {
        shuttle_core::Status::Success => Ok(()),
        shuttle_core::Status::Warning => {
            warn!("{stage} returned a warning");
            Ok(())
        }
        shuttle_core::Status::Fatal => {
            error!("unit rejected {stage}");
            Err(Error::Initialization { stage })
        }
    }
}

/// Reads outputs, writes one row, and lets the observer react to it.
pub(crate) fn record_row<U, R, Obs>(
    unit: &mut U,
    bindings: &mut Bindings<'_>,
    recorder: &mut R,
    observer: &mut Obs,
    step: usize,
    time: f64,
) -> Result<Option<Action>, Error>
where
    U: Unit + ?Sized,
    R: Recorder,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let values = bindings.read_outputs(unit, time)?;
    recorder.write_row(time, values).map_err(Error::recorder)?;
    Ok(observer.observe(&Event::Recorded { step, time, values }))
}
