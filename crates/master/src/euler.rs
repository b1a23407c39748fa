//! Forward Euler integration and step planning.
//!
//! The integrator steps the continuous state vector in place:
//!
//! ```text
//! state_{n+1} = state_n + h * derivative_n
//! ```
//!
//! The step `h` is the nominal step size, shortened so that the loop never
//! integrates past a known time event or the stop time. Targets closer than
//! a small fraction of the nominal step are snapped to, so that clamping
//! never leaves a sliver step behind. A time event ahead of the clock is
//! always landed on, however close it is.

use log::error;

use crate::Error;

/// Fraction of the nominal step size below which two times are treated as
/// equal when planning steps.
const SNAP_FRACTION: f64 = 1e-9;

/// Advances `states` by one explicit Euler step of size `h`.
///
/// `states` and `derivatives` have equal length.
pub fn advance(states: &mut [f64], derivatives: &[f64], h: f64) {
    debug_assert_eq!(states.len(), derivatives.len());
    for (state, derivative) in states.iter_mut().zip(derivatives) {
        *state += h * derivative;
    }
}

/// Returns the end time of the step starting at `time`.
///
/// The result is `time + step_size`, clamped to the next known event time
/// (if it lies ahead) and to `stop_time`. A clamped result equals the
/// clamping target exactly.
#[must_use]
pub fn next_time(time: f64, step_size: f64, next_event_time: Option<f64>, stop_time: f64) -> f64 {
    let snap = step_size * SNAP_FRACTION;
    let limit = next_event_time
        .filter(|&event_time| event_time > time && event_time < stop_time)
        .unwrap_or(stop_time);

    let target = time + step_size;
    if target >= limit - snap { limit } else { target }
}

/// Like [`next_time`], but fails if the step would not move the clock.
///
/// # Errors
///
/// Returns [`Error::StalledClock`] if `time + step_size` rounds back to
/// `time`.
pub fn checked_next_time(
    time: f64,
    step_size: f64,
    next_event_time: Option<f64>,
    stop_time: f64,
) -> Result<f64, Error> {
    let next = next_time(time, step_size, next_event_time, stop_time);
    if next > time {
        Ok(next)
    } else {
        error!("step of {step_size} does not advance the clock at t = {time}");
        Err(Error::StalledClock { time, step_size })
    }
}

/// Returns `true` once `time` has reached `stop_time`.
#[must_use]
pub fn reached(time: f64, stop_time: f64, step_size: f64) -> bool {
    time >= stop_time - step_size * SNAP_FRACTION
}
