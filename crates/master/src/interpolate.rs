//! Piecewise-linear interpolation of input series.
//!
//! For a query time `t`, the bracketing pair `(i, i + 1)` is the one with
//! `time[i] <= t < time[i + 1]`, and the result is
//!
//! ```text
//! v[i] + (v[i + 1] - v[i]) * (t - time[i]) / (time[i + 1] - time[i])
//! ```
//!
//! Queries outside the time axis are clamped: before the first sample the
//! first value is returned, at or after the last sample the last value is
//! returned. Repeated interior time points act as jumps and the interpolant
//! is right-continuous across them.

use thiserror::Error;

/// Errors that can occur while interpolating a series.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InterpolationError {
    #[error("series needs at least two samples per axis, got {time} times and {values} values")]
    Shape { time: usize, values: usize },

    #[error("query time is not finite: {0}")]
    NonFiniteQuery(f64),

    #[error("time axis decreases at sample {index}")]
    NonMonotonic { index: usize },

    #[error("zero-width interval at t = {time}")]
    DegenerateBracket { time: f64 },
}

/// Interpolates `values` over `time` at `query`.
///
/// Scans from the start of the table on every call. Use [`Cursor`] when
/// queries arrive in increasing order.
///
/// # Errors
///
/// Returns an error if the axes are too short or of different lengths, the
/// query is not finite, the scanned part of the time axis decreases, or the
/// query lands on a zero-width final interval.
pub fn interpolate(time: &[f64], values: &[f64], query: f64) -> Result<f64, InterpolationError> {
    Cursor::new().interpolate(time, values, query)
}

/// A monotonic search position into a time axis.
///
/// Query times in a run only move forward, so the bracket search can resume
/// where the previous one ended. Results are identical to [`interpolate`] for
/// any non-decreasing time axis. A query earlier than the cursor position
/// restarts the search from the beginning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    /// Creates a cursor at the start of the table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpolates like [`interpolate`], resuming from the last bracket.
    ///
    /// # Errors
    ///
    /// See [`interpolate`].
    pub fn interpolate(
        &mut self,
        time: &[f64],
        values: &[f64],
        query: f64,
    ) -> Result<f64, InterpolationError> {
        if time.len() < 2 || time.len() != values.len() {
            return Err(InterpolationError::Shape {
                time: time.len(),
                values: values.len(),
            });
        }
        if !query.is_finite() {
            return Err(InterpolationError::NonFiniteQuery(query));
        }

        let last = time.len() - 1;
        if query >= time[last] {
            self.index = last - 1;
            return lerp(time, values, last - 1, time[last]);
        }

        let query = query.max(time[0]);
        if self.index >= last || query < time[self.index] {
            self.index = 0;
        }

        while self.index < last {
            let i = self.index;
            if time[i + 1] < time[i] {
                return Err(InterpolationError::NonMonotonic { index: i + 1 });
            }
            if time[i] <= query && query < time[i + 1] {
                return lerp(time, values, i, query);
            }
            self.index += 1;
        }

        // Only reachable when the axis is out of order ahead of the query.
        self.index = 0;
        Err(InterpolationError::NonMonotonic { index: last })
    }
}

fn lerp(time: &[f64], values: &[f64], i: usize, query: f64) -> Result<f64, InterpolationError> {
    let (t1, t2) = (time[i], time[i + 1]);
    let width = t2 - t1;
    if width <= 0.0 {
        return Err(InterpolationError::DegenerateBracket { time: t1 });
    }

    let (v1, v2) = (values[i], values[i + 1]);
    Ok(v1 + (v2 - v1) * (query - t1) / width)
}
