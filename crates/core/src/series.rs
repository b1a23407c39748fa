use thiserror::Error;

/// A named sequence of samples sharing the table's time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    /// Creates a series from a name and its samples.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Externally supplied input signals on a shared time axis.
///
/// The table is validated on construction and immutable afterwards, so the
/// stepping loop can interpolate from it without further checks:
///
/// - the time axis has at least two samples, all finite and non-decreasing
/// - the last two time samples differ, so every query has a usable bracket
/// - every signal has exactly one finite sample per time point
#[derive(Debug, Clone, PartialEq)]
pub struct InputTable {
    time_name: String,
    time: Vec<f64>,
    signals: Vec<Series>,
}

/// Errors returned when an [`InputTable`] is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("time axis needs at least two samples, got {len}")]
    TooShort { len: usize },

    #[error("time axis sample {index} is not finite: {time}")]
    NonFiniteTime { index: usize, time: f64 },

    #[error("time axis decreases at sample {index}: {previous} -> {time}")]
    Decreasing {
        index: usize,
        previous: f64,
        time: f64,
    },

    #[error("time axis ends in a zero-width interval at t = {time}")]
    DegenerateTail { time: f64 },

    #[error("signal `{signal}` has {actual} samples, expected {expected}")]
    LengthMismatch {
        signal: String,
        expected: usize,
        actual: usize,
    },

    #[error("signal `{signal}` has a non-finite sample at t = {time}")]
    NonFiniteValue { signal: String, time: f64 },

    #[error("signal `{signal}` appears more than once")]
    DuplicateSignal { signal: String },
}

impl InputTable {
    /// Builds a validated table.
    ///
    /// # Errors
    ///
    /// Returns a [`SeriesError`] describing the first problem found.
    pub fn new(
        time_name: impl Into<String>,
        time: Vec<f64>,
        signals: Vec<Series>,
    ) -> Result<Self, SeriesError> {
        validate_time(&time)?;

        for (position, series) in signals.iter().enumerate() {
            if series.values.len() != time.len() {
                return Err(SeriesError::LengthMismatch {
                    signal: series.name.clone(),
                    expected: time.len(),
                    actual: series.values.len(),
                });
            }
            if let Some(index) = series.values.iter().position(|v| !v.is_finite()) {
                return Err(SeriesError::NonFiniteValue {
                    signal: series.name.clone(),
                    time: time[index],
                });
            }
            if signals[..position].iter().any(|s| s.name == series.name) {
                return Err(SeriesError::DuplicateSignal {
                    signal: series.name.clone(),
                });
            }
        }

        Ok(Self {
            time_name: time_name.into(),
            time,
            signals,
        })
    }

    /// Name of the time axis column.
    #[must_use]
    pub fn time_name(&self) -> &str {
        &self.time_name
    }

    /// The shared time axis.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// All signals in table order, excluding the time axis.
    #[must_use]
    pub fn signals(&self) -> &[Series] {
        &self.signals
    }

    /// Looks up a signal by name.
    #[must_use]
    pub fn signal(&self, name: &str) -> Option<&Series> {
        self.signals.iter().find(|series| series.name == name)
    }

    /// Number of time points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false`; a valid table holds at least two time points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

fn validate_time(time: &[f64]) -> Result<(), SeriesError> {
    if time.len() < 2 {
        return Err(SeriesError::TooShort { len: time.len() });
    }

    if let Some(index) = time.iter().position(|t| !t.is_finite()) {
        return Err(SeriesError::NonFiniteTime {
            index,
            time: time[index],
        });
    }

    for (index, pair) in time.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(SeriesError::Decreasing {
                index: index + 1,
                previous: pair[0],
                time: pair[1],
            });
        }
    }

    let last = time[time.len() - 1];
    if time[time.len() - 2] >= last {
        return Err(SeriesError::DegenerateTail { time: last });
    }

    Ok(())
}
