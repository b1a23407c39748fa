//! Event detection for model-exchange runs.
//!
//! Once per step the loop asks whether continuous-time progress must pause
//! for discrete event handling. An event boundary exists if any of these
//! holds:
//!
//! - **time event**: a next event time is known and the current time has
//!   reached it
//! - **state event**: an event indicator changed sign since the previous
//!   evaluation, where the sign is `x > 0` (zero counts as non-positive)
//! - **step event**: the unit flagged an event when the last integrator
//!   step completed

use shuttle_core::{EventTrigger, RootDirection, Status};

/// Current and previous values of a unit's event indicators.
///
/// `previous` always holds the values of the immediately preceding
/// evaluation. Both buffers are sized once and never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct EventIndicators {
    current: Vec<f64>,
    previous: Vec<f64>,
}

impl EventIndicators {
    /// Creates zeroed buffers for `count` indicators.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            current: vec![0.0; count],
            previous: vec![0.0; count],
        }
    }

    /// Number of indicators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` if the unit has no indicators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Values from the latest evaluation.
    #[must_use]
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Values from the evaluation before that.
    #[must_use]
    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// Shifts current values into `previous` and reads fresh current values.
    pub fn refresh(&mut self, read: impl FnOnce(&mut [f64]) -> Status) -> Status {
        std::mem::swap(&mut self.current, &mut self.previous);
        read(&mut self.current)
    }

    /// Reads fresh values into both buffers, forgetting the history.
    ///
    /// Used after initialization and after every event iteration so that
    /// pre-event values never take part in the next comparison.
    pub fn reset(&mut self, read: impl FnOnce(&mut [f64]) -> Status) -> Status {
        let status = read(&mut self.current);
        self.previous.copy_from_slice(&self.current);
        status
    }

    /// Crossing direction of every indicator between the two evaluations.
    #[must_use]
    pub fn crossings(&self) -> Vec<RootDirection> {
        self.previous
            .iter()
            .zip(&self.current)
            .map(|(&previous, &current)| crossing(previous, current))
            .collect()
    }
}

/// Classifies the change from `previous` to `current` by strict positivity.
#[must_use]
pub fn crossing(previous: f64, current: f64) -> RootDirection {
    match (previous > 0.0, current > 0.0) {
        (false, true) => RootDirection::Rising,
        (true, false) => RootDirection::Falling,
        _ => RootDirection::None,
    }
}

/// Returns `true` if a known time event is due at `time`.
#[must_use]
pub fn time_event_due(next_event_time: Option<f64>, time: f64) -> bool {
    next_event_time.is_some_and(|event_time| time >= event_time)
}

/// Decides whether an event boundary exists at `time`.
///
/// Returns the trigger to hand to the unit, or `None` if integration can
/// continue.
#[must_use]
pub fn detect(
    time: f64,
    next_event_time: Option<f64>,
    indicators: &EventIndicators,
    step_event: bool,
) -> Option<EventTrigger> {
    let roots = indicators.crossings();
    let trigger = EventTrigger {
        time_event: time_event_due(next_event_time, time),
        state_event: roots.iter().any(|&root| root != RootDirection::None),
        step_event,
        roots,
    };

    trigger.any().then_some(trigger)
}
