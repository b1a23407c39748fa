/// Indicates how the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the stop time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// How the run ended.
    pub status: Status,

    /// Number of completed steps (rows after the initial one).
    pub steps: usize,

    /// Number of event iterations performed after initialization.
    pub events: usize,

    /// Time of the last recorded row.
    pub final_time: f64,
}
