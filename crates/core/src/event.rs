/// Result of one discrete-state update, reported by the unit.
///
/// Produced by [`ModelExchange::update_discrete_states`] and consumed once per
/// event iteration by the stepping loop.
///
/// [`ModelExchange::update_discrete_states`]: crate::ModelExchange::update_discrete_states
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventInfo {
    /// Another discrete update is required before leaving event handling.
    pub discrete_states_needed: bool,

    /// The unit asks for the run to end.
    pub terminate_requested: bool,

    /// Nominal values of the continuous states changed.
    pub nominals_changed: bool,

    /// Values of the continuous states changed.
    pub states_changed: bool,

    /// Time of the next scheduled time event, if one is known.
    pub next_event_time: Option<f64>,
}

/// Direction in which an event indicator crossed zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RootDirection {
    /// Crossed from positive to non-positive.
    Falling,

    /// No crossing.
    #[default]
    None,

    /// Crossed from non-positive to positive.
    Rising,
}

impl RootDirection {
    /// Integer encoding used by unit interfaces: `-1`, `0`, or `1`.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Falling => -1,
            Self::None => 0,
            Self::Rising => 1,
        }
    }
}

/// Why the stepping loop is entering event handling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTrigger {
    /// A scheduled time event is due.
    pub time_event: bool,

    /// At least one event indicator changed sign.
    pub state_event: bool,

    /// The unit flagged an event when the last step completed.
    pub step_event: bool,

    /// Per-indicator crossing directions, one entry per indicator.
    pub roots: Vec<RootDirection>,
}

impl EventTrigger {
    /// Returns `true` if any event kind is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.time_event || self.state_event || self.step_event
    }
}

/// What the unit reported when a step completed.
///
/// For model exchange this is the completed-integrator-step result; for
/// co-simulation it is the outcome of the combined step primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The unit wants event handling before the next step.
    pub event: bool,

    /// The unit asks for the run to end.
    pub terminate: bool,
}
