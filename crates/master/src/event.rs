use shuttle_core::{EventInfo, EventTrigger};

/// Event emitted by the stepping loop.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The unit is initialized and about to record its first row.
    Initialized {
        /// Start time of the run.
        time: f64,
    },

    /// An event iteration settled and continuous-time mode resumed.
    ///
    /// Model-exchange runs only; co-simulation units handle events inside
    /// their step.
    Discrete {
        /// Time at which the event was handled.
        time: f64,
        /// Why event handling was entered.
        trigger: &'a EventTrigger,
        /// Accumulated result of the discrete-state updates.
        info: &'a EventInfo,
    },

    /// A row was written to the recorder.
    ///
    /// Step 0 is the initial row; steps 1..N follow each completed step.
    Recorded {
        step: usize,
        time: f64,
        values: &'a [f64],
    },
}

/// What an observer can ask of the stepping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// End the run after the current event; the unit is still terminated
    /// and freed.
    StopEarly,
}
