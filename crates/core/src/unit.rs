use std::fmt;

use crate::{EventInfo, EventTrigger, Experiment, Status, StepOutcome, ValueReference};

/// API generation of a simulation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
    V3,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("1.0"),
            Self::V2 => f.write_str("2.0"),
            Self::V3 => f.write_str("3.0"),
        }
    }
}

/// Primitives shared by every execution mode.
///
/// Each primitive is a blocking call that returns a [`Status`]. Values are
/// exchanged through caller-owned slices so the stepping loop can allocate
/// its buffers once and reuse them for the whole run.
pub trait Unit {
    /// The API generation this unit was loaded as.
    fn version(&self) -> Version;

    /// Creates the unit instance. Must be called exactly once, first.
    fn instantiate(&mut self) -> Status;

    /// Hands the experiment to the unit and enters initialization.
    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status;

    /// Leaves initialization.
    fn exit_initialization_mode(&mut self) -> Status;

    /// Writes real values. `references` and `values` have equal length.
    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status;

    /// Reads real values into `values`. `references` and `values` have equal
    /// length.
    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status;

    /// Ends the simulation on the unit side.
    fn terminate(&mut self) -> Status;

    /// Releases the instance. Called exactly once, after which the unit must
    /// not be used again.
    fn free_instance(&mut self);
}

/// Primitives of a unit whose continuous state the orchestrator integrates.
pub trait ModelExchange: Unit {
    /// Number of continuous states. Queried once after initialization.
    fn continuous_state_count(&self) -> usize;

    /// Number of event indicators. Queried once after initialization.
    fn event_indicator_count(&self) -> usize;

    fn set_time(&mut self, time: f64) -> Status;

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status;

    fn set_continuous_states(&mut self, states: &[f64]) -> Status;

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status;

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status;

    /// Switches to event handling for the given trigger.
    fn enter_event_mode(&mut self, trigger: &EventTrigger) -> Status;

    /// Performs one discrete-state update and reports what changed.
    fn update_discrete_states(&mut self, info: &mut EventInfo) -> Status;

    /// Switches back to continuous-time integration.
    fn enter_continuous_time_mode(&mut self) -> Status;

    /// Notifies the unit that an integrator step was accepted.
    fn completed_integrator_step(&mut self, outcome: &mut StepOutcome) -> Status;
}

/// Primitives of a unit that integrates its own state.
pub trait CoSimulation: Unit {
    /// Advances the unit from `time` by `step_size`, handling integration and
    /// events internally.
    fn do_step(&mut self, time: f64, step_size: f64, outcome: &mut StepOutcome) -> Status;
}

/// The capability set a unit was bound to at load time.
///
/// Selection happens once and is never revisited for the lifetime of the
/// unit.
pub enum Profile {
    ModelExchange(Box<dyn ModelExchange>),
    CoSimulation(Box<dyn CoSimulation>),
}

impl Profile {
    /// The API generation of the bound unit.
    #[must_use]
    pub fn version(&self) -> Version {
        match self {
            Self::ModelExchange(unit) => unit.version(),
            Self::CoSimulation(unit) => unit.version(),
        }
    }

    /// Short name of the execution mode, for diagnostics.
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::ModelExchange(_) => "model exchange",
            Self::CoSimulation(_) => "co-simulation",
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("version", &self.version())
            .field("mode", &self.mode())
            .finish()
    }
}
