//! FMI 3.0 adapters.
//!
//! The experiment travels with `enterInitializationMode`, event mode is told
//! why it was entered (including per-indicator root directions), and
//! co-simulation steps report events and termination directly.

use log::{debug, warn};
use shuttle_core::{
    CoSimulation, EventTrigger, Experiment, ModelExchange, RootDirection, Status, StepOutcome,
    Unit, ValueReference, Version,
};

use crate::status::{RawStatus, handle};

/// The six outputs of `updateDiscreteStates`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscreteStatesUpdate {
    pub discrete_states_need_update: bool,
    pub terminate_simulation: bool,
    pub nominals_of_continuous_states_changed: bool,
    pub values_of_continuous_states_changed: bool,
    pub next_event_time_defined: bool,
    pub next_event_time: f64,
}

impl From<DiscreteStatesUpdate> for shuttle_core::EventInfo {
    fn from(raw: DiscreteStatesUpdate) -> Self {
        Self {
            discrete_states_needed: raw.discrete_states_need_update,
            terminate_requested: raw.terminate_simulation,
            nominals_changed: raw.nominals_of_continuous_states_changed,
            states_changed: raw.values_of_continuous_states_changed,
            next_event_time: raw.next_event_time_defined.then_some(raw.next_event_time),
        }
    }
}

/// The outputs of a co-simulation `doStep`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepResult {
    pub event_handling_needed: bool,
    pub terminate_simulation: bool,
    pub early_return: bool,
    pub last_successful_time: f64,
}

/// Primitives shared by both modes.
pub trait Functions {
    fn enter_initialization_mode(
        &mut self,
        tolerance_defined: bool,
        tolerance: f64,
        start_time: f64,
        stop_time_defined: bool,
        stop_time: f64,
    ) -> RawStatus;
    fn exit_initialization_mode(&mut self) -> RawStatus;
    fn set_float64(&mut self, references: &[ValueReference], values: &[f64]) -> RawStatus;
    fn get_float64(&mut self, references: &[ValueReference], values: &mut [f64]) -> RawStatus;
    fn terminate(&mut self) -> RawStatus;
    fn free_instance(&mut self);
}

/// Model-exchange primitives.
pub trait ModelExchangeFunctions: Functions {
    fn instantiate_model_exchange(&mut self, instance_name: &str, visible: bool, logging_on: bool)
    -> bool;
    fn number_of_continuous_states(&self) -> usize;
    fn number_of_event_indicators(&self) -> usize;
    fn set_time(&mut self, time: f64) -> RawStatus;
    fn get_continuous_states(&mut self, states: &mut [f64]) -> RawStatus;
    fn set_continuous_states(&mut self, states: &[f64]) -> RawStatus;
    fn get_continuous_state_derivatives(&mut self, derivatives: &mut [f64]) -> RawStatus;
    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> RawStatus;
    fn enter_event_mode(
        &mut self,
        step_event: bool,
        state_event: bool,
        roots_found: &[i32],
        time_event: bool,
    ) -> RawStatus;
    fn update_discrete_states(&mut self, update: &mut DiscreteStatesUpdate) -> RawStatus;
    fn enter_continuous_time_mode(&mut self) -> RawStatus;
    fn completed_integrator_step(
        &mut self,
        no_set_state_prior: bool,
        enter_event_mode: &mut bool,
        terminate_simulation: &mut bool,
    ) -> RawStatus;
}

/// Co-simulation primitives.
pub trait CoSimulationFunctions: Functions {
    fn instantiate_co_simulation(
        &mut self,
        instance_name: &str,
        visible: bool,
        logging_on: bool,
        event_mode_used: bool,
        early_return_allowed: bool,
    ) -> bool;
    fn do_step(
        &mut self,
        current_time: f64,
        step_size: f64,
        no_set_state_prior: bool,
        result: &mut StepResult,
    ) -> RawStatus;
}

/// A loaded generation 3 archive and the modes it provides.
#[derive(Default)]
pub struct Archive {
    pub model_exchange: Option<Box<dyn ModelExchangeFunctions>>,
    pub co_simulation: Option<Box<dyn CoSimulationFunctions>>,
}

fn enter_initialization<F: Functions + ?Sized>(raw: &mut F, experiment: &Experiment) -> Status {
    raw.enter_initialization_mode(
        experiment.tolerance_defined(),
        experiment.tolerance,
        experiment.start_time,
        true,
        experiment.stop_time,
    )
    .into()
}

/// Binds model-exchange primitives to [`ModelExchange`].
pub struct ModelExchangeAdapter {
    raw: Box<dyn ModelExchangeFunctions>,
    instance_name: String,
    roots: Vec<i32>,
}

impl ModelExchangeAdapter {
    pub fn new(raw: Box<dyn ModelExchangeFunctions>, instance_name: impl Into<String>) -> Self {
        Self {
            raw,
            instance_name: instance_name.into(),
            roots: Vec::new(),
        }
    }
}

impl Unit for ModelExchangeAdapter {
    fn version(&self) -> Version {
        Version::V3
    }

    fn instantiate(&mut self) -> Status {
        handle(
            self.raw
                .instantiate_model_exchange(&self.instance_name, false, false),
        )
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        enter_initialization(self.raw.as_mut(), experiment)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.raw.exit_initialization_mode().into()
    }

    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status {
        self.raw.set_float64(references, values).into()
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        self.raw.get_float64(references, values).into()
    }

    fn terminate(&mut self) -> Status {
        self.raw.terminate().into()
    }

    fn free_instance(&mut self) {
        self.raw.free_instance();
    }
}

impl ModelExchange for ModelExchangeAdapter {
    fn continuous_state_count(&self) -> usize {
        self.raw.number_of_continuous_states()
    }

    fn event_indicator_count(&self) -> usize {
        self.raw.number_of_event_indicators()
    }

    fn set_time(&mut self, time: f64) -> Status {
        self.raw.set_time(time).into()
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        self.raw.get_continuous_states(states).into()
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        self.raw.set_continuous_states(states).into()
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        self.raw.get_continuous_state_derivatives(derivatives).into()
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        self.raw.get_event_indicators(indicators).into()
    }

    fn enter_event_mode(&mut self, trigger: &EventTrigger) -> Status {
        self.roots.clear();
        self.roots
            .extend(trigger.roots.iter().copied().map(RootDirection::as_i32));
        self.raw
            .enter_event_mode(
                trigger.step_event,
                trigger.state_event,
                &self.roots,
                trigger.time_event,
            )
            .into()
    }

    fn update_discrete_states(&mut self, info: &mut shuttle_core::EventInfo) -> Status {
        let mut update = DiscreteStatesUpdate::default();
        let status = self.raw.update_discrete_states(&mut update);
        *info = update.into();
        status.into()
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        self.raw.enter_continuous_time_mode().into()
    }

    fn completed_integrator_step(&mut self, outcome: &mut StepOutcome) -> Status {
        let mut event = false;
        let mut terminate = false;
        let status = self
            .raw
            .completed_integrator_step(true, &mut event, &mut terminate);
        *outcome = StepOutcome { event, terminate };
        status.into()
    }
}

/// Binds co-simulation primitives to [`CoSimulation`].
///
/// The unit is instantiated without event mode and without early return.
pub struct CoSimulationAdapter {
    raw: Box<dyn CoSimulationFunctions>,
    instance_name: String,
}

impl CoSimulationAdapter {
    pub fn new(raw: Box<dyn CoSimulationFunctions>, instance_name: impl Into<String>) -> Self {
        Self {
            raw,
            instance_name: instance_name.into(),
        }
    }
}

impl Unit for CoSimulationAdapter {
    fn version(&self) -> Version {
        Version::V3
    }

    fn instantiate(&mut self) -> Status {
        handle(
            self.raw
                .instantiate_co_simulation(&self.instance_name, false, false, false, false),
        )
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        enter_initialization(self.raw.as_mut(), experiment)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.raw.exit_initialization_mode().into()
    }

    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status {
        self.raw.set_float64(references, values).into()
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        self.raw.get_float64(references, values).into()
    }

    fn terminate(&mut self) -> Status {
        self.raw.terminate().into()
    }

    fn free_instance(&mut self) {
        self.raw.free_instance();
    }
}

impl CoSimulation for CoSimulationAdapter {
    fn do_step(&mut self, time: f64, step_size: f64, outcome: &mut StepOutcome) -> Status {
        let mut result = StepResult::default();
        let status = self.raw.do_step(time, step_size, true, &mut result);

        if result.early_return {
            warn!(
                "unit returned early at t = {} from a step ending at t = {}",
                result.last_successful_time,
                time + step_size
            );
        }
        if result.event_handling_needed {
            debug!("unit encountered an event during the step from t = {time}");
        }
        *outcome = StepOutcome {
            event: result.event_handling_needed,
            terminate: result.terminate_simulation,
        };
        status.into()
    }
}
