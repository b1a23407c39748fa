//! FMI 1.0 adapters.
//!
//! Generation 1 ships model exchange and co-simulation as separate
//! archives with disjoint primitive sets, so an archive binds to exactly one
//! of [`ModelAdapter`] or [`SlaveAdapter`].
//!
//! Model exchange in this generation has no explicit event or
//! continuous-time modes: initialization itself returns the first event
//! info, and `eventUpdate` is the only discrete primitive. The adapter
//! caches the initialization result and hands it out as the first
//! discrete-state update, so the stepping loop sees the same sequence it
//! sees for later generations.

use log::debug;
use shuttle_core::{
    CoSimulation, EventTrigger, Experiment, ModelExchange, Status, StepOutcome, Unit,
    ValueReference, Version,
};

use crate::status::{RawStatus, handle};

/// MIME type passed when instantiating a slave.
pub const MIME_TYPE: &str = "application/x-fmu-sharedlibrary";

/// Instantiation timeout passed to slaves, in milliseconds.
pub const TIMEOUT: f64 = 1000.0;

/// Event info as reported by `initialize` and `eventUpdate`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventInfo {
    pub iteration_converged: bool,
    pub state_value_references_changed: bool,
    pub state_values_changed: bool,
    pub terminate_simulation: bool,
    pub upcoming_time_event: bool,
    pub next_event_time: f64,
}

impl From<EventInfo> for shuttle_core::EventInfo {
    fn from(raw: EventInfo) -> Self {
        Self {
            discrete_states_needed: !raw.iteration_converged,
            terminate_requested: raw.terminate_simulation,
            nominals_changed: false,
            states_changed: raw.state_values_changed,
            next_event_time: raw.upcoming_time_event.then_some(raw.next_event_time),
        }
    }
}

/// Primitives of a model-exchange archive.
pub trait ModelFunctions {
    fn instantiate_model(&mut self, instance_name: &str, logging_on: bool) -> bool;
    fn set_time(&mut self, time: f64) -> RawStatus;
    fn initialize(
        &mut self,
        tolerance_controlled: bool,
        relative_tolerance: f64,
        info: &mut EventInfo,
    ) -> RawStatus;
    fn number_of_continuous_states(&self) -> usize;
    fn number_of_event_indicators(&self) -> usize;
    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> RawStatus;
    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> RawStatus;
    fn get_continuous_states(&mut self, states: &mut [f64]) -> RawStatus;
    fn set_continuous_states(&mut self, states: &[f64]) -> RawStatus;
    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> RawStatus;
    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> RawStatus;
    fn event_update(&mut self, intermediate_results: bool, info: &mut EventInfo) -> RawStatus;
    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> RawStatus;
    fn terminate(&mut self) -> RawStatus;
    fn free_model_instance(&mut self);
}

/// Primitives of a co-simulation archive.
pub trait SlaveFunctions {
    fn instantiate_slave(
        &mut self,
        instance_name: &str,
        mime_type: &str,
        timeout: f64,
        visible: bool,
        interactive: bool,
        logging_on: bool,
    ) -> bool;
    fn initialize_slave(&mut self, start_time: f64, stop_time_defined: bool, stop_time: f64)
    -> RawStatus;
    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> RawStatus;
    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> RawStatus;
    fn do_step(&mut self, current_time: f64, step_size: f64, new_step: bool) -> RawStatus;
    fn terminate_slave(&mut self) -> RawStatus;
    fn free_slave_instance(&mut self);
}

/// A loaded generation 1 archive.
pub enum Archive {
    Model(Box<dyn ModelFunctions>),
    Slave(Box<dyn SlaveFunctions>),
}

/// Binds a model-exchange archive to [`ModelExchange`].
pub struct ModelAdapter {
    raw: Box<dyn ModelFunctions>,
    instance_name: String,
    experiment: Experiment,
    initial: Option<shuttle_core::EventInfo>,
}

impl ModelAdapter {
    pub fn new(raw: Box<dyn ModelFunctions>, instance_name: impl Into<String>) -> Self {
        Self {
            raw,
            instance_name: instance_name.into(),
            experiment: Experiment::default(),
            initial: None,
        }
    }
}

impl Unit for ModelAdapter {
    fn version(&self) -> Version {
        Version::V1
    }

    fn instantiate(&mut self) -> Status {
        handle(self.raw.instantiate_model(&self.instance_name, false))
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        self.experiment = *experiment;
        self.raw.set_time(experiment.start_time).into()
    }

    fn exit_initialization_mode(&mut self) -> Status {
        let mut info = EventInfo::default();
        let status = self.raw.initialize(
            self.experiment.tolerance_defined(),
            self.experiment.tolerance,
            &mut info,
        );
        self.initial = Some(info.into());
        status.into()
    }

    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status {
        self.raw.set_real(references, values).into()
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        self.raw.get_real(references, values).into()
    }

    fn terminate(&mut self) -> Status {
        self.raw.terminate().into()
    }

    fn free_instance(&mut self) {
        self.raw.free_model_instance();
    }
}

impl ModelExchange for ModelAdapter {
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
        self.raw.get_derivatives(derivatives).into()
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        self.raw.get_event_indicators(indicators).into()
    }

    fn enter_event_mode(&mut self, _trigger: &EventTrigger) -> Status {
        Status::Success
    }

    fn update_discrete_states(&mut self, info: &mut shuttle_core::EventInfo) -> Status {
        if let Some(initial) = self.initial.take() {
            debug!("using the event info returned by initialize");
            *info = initial;
            return Status::Success;
        }

        let mut raw = EventInfo::default();
        let status = self.raw.event_update(false, &mut raw);
        *info = raw.into();
        status.into()
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        Status::Success
    }

    fn completed_integrator_step(&mut self, outcome: &mut StepOutcome) -> Status {
        let mut call_event_update = false;
        let status = self.raw.completed_integrator_step(&mut call_event_update);
        *outcome = StepOutcome {
            event: call_event_update,
            terminate: false,
        };
        status.into()
    }
}

/// Binds a co-simulation archive to [`CoSimulation`].
pub struct SlaveAdapter {
    raw: Box<dyn SlaveFunctions>,
    instance_name: String,
    experiment: Experiment,
}

impl SlaveAdapter {
    pub fn new(raw: Box<dyn SlaveFunctions>, instance_name: impl Into<String>) -> Self {
        Self {
            raw,
            instance_name: instance_name.into(),
            experiment: Experiment::default(),
        }
    }
}

impl Unit for SlaveAdapter {
    fn version(&self) -> Version {
        Version::V1
    }

    fn instantiate(&mut self) -> Status {
        handle(self.raw.instantiate_slave(
            &self.instance_name,
            MIME_TYPE,
            TIMEOUT,
            false,
            false,
            false,
        ))
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        self.experiment = *experiment;
        Status::Success
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.raw
            .initialize_slave(self.experiment.start_time, true, self.experiment.stop_time)
            .into()
    }

    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status {
        self.raw.set_real(references, values).into()
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        self.raw.get_real(references, values).into()
    }

    fn terminate(&mut self) -> Status {
        self.raw.terminate_slave().into()
    }

    fn free_instance(&mut self) {
        self.raw.free_slave_instance();
    }
}

impl CoSimulation for SlaveAdapter {
    fn do_step(&mut self, time: f64, step_size: f64, outcome: &mut StepOutcome) -> Status {
        *outcome = StepOutcome::default();
        self.raw.do_step(time, step_size, true).into()
    }
}
