//! FMI 2.0 adapters.
//!
//! One archive may provide both modes through a shared instantiation
//! primitive. The experiment is handed over with `setupExperiment` right
//! before entering initialization.

use log::warn;
use shuttle_core::{
    CoSimulation, EventTrigger, Experiment, ModelExchange, Status, StepOutcome, Unit,
    ValueReference, Version,
};

use crate::status::{RawStatus, chain, handle};

/// Instance kind requested at instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    ModelExchange,
    CoSimulation,
}

/// Event info as reported by `newDiscreteStates`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventInfo {
    pub new_discrete_states_needed: bool,
    pub terminate_simulation: bool,
    pub nominals_of_continuous_states_changed: bool,
    pub values_of_continuous_states_changed: bool,
    pub next_event_time_defined: bool,
    pub next_event_time: f64,
}

impl From<EventInfo> for shuttle_core::EventInfo {
    fn from(raw: EventInfo) -> Self {
        Self {
            discrete_states_needed: raw.new_discrete_states_needed,
            terminate_requested: raw.terminate_simulation,
            nominals_changed: raw.nominals_of_continuous_states_changed,
            states_changed: raw.values_of_continuous_states_changed,
            next_event_time: raw.next_event_time_defined.then_some(raw.next_event_time),
        }
    }
}

/// Primitives shared by both modes.
pub trait Functions {
    fn instantiate(&mut self, instance_name: &str, kind: Kind, visible: bool, logging_on: bool)
    -> bool;
    fn setup_experiment(
        &mut self,
        tolerance_defined: bool,
        tolerance: f64,
        start_time: f64,
        stop_time_defined: bool,
        stop_time: f64,
    ) -> RawStatus;
    fn enter_initialization_mode(&mut self) -> RawStatus;
    fn exit_initialization_mode(&mut self) -> RawStatus;
    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> RawStatus;
    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> RawStatus;
    fn terminate(&mut self) -> RawStatus;
    fn free_instance(&mut self);
}

/// Model-exchange primitives.
pub trait ModelExchangeFunctions: Functions {
    fn number_of_continuous_states(&self) -> usize;
    fn number_of_event_indicators(&self) -> usize;
    fn set_time(&mut self, time: f64) -> RawStatus;
    fn get_continuous_states(&mut self, states: &mut [f64]) -> RawStatus;
    fn set_continuous_states(&mut self, states: &[f64]) -> RawStatus;
    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> RawStatus;
    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> RawStatus;
    fn enter_event_mode(&mut self) -> RawStatus;
    fn new_discrete_states(&mut self, info: &mut EventInfo) -> RawStatus;
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
    fn do_step(&mut self, current_time: f64, step_size: f64, no_set_state_prior: bool)
    -> RawStatus;

    /// Reads the `fmi2Terminated` boolean status.
    fn terminated(&mut self, terminated: &mut bool) -> RawStatus;
}

/// A loaded generation 2 archive and the modes it provides.
#[derive(Default)]
pub struct Archive {
    pub model_exchange: Option<Box<dyn ModelExchangeFunctions>>,
    pub co_simulation: Option<Box<dyn CoSimulationFunctions>>,
}

fn enter_initialization<F: Functions + ?Sized>(raw: &mut F, experiment: &Experiment) -> Status {
    chain(
        raw.setup_experiment(
            experiment.tolerance_defined(),
            experiment.tolerance,
            experiment.start_time,
            true,
            experiment.stop_time,
        )
        .into(),
        || raw.enter_initialization_mode().into(),
    )
}

/// Binds model-exchange primitives to [`ModelExchange`].
pub struct ModelExchangeAdapter {
    raw: Box<dyn ModelExchangeFunctions>,
    instance_name: String,
}

impl ModelExchangeAdapter {
    pub fn new(raw: Box<dyn ModelExchangeFunctions>, instance_name: impl Into<String>) -> Self {
        Self {
            raw,
            instance_name: instance_name.into(),
        }
    }
}

impl Unit for ModelExchangeAdapter {
    fn version(&self) -> Version {
        Version::V2
    }

    fn instantiate(&mut self) -> Status {
        handle(
            self.raw
                .instantiate(&self.instance_name, Kind::ModelExchange, false, false),
        )
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        enter_initialization(self.raw.as_mut(), experiment)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.raw.exit_initialization_mode().into()
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
        self.raw.get_derivatives(derivatives).into()
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        self.raw.get_event_indicators(indicators).into()
    }

    fn enter_event_mode(&mut self, _trigger: &EventTrigger) -> Status {
        self.raw.enter_event_mode().into()
    }

    fn update_discrete_states(&mut self, info: &mut shuttle_core::EventInfo) -> Status {
        let mut raw = EventInfo::default();
        let status = self.raw.new_discrete_states(&mut raw);
        *info = raw.into();
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
/// A step that returns `Discard` is checked against the terminated status:
/// a unit that discarded because it finished is reported as a termination
/// request rather than a fault.
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
        Version::V2
    }

    fn instantiate(&mut self) -> Status {
        handle(
            self.raw
                .instantiate(&self.instance_name, Kind::CoSimulation, false, false),
        )
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        enter_initialization(self.raw.as_mut(), experiment)
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.raw.exit_initialization_mode().into()
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
        self.raw.free_instance();
    }
}

impl CoSimulation for CoSimulationAdapter {
    fn do_step(&mut self, time: f64, step_size: f64, outcome: &mut StepOutcome) -> Status {
        *outcome = StepOutcome::default();
        let status = self.raw.do_step(time, step_size, true);
        if status != RawStatus::Discard {
            return status.into();
        }

        let mut terminated = false;
        if self.raw.terminated(&mut terminated) == RawStatus::Ok && terminated {
            outcome.terminate = true;
            return Status::Success;
        }
        warn!("step from t = {time} was discarded");
        Status::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Fake {
        log: Log,
        setup: RawStatus,
        discrete_updates: usize,
        step: RawStatus,
        terminated: bool,
    }

    impl Functions for Fake {
        fn instantiate(&mut self, name: &str, kind: Kind, _: bool, _: bool) -> bool {
            self.log.borrow_mut().push(format!("instantiate {name} {kind:?}"));
            true
        }
        fn setup_experiment(
            &mut self,
            tolerance_defined: bool,
            tolerance: f64,
            start: f64,
            stop_defined: bool,
            stop: f64,
        ) -> RawStatus {
            self.log.borrow_mut().push(format!(
                "setup {tolerance_defined} {tolerance} {start} {stop_defined} {stop}"
            ));
            self.setup
        }
        fn enter_initialization_mode(&mut self) -> RawStatus {
            self.log.borrow_mut().push("enter init".into());
            RawStatus::Ok
        }
        fn exit_initialization_mode(&mut self) -> RawStatus {
            RawStatus::Ok
        }
        fn set_real(&mut self, _: &[ValueReference], _: &[f64]) -> RawStatus {
            RawStatus::Ok
        }
        fn get_real(&mut self, _: &[ValueReference], values: &mut [f64]) -> RawStatus {
            values.fill(7.0);
            RawStatus::Ok
        }
        fn terminate(&mut self) -> RawStatus {
            RawStatus::Ok
        }
        fn free_instance(&mut self) {}
    }

    impl ModelExchangeFunctions for Fake {
        fn number_of_continuous_states(&self) -> usize {
            1
        }
        fn number_of_event_indicators(&self) -> usize {
            0
        }
        fn set_time(&mut self, _: f64) -> RawStatus {
            RawStatus::Ok
        }
        fn get_continuous_states(&mut self, _: &mut [f64]) -> RawStatus {
            RawStatus::Ok
        }
        fn set_continuous_states(&mut self, _: &[f64]) -> RawStatus {
            RawStatus::Ok
        }
        fn get_derivatives(&mut self, _: &mut [f64]) -> RawStatus {
            RawStatus::Ok
        }
        fn get_event_indicators(&mut self, _: &mut [f64]) -> RawStatus {
            RawStatus::Ok
        }
        fn enter_event_mode(&mut self) -> RawStatus {
            self.log.borrow_mut().push("enter event".into());
            RawStatus::Ok
        }
        fn new_discrete_states(&mut self, info: &mut EventInfo) -> RawStatus {
            self.discrete_updates += 1;
            *info = EventInfo {
                new_discrete_states_needed: self.discrete_updates < 2,
                values_of_continuous_states_changed: true,
                next_event_time_defined: true,
                next_event_time: 3.0,
                ..EventInfo::default()
            };
            RawStatus::Ok
        }
        fn enter_continuous_time_mode(&mut self) -> RawStatus {
            RawStatus::Ok
        }
        fn completed_integrator_step(
            &mut self,
            no_set_state_prior: bool,
            enter_event_mode: &mut bool,
            terminate: &mut bool,
        ) -> RawStatus {
            self.log
                .borrow_mut()
                .push(format!("completed {no_set_state_prior}"));
            *enter_event_mode = false;
            *terminate = true;
            RawStatus::Ok
        }
    }

    impl CoSimulationFunctions for Fake {
        fn do_step(&mut self, time: f64, step: f64, no_set_state_prior: bool) -> RawStatus {
            self.log
                .borrow_mut()
                .push(format!("do_step {time} {step} {no_set_state_prior}"));
            self.step
        }
        fn terminated(&mut self, terminated: &mut bool) -> RawStatus {
            *terminated = self.terminated;
            RawStatus::Ok
        }
    }

    #[test]
    fn experiment_is_set_up_before_initialization() {
        let log = Log::default();
        let mut unit = ModelExchangeAdapter::new(
            Box::new(Fake {
                log: Rc::clone(&log),
                ..Fake::default()
            }),
            "bouncer",
        );

        assert_eq!(unit.instantiate(), Status::Success);
        assert_eq!(
            unit.enter_initialization_mode(&Experiment::default()),
            Status::Success
        );
        assert_eq!(
            *log.borrow(),
            vec![
                "instantiate bouncer ModelExchange",
                "setup false 0 0 true 1",
                "enter init"
            ]
        );
    }

    #[test]
    fn rejected_setup_skips_initialization() {
        let log = Log::default();
        let mut unit = CoSimulationAdapter::new(
            Box::new(Fake {
                log: Rc::clone(&log),
                setup: RawStatus::Error,
                ..Fake::default()
            }),
            "s",
        );

        assert_eq!(
            unit.enter_initialization_mode(&Experiment::default()),
            Status::Fatal
        );
        assert!(!log.borrow().iter().any(|entry| entry == "enter init"));
    }

    #[test]
    fn discrete_updates_and_step_outcome_are_translated() {
        let log = Log::default();
        let mut unit = ModelExchangeAdapter::new(
            Box::new(Fake {
                log: Rc::clone(&log),
                ..Fake::default()
            }),
            "m",
        );

        let mut info = shuttle_core::EventInfo::default();
        assert_eq!(unit.update_discrete_states(&mut info), Status::Success);
        assert!(info.discrete_states_needed);
        assert!(info.states_changed);
        assert_eq!(info.next_event_time, Some(3.0));
        assert_eq!(unit.update_discrete_states(&mut info), Status::Success);
        assert!(!info.discrete_states_needed);

        let mut outcome = StepOutcome::default();
        assert_eq!(unit.completed_integrator_step(&mut outcome), Status::Success);
        assert_eq!(
            outcome,
            StepOutcome {
                event: false,
                terminate: true
            }
        );
        assert_eq!(log.borrow().last().map(String::as_str), Some("completed true"));
    }

    #[test]
    fn discarded_step_of_a_terminated_unit_requests_termination() {
        let mut unit = CoSimulationAdapter::new(
            Box::new(Fake {
                step: RawStatus::Discard,
                terminated: true,
                ..Fake::default()
            }),
            "s",
        );

        let mut outcome = StepOutcome::default();
        assert_eq!(unit.do_step(0.0, 0.1, &mut outcome), Status::Success);
        assert!(outcome.terminate);
    }

    #[test]
    fn discarded_step_of_a_running_unit_is_fatal() {
        let mut unit = CoSimulationAdapter::new(
            Box::new(Fake {
                step: RawStatus::Discard,
                ..Fake::default()
            }),
            "s",
        );

        let mut outcome = StepOutcome::default();
        assert_eq!(unit.do_step(0.0, 0.1, &mut outcome), Status::Fatal);
        assert!(!outcome.terminate);
    }

    #[test]
    fn outputs_are_read_through() {
        let mut unit = CoSimulationAdapter::new(Box::new(Fake::default()), "s");

        let mut values = [0.0; 2];
        assert_eq!(unit.get_real(&[1, 2], &mut values), Status::Success);
        assert_eq!(values, [7.0, 7.0]);
    }
}
