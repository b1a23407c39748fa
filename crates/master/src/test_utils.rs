//! Scripted units for exercising the stepping loops.
//!
//! Both fakes carry one continuous state `x` that moves at a constant `rate`.
//! Reference 0 reads `x`; references from [`INPUT`] upward echo whatever
//! value was last written to them. Every primitive call is appended to a
//! shared [`Journal`] so tests can inspect the call sequence after the unit
//! has been moved into a [`Profile`].

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use shuttle_core::{
    Causality, CoSimulation, EventInfo, EventTrigger, Experiment, ModelDescription,
    ModelExchange, Profile, Status, StepOutcome, Unit, ValueReference, Variable, Version,
};

/// First reference used for echoed inputs.
pub(crate) const INPUT: ValueReference = 100;

/// Makes the `nth` call (1-based) of `primitive` return `status`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fault {
    pub(crate) primitive: &'static str,
    pub(crate) nth: usize,
    pub(crate) status: Status,
}

/// Behaviour of a scripted unit.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub(crate) version: Version,
    pub(crate) initial: f64,
    pub(crate) rate: f64,
    /// Adds one event indicator `x - threshold`; event handling resets `x`
    /// to `reset_to` whenever `x <= threshold`.
    pub(crate) threshold: Option<f64>,
    pub(crate) reset_to: f64,
    /// Scheduled time events, ascending.
    pub(crate) time_events: Vec<f64>,
    /// Extra discrete updates requested per event iteration.
    pub(crate) extra_updates: usize,
    /// Request termination once a step completes at or after this time.
    pub(crate) terminate_at: Option<f64>,
    /// Request termination from the first discrete update after entering
    /// event mode.
    pub(crate) terminate_on_event: bool,
    /// Flag a step event when a step completes at this time.
    pub(crate) step_event_at: Option<f64>,
    pub(crate) faults: Vec<Fault>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            version: Version::V2,
            initial: 1.0,
            rate: -1.0,
            threshold: None,
            reset_to: 1.0,
            time_events: Vec::new(),
            extra_updates: 0,
            terminate_at: None,
            terminate_on_event: false,
            step_event_at: None,
            faults: Vec::new(),
        }
    }
}

/// Everything a scripted unit saw.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub(crate) calls: Vec<&'static str>,
    pub(crate) experiment: Option<Experiment>,
    pub(crate) triggers: Vec<EventTrigger>,
    /// Time and values of every batched input write.
    pub(crate) inputs: Vec<(f64, Vec<f64>)>,
    /// Start time and size of every co-simulation step.
    pub(crate) steps: Vec<(f64, f64)>,
}

impl Journal {
    pub(crate) fn count(&self, primitive: &str) -> usize {
        self.calls.iter().filter(|&&call| call == primitive).count()
    }
}

pub(crate) type SharedJournal = Rc<RefCell<Journal>>;

/// A model-exchange unit driven by a [`Script`].
pub(crate) fn model(script: Script) -> (Profile, SharedJournal) {
    let journal = SharedJournal::default();
    let unit = Scripted::new(script, Rc::clone(&journal));
    (Profile::ModelExchange(Box::new(unit)), journal)
}

/// A co-simulation unit driven by a [`Script`].
pub(crate) fn slave(script: Script) -> (Profile, SharedJournal) {
    let journal = SharedJournal::default();
    let unit = Scripted::new(script, Rc::clone(&journal));
    (Profile::CoSimulation(Box::new(unit)), journal)
}

/// Declares `x` as an output, and `u` as an input echoed back as `echo`.
pub(crate) fn description() -> ModelDescription {
    ModelDescription {
        variables: vec![
            Variable {
                name: "x".into(),
                reference: 0,
                causality: Causality::Output,
            },
            Variable {
                name: "u".into(),
                reference: INPUT,
                causality: Causality::Input,
            },
            Variable {
                name: "echo".into(),
                reference: INPUT,
                causality: Causality::Output,
            },
        ],
        ..ModelDescription::default()
    }
}

struct Scripted {
    script: Script,
    journal: SharedJournal,
    time: f64,
    x: f64,
    inputs: HashMap<ValueReference, f64>,
    pending_updates: usize,
    in_event: bool,
}

impl Scripted {
    fn new(script: Script, journal: SharedJournal) -> Self {
        Self {
            x: script.initial,
            script,
            journal,
            time: 0.0,
            inputs: HashMap::new(),
            pending_updates: 0,
            in_event: false,
        }
    }

    fn call(&mut self, primitive: &'static str) -> Status {
        let mut journal = self.journal.borrow_mut();
        journal.calls.push(primitive);
        let nth = journal.count(primitive);
        self.script
            .faults
            .iter()
            .find(|fault| fault.primitive == primitive && fault.nth == nth)
            .map_or(Status::Success, |fault| fault.status)
    }

    fn reset_if_crossed(&mut self) -> bool {
        match self.script.threshold {
            Some(threshold) if self.x <= threshold => {
                self.x = self.script.reset_to;
                true
            }
            _ => false,
        }
    }

    fn completes_at(target: Option<f64>, time: f64) -> bool {
        target.is_some_and(|target| (time - target).abs() < 1e-9)
    }
}

impl Unit for Scripted {
    fn version(&self) -> Version {
        self.script.version
    }

    fn instantiate(&mut self) -> Status {
        self.call("instantiate")
    }

    fn enter_initialization_mode(&mut self, experiment: &Experiment) -> Status {
        self.journal.borrow_mut().experiment = Some(*experiment);
        self.time = experiment.start_time;
        self.call("enter_initialization_mode")
    }

    fn exit_initialization_mode(&mut self) -> Status {
        self.call("exit_initialization_mode")
    }

    fn set_real(&mut self, references: &[ValueReference], values: &[f64]) -> Status {
        for (&reference, &value) in references.iter().zip(values) {
            self.inputs.insert(reference, value);
        }
        self.journal
            .borrow_mut()
            .inputs
            .push((self.time, values.to_vec()));
        self.call("set_real")
    }

    fn get_real(&mut self, references: &[ValueReference], values: &mut [f64]) -> Status {
        for (&reference, value) in references.iter().zip(values.iter_mut()) {
            *value = if reference < INPUT {
                self.x
            } else {
                self.inputs.get(&reference).copied().unwrap_or_default()
            };
        }
        self.call("get_real")
    }

    fn terminate(&mut self) -> Status {
        self.call("terminate")
    }

    fn free_instance(&mut self) {
        let _ = self.call("free_instance");
    }
}

impl ModelExchange for Scripted {
    fn continuous_state_count(&self) -> usize {
        1
    }

    fn event_indicator_count(&self) -> usize {
        usize::from(self.script.threshold.is_some())
    }

    fn set_time(&mut self, time: f64) -> Status {
        self.time = time;
        self.call("set_time")
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Status {
        states[0] = self.x;
        self.call("get_continuous_states")
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Status {
        self.x = states[0];
        self.call("set_continuous_states")
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> Status {
        derivatives[0] = self.script.rate;
        self.call("get_derivatives")
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Status {
        if let Some(threshold) = self.script.threshold {
            indicators[0] = self.x - threshold;
        }
        self.call("get_event_indicators")
    }

    fn enter_event_mode(&mut self, trigger: &EventTrigger) -> Status {
        self.journal.borrow_mut().triggers.push(trigger.clone());
        self.pending_updates = self.script.extra_updates;
        self.in_event = true;
        self.call("enter_event_mode")
    }

    fn update_discrete_states(&mut self, info: &mut EventInfo) -> Status {
        info.states_changed = self.reset_if_crossed();
        info.discrete_states_needed = self.pending_updates > 0;
        self.pending_updates = self.pending_updates.saturating_sub(1);
        info.terminate_requested = self.in_event && self.script.terminate_on_event;
        info.next_event_time = self
            .script
            .time_events
            .iter()
            .copied()
            .find(|&event_time| event_time > self.time);
        self.call("update_discrete_states")
    }

    fn enter_continuous_time_mode(&mut self) -> Status {
        self.in_event = false;
        self.call("enter_continuous_time_mode")
    }

    fn completed_integrator_step(&mut self, outcome: &mut StepOutcome) -> Status {
        outcome.event = Self::completes_at(self.script.step_event_at, self.time);
        outcome.terminate = self
            .script
            .terminate_at
            .is_some_and(|target| self.time >= target - 1e-9);
        self.call("completed_integrator_step")
    }
}

impl CoSimulation for Scripted {
    fn do_step(&mut self, time: f64, step_size: f64, outcome: &mut StepOutcome) -> Status {
        self.journal.borrow_mut().steps.push((time, step_size));
        let status = self.call("do_step");
        if status == Status::Fatal {
            return status;
        }

        self.time = time + step_size;
        self.x += self.script.rate * step_size;
        outcome.event = self.reset_if_crossed();
        outcome.terminate = self
            .script
            .terminate_at
            .is_some_and(|target| self.time >= target - 1e-9);
        status
    }
}
