//! Stepping loop for units whose continuous state the master integrates.
//!
//! # Algorithm
//!
//! 1. Run an initial event iteration, enter continuous-time mode, read the
//!    states and indicators, and record the row at the start time.
//! 2. Until the stop time is reached:
//!    - Push interpolated inputs for the current time.
//!    - Evaluate the event indicators and decide whether an event boundary
//!      exists (time, state or step event).
//!    - If so, enter event mode, iterate discrete-state updates until they
//!      settle, return to continuous-time mode, and re-read states and
//!      indicators.
//!    - Plan the step (nominal, clamped to the next time event and the stop
//!      time), read derivatives, and take one forward Euler step.
//!    - Hand the new time and states to the unit and notify it that the step
//!      completed.
//!    - Record outputs at the new time.
//!
//! A termination request from the unit ends the run without recording
//! another row.

use log::{debug, info};
use shuttle_core::{EventInfo, Experiment, ModelExchange, Observer, Recorder, StepOutcome};

use crate::{
    Action, Bindings, Error, Event, Solution, Status,
    error::check,
    euler,
    events::{self, EventIndicators},
    record_row,
};

pub(crate) fn run<U, R, Obs>(
    unit: &mut U,
    bindings: &mut Bindings<'_>,
    experiment: &Experiment,
    recorder: &mut R,
    observer: &mut Obs,
) -> Result<Solution, Error>
where
    U: ModelExchange + ?Sized,
    R: Recorder,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let Experiment {
        start_time,
        stop_time,
        step_size,
        ..
    } = *experiment;
    let mut time = start_time;

    let mut states = vec![0.0; unit.continuous_state_count()];
    let mut derivatives = vec![0.0; states.len()];
    let mut indicators = EventIndicators::new(unit.event_indicator_count());
    debug!(
        "unit has {} continuous states and {} event indicators",
        states.len(),
        indicators.len()
    );

    let initial = settle(unit, time)?;
    let mut next_event_time = upcoming(initial.next_event_time, time);
    check(
        unit.enter_continuous_time_mode(),
        "enter continuous-time mode",
        time,
    )?;
    check(unit.set_time(time), "set time", time)?;
    check(
        unit.get_continuous_states(&mut states),
        "get continuous states",
        time,
    )?;
    check(
        indicators.reset(|buf| unit.get_event_indicators(buf)),
        "get event indicators",
        time,
    )?;

    let mut solution = Solution {
        status: Status::Complete,
        steps: 0,
        events: 0,
        final_time: time,
    };

    if let Some(Action::StopEarly) = observer.observe(&Event::Initialized { time }) {
        solution.status = Status::StoppedByObserver;
        return Ok(solution);
    }

    bindings.push_inputs(unit, time)?;
    if let Some(Action::StopEarly) = record_row(unit, bindings, recorder, observer, 0, time)? {
        solution.status = Status::StoppedByObserver;
        return Ok(solution);
    }

    let mut step_event = false;
    while !euler::reached(time, stop_time, step_size) {
        bindings.push_inputs(unit, time)?;
        check(
            indicators.refresh(|buf| unit.get_event_indicators(buf)),
            "get event indicators",
            time,
        )?;

        if let Some(trigger) = events::detect(time, next_event_time, &indicators, step_event) {
            debug!("entering event mode at t = {time}: {trigger:?}");
            check(unit.enter_event_mode(&trigger), "enter event mode", time)?;
            let info = settle(unit, time)?;
            next_event_time = upcoming(info.next_event_time, time);

            check(
                unit.enter_continuous_time_mode(),
                "enter continuous-time mode",
                time,
            )?;
            check(
                unit.get_continuous_states(&mut states),
                "get continuous states",
                time,
            )?;
            check(
                indicators.reset(|buf| unit.get_event_indicators(buf)),
                "get event indicators",
                time,
            )?;
            step_event = false;
            solution.events += 1;

            let event = Event::Discrete {
                time,
                trigger: &trigger,
                info: &info,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                solution.status = Status::StoppedByObserver;
                return Ok(solution);
            }
        }

        let next = euler::checked_next_time(time, step_size, next_event_time, stop_time)?;
        check(unit.get_derivatives(&mut derivatives), "get derivatives", time)?;
        euler::advance(&mut states, &derivatives, next - time);
        time = next;

        check(unit.set_time(time), "set time", time)?;
        check(
            unit.set_continuous_states(&states),
            "set continuous states",
            time,
        )?;

        let mut outcome = StepOutcome::default();
        check(
            unit.completed_integrator_step(&mut outcome),
            "completed integrator step",
            time,
        )?;
        if outcome.terminate {
            info!("unit requested termination at t = {time}");
            return Err(Error::PrematureTermination { time });
        }
        step_event = outcome.event;

        solution.steps += 1;
        solution.final_time = time;
        let step = solution.steps;
        if let Some(Action::StopEarly) = record_row(unit, bindings, recorder, observer, step, time)? {
            solution.status = Status::StoppedByObserver;
            return Ok(solution);
        }
    }

    Ok(solution)
}

/// Iterates discrete-state updates until the unit needs no more.
///
/// Returns the accumulated event info; the next event time is the one
/// reported by the last update.
fn settle<U: ModelExchange + ?Sized>(unit: &mut U, time: f64) -> Result<EventInfo, Error> {
    let mut settled = EventInfo::default();
    let mut updates = 0usize;

    loop {
        let mut info = EventInfo::default();
        check(
            unit.update_discrete_states(&mut info),
            "update discrete states",
            time,
        )?;
        updates += 1;

        settled.states_changed |= info.states_changed;
        settled.nominals_changed |= info.nominals_changed;
        settled.next_event_time = info.next_event_time;

        if info.terminate_requested {
            info!("unit requested termination during event iteration at t = {time}");
            return Err(Error::PrematureTermination { time });
        }
        if !info.discrete_states_needed {
            break;
        }
    }

    debug!("event iteration at t = {time} settled after {updates} update(s)");
    if settled.nominals_changed {
        debug!("nominal values of continuous states changed at t = {time}");
    }
    Ok(settled)
}

/// Drops a reported event time that is not ahead of `time`.
fn upcoming(next_event_time: Option<f64>, time: f64) -> Option<f64> {
    match next_event_time {
        Some(event_time) if event_time > time => {
            debug!("next time event at t = {event_time}");
            Some(event_time)
        }
        Some(event_time) => {
            debug!("ignoring stale time event at t = {event_time} (now {time})");
            None
        }
        None => None,
    }
}
