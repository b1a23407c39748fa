//! Stepping loop for units that integrate their own state.
//!
//! Each iteration pushes interpolated inputs, asks the unit to advance by
//! the nominal step (shortened only to land on the stop time), and records
//! outputs at the new communication point. Integration and event handling
//! happen inside the unit's step primitive.

use log::{debug, info};
use shuttle_core::{CoSimulation, Experiment, Observer, Recorder, StepOutcome};

use crate::{Action, Bindings, Error, Event, Solution, Status, error::check, euler, record_row};

pub(crate) fn run<U, R, Obs>(
    unit: &mut U,
    bindings: &mut Bindings<'_>,
    experiment: &Experiment,
    recorder: &mut R,
    observer: &mut Obs,
) -> Result<Solution, Error>
where
    U: CoSimulation + ?Sized,
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

    while !euler::reached(time, stop_time, step_size) {
        bindings.push_inputs(unit, time)?;

        let next = euler::checked_next_time(time, step_size, None, stop_time)?;
        let mut outcome = StepOutcome::default();
        check(unit.do_step(time, next - time, &mut outcome), "do step", time)?;
        if outcome.terminate {
            info!("unit requested termination at t = {next}");
            return Err(Error::PrematureTermination { time: next });
        }
        if outcome.event {
            debug!("unit handled an event during the step ending at t = {next}");
            solution.events += 1;
        }
        time = next;

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
