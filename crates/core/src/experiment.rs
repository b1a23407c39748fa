use thiserror::Error;

/// The simulation clock of a run.
///
/// Construct with [`Experiment::default`] and layer preferences on top with
/// [`Experiment::with_defaults`]. The stepping loop validates the clock before
/// touching the unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Experiment {
    pub start_time: f64,
    pub stop_time: f64,
    pub step_size: f64,
    pub tolerance: f64,
}

/// Experiment preferences declared by a unit's model description.
///
/// Each field is optional; a `None` leaves the corresponding clock value
/// untouched when layered with [`Experiment::with_defaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DefaultExperiment {
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub step_size: Option<f64>,
    pub tolerance: Option<f64>,
}

/// Errors returned by [`Experiment::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ExperimentError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("step size must be greater than zero, got {0}")]
    NonPositiveStep(f64),

    #[error("tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),

    #[error("start time {start} is after stop time {stop}")]
    StartAfterStop { start: f64, stop: f64 },

    #[error("step size {step} does not advance the clock at t = {time}")]
    StepBelowResolution { step: f64, time: f64 },
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: 1.0,
            step_size: 1e-3,
            tolerance: 0.0,
        }
    }
}

impl Experiment {
    /// Overrides clock values with the ones a unit declares.
    #[must_use]
    pub fn with_defaults(self, defaults: &DefaultExperiment) -> Self {
        Self {
            start_time: defaults.start_time.unwrap_or(self.start_time),
            stop_time: defaults.stop_time.unwrap_or(self.stop_time),
            step_size: defaults.step_size.unwrap_or(self.step_size),
            tolerance: defaults.tolerance.unwrap_or(self.tolerance),
        }
    }

    /// Returns `true` if a tolerance should be handed to the unit.
    #[must_use]
    pub fn tolerance_defined(&self) -> bool {
        self.tolerance > 0.0
    }

    /// Validates the clock.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is non-finite, the step size is not
    /// strictly positive, the tolerance is negative, the start time is after
    /// the stop time, or the step is too small to move the clock at either
    /// end of the run.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        for (field, value) in [
            ("start time", self.start_time),
            ("stop time", self.stop_time),
            ("step size", self.step_size),
            ("tolerance", self.tolerance),
        ] {
            if !value.is_finite() {
                return Err(ExperimentError::NonFinite { field, value });
            }
        }
        if self.step_size <= 0.0 {
            return Err(ExperimentError::NonPositiveStep(self.step_size));
        }
        if self.tolerance < 0.0 {
            return Err(ExperimentError::NegativeTolerance(self.tolerance));
        }
        if self.start_time > self.stop_time {
            return Err(ExperimentError::StartAfterStop {
                start: self.start_time,
                stop: self.stop_time,
            });
        }
        // Float spacing grows with magnitude, so checking both ends covers
        // every time in between.
        for time in [self.start_time, self.stop_time] {
            if time + self.step_size <= time || time - self.step_size >= time {
                return Err(ExperimentError::StepBelowResolution {
                    step: self.step_size,
                    time,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_reference_clock() {
        let experiment = Experiment::default();

        assert_relative_eq!(experiment.start_time, 0.0);
        assert_relative_eq!(experiment.stop_time, 1.0);
        assert_relative_eq!(experiment.step_size, 0.001);
        assert!(!experiment.tolerance_defined());
        assert!(experiment.validate().is_ok());
    }

    #[test]
    fn declared_defaults_override_only_present_fields() {
        let declared = DefaultExperiment {
            stop_time: Some(10.0),
            step_size: Some(0.5),
            ..DefaultExperiment::default()
        };

        let experiment = Experiment::default().with_defaults(&declared);

        assert_relative_eq!(experiment.start_time, 0.0);
        assert_relative_eq!(experiment.stop_time, 10.0);
        assert_relative_eq!(experiment.step_size, 0.5);
        assert_relative_eq!(experiment.tolerance, 0.0);
    }

    #[test]
    fn rejects_bad_clocks() {
        let zero_step = Experiment {
            step_size: 0.0,
            ..Experiment::default()
        };
        assert_eq!(
            zero_step.validate(),
            Err(ExperimentError::NonPositiveStep(0.0))
        );

        let reversed = Experiment {
            start_time: 2.0,
            stop_time: 1.0,
            ..Experiment::default()
        };
        assert!(matches!(
            reversed.validate(),
            Err(ExperimentError::StartAfterStop { .. })
        ));

        let negative_tolerance = Experiment {
            tolerance: -1e-6,
            ..Experiment::default()
        };
        assert!(matches!(
            negative_tolerance.validate(),
            Err(ExperimentError::NegativeTolerance(_))
        ));

        let infinite_stop = Experiment {
            stop_time: f64::INFINITY,
            ..Experiment::default()
        };
        assert!(matches!(
            infinite_stop.validate(),
            Err(ExperimentError::NonFinite {
                field: "stop time",
                ..
            })
        ));
    }

    #[test]
    fn rejects_steps_lost_to_float_spacing() {
        let experiment = Experiment {
            start_time: 1e10,
            stop_time: 1e10 + 1.0,
            step_size: 1e-7,
            tolerance: 0.0,
        };

        assert!(matches!(
            experiment.validate(),
            Err(ExperimentError::StepBelowResolution { time, .. }) if time == 1e10
        ));
    }

    #[test]
    fn large_times_with_a_representable_step_are_valid() {
        let experiment = Experiment {
            start_time: 1e12,
            stop_time: 1e12 + 1.0,
            step_size: 0.25,
            tolerance: 0.0,
        };
        assert!(experiment.validate().is_ok());
    }

    #[test]
    fn start_equal_to_stop_is_valid() {
        let experiment = Experiment {
            start_time: 1.0,
            stop_time: 1.0,
            ..Experiment::default()
        };
        assert!(experiment.validate().is_ok());
    }
}
