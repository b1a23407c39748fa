use log::warn;
use shuttle_core::{Causality, InputTable, ModelDescription, Unit, ValueReference};

use crate::{
    Error,
    error::check,
    interpolate::{Cursor, InterpolationError},
};

/// Input and output signals of a run, resolved against a unit's description.
///
/// Resolution happens before the unit is touched, so an input signal without
/// a counterpart in the unit is reported as [`Error::UnresolvedSignal`]
/// without any state having been mutated. Value buffers are sized here once
/// and reused for every step.
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    table: Option<&'a InputTable>,
    cursors: Vec<Cursor>,
    input_references: Vec<ValueReference>,
    input_values: Vec<f64>,
    output_names: Vec<String>,
    output_references: Vec<ValueReference>,
    output_values: Vec<f64>,
}

impl<'a> Bindings<'a> {
    /// Resolves every input signal in `inputs` and every output of the unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedSignal`] naming the first input signal the
    /// description does not declare.
    pub fn new(description: &ModelDescription, inputs: Option<&'a InputTable>) -> Result<Self, Error> {
        let mut input_references = Vec::new();
        for series in inputs.map(InputTable::signals).unwrap_or_default() {
            let variable =
                description
                    .variable(&series.name)
                    .ok_or_else(|| Error::UnresolvedSignal {
                        name: series.name.clone(),
                    })?;
            if variable.causality != Causality::Input {
                warn!(
                    "input signal `{}` drives a variable with {:?} causality",
                    series.name, variable.causality
                );
            }
            input_references.push(variable.reference);
        }

        let (output_names, output_references): (Vec<_>, Vec<_>) = description
            .outputs()
            .into_iter()
            .map(|signal| (signal.name, signal.reference))
            .unzip();

        Ok(Self {
            table: inputs,
            cursors: vec![Cursor::new(); input_references.len()],
            input_values: vec![0.0; input_references.len()],
            input_references,
            output_values: vec![0.0; output_references.len()],
            output_names,
            output_references,
        })
    }

    /// Names of the driven input signals, in table order.
    #[must_use]
    pub fn input_names(&self) -> Vec<&str> {
        self.table
            .map(|table| table.signals().iter().map(|s| s.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Names of the recorded output signals, in declaration order.
    #[must_use]
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Interpolates every input at `time` and writes them to the unit.
    pub(crate) fn push_inputs<U: Unit + ?Sized>(
        &mut self,
        unit: &mut U,
        time: f64,
    ) -> Result<(), Error> {
        let Some(table) = self.table else {
            return Ok(());
        };
        if self.input_references.is_empty() {
            return Ok(());
        }

        for ((series, cursor), value) in table
            .signals()
            .iter()
            .zip(&mut self.cursors)
            .zip(&mut self.input_values)
        {
            *value = cursor
                .interpolate(table.time(), &series.values, time)
                .map_err(|source: InterpolationError| Error::MalformedSeries {
                    signal: series.name.clone(),
                    time,
                    source,
                })?;
        }

        check(
            unit.set_real(&self.input_references, &self.input_values),
            "set inputs",
            time,
        )
    }

    /// Reads every output from the unit.
    pub(crate) fn read_outputs<U: Unit + ?Sized>(
        &mut self,
        unit: &mut U,
        time: f64,
    ) -> Result<&[f64], Error> {
        if !self.output_references.is_empty() {
            check(
                unit.get_real(&self.output_references, &mut self.output_values),
                "get outputs",
                time,
            )?;
        }
        Ok(&self.output_values)
    }
}
