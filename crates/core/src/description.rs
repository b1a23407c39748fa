use crate::DefaultExperiment;

/// Numeric handle of a unit variable.
pub type ValueReference = u32;

/// Role a variable plays at the unit boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Causality {
    Parameter,
    CalculatedParameter,
    Input,
    Output,
    Local,
    Independent,
    Other,
}

/// A scalar variable declared by a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub reference: ValueReference,
    pub causality: Causality,
}

/// A named signal bound to a value reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub reference: ValueReference,
}

/// Static metadata of a unit, as parsed from its packaged description.
///
/// Parsing is left to the archive loader; the stepping loop only needs name
/// resolution, the ordered list of outputs, and the declared experiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDescription {
    pub variables: Vec<Variable>,
    pub default_experiment: DefaultExperiment,
}

impl ModelDescription {
    /// Looks up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// Returns every output variable in declaration order.
    #[must_use]
    pub fn outputs(&self) -> Vec<Signal> {
        self.variables
            .iter()
            .filter(|variable| variable.causality == Causality::Output)
            .map(|variable| Signal {
                name: variable.name.clone(),
                reference: variable.reference,
            })
            .collect()
    }
}
