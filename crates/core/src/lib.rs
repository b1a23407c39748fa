//! Core traits and types for the Shuttle simulation master.
//!
//! This crate defines the shared abstractions that the stepping loop, the
//! generation adapters, and the I/O collaborators build on:
//!
//! - [`Unit`], [`ModelExchange`], [`CoSimulation`]: the capability interface
//!   of an instantiated simulation unit, bound once per run as a [`Profile`]
//! - [`Status`]: the tri-state result every unit primitive returns
//! - [`EventInfo`], [`EventTrigger`], [`StepOutcome`]: discrete event data
//!   exchanged with a unit
//! - [`Experiment`]: the simulation clock and its module-declared defaults
//! - [`ModelDescription`]: the static variable metadata of a unit
//! - [`InputTable`]: externally supplied input signals
//! - [`Recorder`]: an append-only sink for output rows
//! - [`Observer`]: receives run events and optionally returns control actions

mod description;
mod event;
mod experiment;
mod observer;
mod record;
mod series;
mod status;
mod unit;

pub use description::{Causality, ModelDescription, Signal, ValueReference, Variable};
pub use event::{EventInfo, EventTrigger, RootDirection, StepOutcome};
pub use experiment::{DefaultExperiment, Experiment, ExperimentError};
pub use observer::Observer;
pub use record::{OutputRow, Recorder, Table};
pub use series::{InputTable, Series, SeriesError};
pub use status::Status;
pub use unit::{CoSimulation, ModelExchange, Profile, Unit, Version};
