//! CSV collaborators for Shuttle runs.
//!
//! - [`read_inputs`] turns a comma-delimited table into a validated
//!   [`shuttle_core::InputTable`]. The first column is the time axis and the
//!   header row names every column.
//! - [`CsvRecorder`] implements [`shuttle_core::Recorder`], writing one row per
//!   recorded step with a fixed number of decimals.

mod reader;
mod recorder;

pub use reader::{ReadError, read_inputs, read_inputs_from_path};
pub use recorder::{CsvRecorder, DEFAULT_PRECISION, RecordError};
