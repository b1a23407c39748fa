use std::{fs::File, io::Write, path::Path};

use log::debug;
use shuttle_core::Recorder;
use thiserror::Error;

/// Decimals written per value unless configured otherwise.
pub const DEFAULT_PRECISION: usize = 6;

/// Errors that can occur while recording outputs.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to write output table")]
    Csv(#[from] csv::Error),

    #[error("failed to flush output table")]
    Io(#[from] std::io::Error),

    #[error("row at t = {time} has {actual} values, expected {expected}")]
    WidthMismatch {
        time: f64,
        expected: usize,
        actual: usize,
    },

    #[error("output table is already closed")]
    Closed,
}

/// Writes output rows as comma-delimited text.
///
/// The header is `time` followed by the signal names. Every value is written
/// with a fixed number of decimals, so the output does not depend on how
/// floats happen to round-trip.
pub struct CsvRecorder<W: Write> {
    writer: csv::Writer<W>,
    precision: usize,
    width: usize,
    rows: usize,
    closed: bool,
}

impl CsvRecorder<File> {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Csv`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        debug!("recording outputs to {}", path.display());
        Ok(Self::new(csv::Writer::from_path(path)?))
    }
}

impl<W: Write> CsvRecorder<W> {
    /// Wraps any writer.
    pub fn from_writer(writer: W) -> Self {
        Self::new(csv::Writer::from_writer(writer))
    }

    fn new(writer: csv::Writer<W>) -> Self {
        Self {
            writer,
            precision: DEFAULT_PRECISION,
            width: 0,
            rows: 0,
            closed: false,
        }
    }

    /// Sets the number of decimals written per value.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Number of rows written so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W, RecordError> {
        self.writer
            .into_inner()
            .map_err(|err| RecordError::Io(err.into_error()))
    }

    fn format(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }
}

impl<W: Write> Recorder for CsvRecorder<W> {
    type Error = RecordError;

    fn open(&mut self, signals: &[String]) -> Result<(), Self::Error> {
        if self.closed {
            return Err(RecordError::Closed);
        }
        self.width = signals.len();
        self.writer
            .write_record(std::iter::once("time").chain(signals.iter().map(String::as_str)))?;
        Ok(())
    }

    fn write_row(&mut self, time: f64, values: &[f64]) -> Result<(), Self::Error> {
        if self.closed {
            return Err(RecordError::Closed);
        }
        if values.len() != self.width {
            return Err(RecordError::WidthMismatch {
                time,
                expected: self.width,
                actual: values.len(),
            });
        }

        let record: Vec<String> = std::iter::once(time)
            .chain(values.iter().copied())
            .map(|value| self.format(value))
            .collect();
        self.writer.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        if self.closed {
            return Err(RecordError::Closed);
        }
        self.closed = true;
        self.writer.flush()?;
        debug!("output table closed after {} rows", self.rows);
        Ok(())
    }
}
