use std::convert::Infallible;

/// One recorded output row: a time and one value per monitored signal.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub time: f64,
    pub values: Vec<f64>,
}

/// An append-only sink for output rows.
///
/// The stepping loop calls [`open`](Recorder::open) once with the output
/// signal names, [`write_row`](Recorder::write_row) once per recorded step,
/// and [`close`](Recorder::close) exactly once on the way out, whether the run
/// succeeded or not. Rows must be visible in write order after `close`.
pub trait Recorder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Starts the log with the given signal names. The time column is implied.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the header cannot be written.
    fn open(&mut self, signals: &[String]) -> Result<(), Self::Error>;

    /// Appends one row. `values` has one entry per signal passed to `open`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the row cannot be written.
    fn write_row(&mut self, time: f64, values: &[f64]) -> Result<(), Self::Error>;

    /// Flushes and closes the log.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if buffered rows cannot be flushed.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// An in-memory recorder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub signals: Vec<String>,
    pub rows: Vec<OutputRow>,
    pub closed: bool,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times of all recorded rows, in order.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.time).collect()
    }

    /// Values of one column across all rows, or `None` for an unknown signal.
    #[must_use]
    pub fn column(&self, signal: &str) -> Option<Vec<f64>> {
        let index = self.signals.iter().position(|name| name == signal)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }
}

impl Recorder for Table {
    type Error = Infallible;

    fn open(&mut self, signals: &[String]) -> Result<(), Self::Error> {
        self.signals = signals.to_vec();
        self.rows.clear();
        self.closed = false;
        Ok(())
    }

    fn write_row(&mut self, time: f64, values: &[f64]) -> Result<(), Self::Error> {
        self.rows.push(OutputRow {
            time,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.closed = true;
        Ok(())
    }
}
