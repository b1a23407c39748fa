use std::{io::Read, path::Path};

use log::debug;
use shuttle_core::{InputTable, Series, SeriesError};
use thiserror::Error;

/// Errors that can occur while reading an input table.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read input table")]
    Csv(#[from] csv::Error),

    #[error("input table has no columns")]
    NoColumns,

    #[error("row {row}, column `{column}`: `{field}` is not a number")]
    Parse {
        row: u64,
        column: String,
        field: String,
    },

    #[error("invalid input table")]
    Table(#[from] SeriesError),
}

/// Reads an input table from the file at `path`.
///
/// # Errors
///
/// See [`read_inputs`]; opening the file can also fail.
pub fn read_inputs_from_path(path: impl AsRef<Path>) -> Result<InputTable, ReadError> {
    let path = path.as_ref();
    debug!("reading input table from {}", path.display());
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect(reader)
}

/// Reads a comma-delimited input table.
///
/// The header row names the columns. The first column is the time axis and
/// every other column is one input signal. Every field must parse as a real
/// number.
///
/// # Errors
///
/// Returns [`ReadError::Parse`] naming the row and column of the first field
/// that is not a number, [`ReadError::Table`] if the columns do not form a
/// valid table, or [`ReadError::Csv`] for malformed or ragged rows.
pub fn read_inputs<R: Read>(reader: R) -> Result<InputTable, ReadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    collect(reader)
}

fn collect<R: Read>(mut reader: csv::Reader<R>) -> Result<InputTable, ReadError> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let Some((time_name, signal_names)) = headers.split_first() else {
        return Err(ReadError::NoColumns);
    };

    let mut columns = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        let row = record.position().map_or(0, csv::Position::line);
        for ((field, column), name) in record.iter().zip(&mut columns).zip(&headers) {
            let value = field.parse::<f64>().map_err(|_| ReadError::Parse {
                row,
                column: name.clone(),
                field: field.to_string(),
            })?;
            column.push(value);
        }
    }

    let mut columns = columns.into_iter();
    let time = columns.next().unwrap_or_default();
    let signals = signal_names
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.clone(), values))
        .collect();

    let table = InputTable::new(time_name.clone(), time, signals)?;
    debug!(
        "read {} samples of {} input signal(s)",
        table.len(),
        table.signals().len()
    );
    Ok(table)
}
