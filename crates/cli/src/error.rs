use std::{error::Error as StdError, path::PathBuf};

use shuttle_fmi::SelectError;
use shuttle_io::{ReadError, RecordError};
use thiserror::Error;

/// Errors that end a command-line run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to load archive `{}`", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("failed to read inputs from `{}`", path.display())]
    Inputs {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("failed to create output table `{}`", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("simulation failed")]
    Run(#[from] shuttle_master::Error),
}

impl CliError {
    pub(crate) fn load<E: StdError + Send + Sync + 'static>(path: PathBuf, err: E) -> Self {
        Self::Load {
            path,
            source: Box::new(err),
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Load { .. } | Self::Select(_) => 2,
            Self::Inputs { .. } | Self::Output { .. } => 3,
            Self::Run(_) => 1,
        }
    }

    /// The error and every source, joined into one line.
    #[must_use]
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            report.push_str(": ");
            report.push_str(&err.to_string());
            source = err.source();
        }
        report
    }
}
