use thiserror::Error;

use crate::file_parsers::ParseError;

#[derive(Error, Debug)]
pub enum PowerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown profile class: {0}")]
    UnknownProfileClass(String),

    #[error("Invalid aggregate window for {year}: {reason}")]
    InvalidAggregateWindow { year: u16, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Track parsing error: {0}")]
    Parse(#[from] ParseError),
}

impl PowerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PowerError::InvalidInput(msg.into())
    }

    /// True for failures that come from the external collaborators (files, CSV, tracks)
    /// rather than from the numeric core.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            PowerError::Io(_) | PowerError::Csv(_) | PowerError::Parse(_)
        )
    }
}
