//! Error types for the resolution pipeline
//!
//! Variants are split by blast radius. `ConfigError`, `ExportError` and
//! `IoError` end the run. `LookupError`, `FetchError` and `SubstitutionError`
//! are confined to the term that produced them and end up in the run report.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NomenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Identifier '{identifier}' is not present in the dictionary")]
    LookupError { identifier: String },
    #[error("Fetch failed for '{url}': {message}")]
    FetchError { url: String, message: String },
    #[error("Definition has {markers} markers but only {replacements} replacements were supplied")]
    SubstitutionError { markers: usize, replacements: usize },
    #[error("Export failed: {0}")]
    ExportError(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl NomenError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        NomenError::FetchError {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for NomenError {
    fn from(err: std::io::Error) -> Self {
        NomenError::IoError(err.to_string())
    }
}

impl From<csv::Error> for NomenError {
    fn from(err: csv::Error) -> Self {
        NomenError::ExportError(err.to_string())
    }
}
