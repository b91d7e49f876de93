use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotifError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No TATA-box found in sequence")]
    NoMotifFound,

    /// Zero-length region; callers treat it as absent.
    #[error("Region is empty")]
    EmptyRegion,

    #[error("Cannot scan an empty sequence")]
    EmptyInput,

    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FASTA parse error: {0}")]
    Fasta(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MotifError>;

impl From<needletail::errors::ParseError> for MotifError {
    fn from(err: needletail::errors::ParseError) -> Self {
        MotifError::Fasta(err.to_string())
    }
}

impl MotifError {
    pub fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        MotifError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
