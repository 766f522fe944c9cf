use std::path::PathBuf;

use thiserror::Error;

/// Why a single line of GPS output was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SampleError {
    #[error("expected 3 comma-separated fields, found {0}")]
    FieldCount(usize),

    #[error("{field} is empty")]
    Empty { field: &'static str },

    #[error("{field} has no hemisphere marker")]
    MissingHemisphere { field: &'static str },

    #[error("{field} has unexpected hemisphere marker '{marker}'")]
    Hemisphere { field: &'static str, marker: char },

    #[error("{field} value \"{value}\" is not a number")]
    Number { field: &'static str, value: String },

    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("failed to run {program}: {source}")]
    ToolInvocation {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} produced output that is not valid UTF-8")]
    NonUtf8Output { program: String },

    #[error("malformed GPS sample on line {line_number} (\"{line}\"): {source}")]
    MalformedSample {
        line_number: usize,
        line: String,
        #[source]
        source: SampleError,
    },

    #[error("video has no {0} metadata")]
    MissingMetadata(&'static str),
}
