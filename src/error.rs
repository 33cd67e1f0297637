//! Error types for the strategy benchmark.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while benchmarking.
///
/// Every variant is fatal to the operation that raised it. Per-example
/// failures that the run survives are modelled separately
/// (see [`crate::eval::ChainError`] and [`crate::eval::Grade::Ungraded`]).
#[derive(Error, Debug)]
pub enum BenchError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The corpus file does not exist.
    #[error("Corpus not found at '{0}'")]
    CorpusNotFound(PathBuf),

    /// The corpus file has no rows.
    #[error("No documents found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A strategy name outside the supported vocabulary.
    #[error("Unknown strategy '{0}' (expected one of: stuff, map_reduce, refine, map_rerank)")]
    UnknownStrategy(String),

    /// More examples requested than there are documents to draw from.
    #[error("Sample size {requested} exceeds corpus size {available}")]
    SampleTooLarge { requested: usize, available: usize },

    /// A strategy execution exceeded the configured timeout.
    #[error("Strategy '{strategy}' timed out after {after:?}")]
    Timeout { strategy: String, after: Duration },

    /// A record was appended out of sequence for its strategy.
    #[error("Sequence number {got} for strategy '{strategy}' is not after {last}")]
    SequenceOrder {
        strategy: String,
        last: u32,
        got: u32,
    },
}

impl BenchError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        BenchError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::LlmParse(err.to_string())
    }
}
