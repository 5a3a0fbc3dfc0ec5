//! Error types for word2vec_prep.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the preprocessing stages.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Opening, reading or writing one of the pipeline files failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Missing or mistyped configuration values.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file is not valid json.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ranked-word file breaks the one-distinct-token-per-line format.
    #[error("malformed word file {}, line {line}: {reason}", .path.display())]
    WordFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A pair file line is not two integer ids.
    #[error("malformed pair at line {line}: {reason}")]
    PairFile { line: usize, reason: String },

    /// Writing to the pair sink failed.
    #[error("could not write pairs: {0}")]
    PairOutput(#[source] io::Error),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, PrepError>;
