use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures. Any of these stops the run before output is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{kind} not found at {}", path.display())]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("{kind} at {} is malformed: {source}", path.display())]
    MalformedInput {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no narrative documents configured (set `documents` or `documents_dir`)")]
    NoDocumentSource,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Why a single narrative document was left out of the batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unreadable: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("missing or non-string field `{0}`")]
    MissingField(&'static str),

    #[error("not valid UTF-8 text")]
    NotText,
}
