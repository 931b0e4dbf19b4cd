//! Error types.
//!
//! Setup failures ([`SetupError`]) abort an ingestion run. Per-item failures
//! ([`ItemError`]) are logged, counted and skipped.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the search engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("index already exists: {0}")]
    IndexExists(String),

    #[error("local engine error: {0}")]
    Local(String),
}

impl From<tantivy::TantivyError> for EngineError {
    fn from(err: tantivy::TantivyError) -> Self {
        EngineError::Local(err.to_string())
    }
}

/// Fatal errors: the run must stop before any document is ingested.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to clean up index {index}: {source}")]
    IndexCleanup {
        index: String,
        #[source]
        source: EngineError,
    },

    #[error("failed to create index {index}: {source}")]
    IndexCreation {
        index: String,
        #[source]
        source: EngineError,
    },

    #[error("engine did not acknowledge {operation} of index {index}")]
    NotAcknowledged {
        operation: &'static str,
        index: String,
    },

    #[error("cannot list data directory {path:?}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single record could not become a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required <{0}> element")]
    MissingField(&'static str),

    #[error("required <{0}> element is empty")]
    EmptyField(&'static str),
}

/// Recoverable errors, scoped to one file, record or document.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("failed to repair {path:?}: {source}")]
    Repair {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed markup in {path:?}: {source}")]
    Markup {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("record {position} in {path:?} rejected: {source}")]
    Record {
        path: PathBuf,
        position: usize,
        #[source]
        source: RecordError,
    },

    #[error("failed to index document {doc_id}: {source}")]
    Submit {
        doc_id: String,
        #[source]
        source: EngineError,
    },

    #[error("document {doc_id} not created, engine answered {result:?}")]
    NotCreated { doc_id: String, result: String },
}
