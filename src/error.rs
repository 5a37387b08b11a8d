// src/error.rs
// =============================================================================
// Infrastructure errors.
//
// Document defects are never errors: they are ValidationIssues collected in
// the report. The types here cover the cases where the engine itself cannot
// do its job (binary input, a cache file that cannot be written, an HTTP
// client that cannot be built).
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::report::DiagnosticReport;

/// The input could not be treated as a text document at all.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("input looks binary (NUL byte at offset {offset})")]
    Binary { offset: usize },
}

/// Failures of the persistent result cache backing store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Infrastructure failure signal, kept separate from document issues.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The run finished but its results could not be persisted. The report
    /// is carried along so callers can still show it.
    #[error("result cache is unwritable: {source}")]
    CacheUnwritable {
        #[source]
        source: CacheError,
        report: Box<DiagnosticReport>,
    },
}

impl EngineError {
    /// The finished report, when the failure happened after the run.
    pub fn report(&self) -> Option<&DiagnosticReport> {
        match self {
            EngineError::CacheUnwritable { report, .. } => Some(report),
            EngineError::HttpClient(_) => None,
        }
    }
}
