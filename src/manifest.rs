//! Tab-delimited sample manifests
//!
//! A manifest lists one sample per line. Lines starting with `#` and whitespace-only lines are
//! skipped; every other line must match the record schema of the pipeline being run. The whole
//! manifest is validated before anything is returned, so one bad line anywhere yields no samples.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// One record schema per pipeline kind
pub mod record;
/// Read a manifest from disk into typed samples
pub mod read;

pub use read::parse_manifest;
pub use record::ManifestRecord;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Didn't find manifest file, looked {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Can't read manifest {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Malformed record on line {line}: expected {expected} tab-separated fields, found {found}")]
    MalformedRecord { line: usize, expected: usize, found: usize },

    #[error("Malformed record on line {line}: field '{field}' is empty")]
    EmptyField { line: usize, field: &'static str },

    #[error("Unrecognized archive kind '{kind}' on line {line}, expected one of: tar, gz-tar")]
    UnrecognizedArchiveKind { line: usize, kind: String },

    #[error("Invalid URL '{url}' on line {line}")]
    InvalidUrl { line: usize, url: String },
}
