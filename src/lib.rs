//! Manifest-driven submission of signalAlign pipelines to a workflow engine
//!
//! A run reads a YAML config and a tab-delimited manifest, turns every manifest line into a typed
//! sample, and submits root jobs to the engine either one per sample or as one batch. A restart
//! resumes the engine's persisted jobs instead.

use std::path::PathBuf;

/// Typed samples, one per manifest line
pub mod sample;
/// Parse and validate manifests
pub mod manifest;
/// Load and canonicalise configuration documents
pub mod config;
/// Workflow engine boundary and the local SQLite-backed engine
pub mod engine;
/// External alignment and ledger entry points
pub mod entrypoints;
/// Decide submission granularity and drive the engine
pub mod driver;
/// Pipeline kinds and `run` orchestration
pub mod pipeline;
/// First-run config and manifest templates
pub mod templates;
/// Release the job store on SIGINT, SIGTERM and SIGHUP
#[cfg(unix)]
pub mod shutdown;
/// Errors reported to the user with exit status 1
pub mod error;

/// Directory generated files are written to
pub struct WorkingDirectory {
    pub path: PathBuf,
}
