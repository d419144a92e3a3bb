//! Boundary to the workflow engine that runs root jobs
//!
//! The driver only needs two entry points: start a fresh root job, or restart whatever a previous
//! invocation left unfinished. Both happen inside a session, which is released when dropped so
//! teardown runs on every exit path.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Root units of work and their persisted form
pub mod job;
/// Lifecycle of a root job in the job store
pub mod state;
/// SQLite job store
pub mod store;
/// In-process engine backed by the job store
pub mod local;

pub use job::{RootJob, RootJobFunction};
pub use local::{JobRunner, LocalEngine, LocalSession};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Job store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("No job store at {}, nothing to restart", path.display())]
    MissingJobStore { path: PathBuf },

    #[error("Job store {} has {count} unfinished job(s), rerun with --restart", path.display())]
    UnfinishedJobs { path: PathBuf, count: usize },

    #[error("Can't encode root job {label} for the job store")]
    Encode { label: String, source: serde_json::Error },

    #[error("Can't decode root job {id} from the job store")]
    Decode { id: i64, source: serde_json::Error },

    #[error("Root job {id} ({label}) failed")]
    JobFailed {
        id: i64,
        label: String,
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

/// A root job that ran to completion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completed {
    pub id: i64,
    pub label: String,
}

pub trait WorkflowEngine {
    type Session: EngineSession;

    /// Acquire a session. Dropping it releases the session.
    fn open_session(&self) -> Result<Self::Session, EngineError>;
}

pub trait EngineSession {
    /// Run a new root job to completion
    fn start(&mut self, job: RootJob) -> Result<Completed, EngineError>;

    /// Resume every unfinished root job from persisted state
    fn restart(&mut self) -> Result<Vec<Completed>, EngineError>;
}
