use std::path::PathBuf;
use std::rc::Rc;

use log::{error, info, warn};

use crate::engine::job::RootJob;
use crate::engine::state::JobState;
use crate::engine::store::JobStore;
use crate::engine::{Completed, EngineError, EngineSession, WorkflowEngine};

/// Executes the entry point a root job is bound to
pub trait JobRunner {
    fn run(&self, job: &RootJob) -> anyhow::Result<()>;
}

/// Runs root jobs in this process, recording every job in a SQLite job store
///
/// With `restart` set, sessions attach to an existing job store and refuse to create one.
pub struct LocalEngine {
    pub job_store: PathBuf,
    pub restart: bool,
    runner: Rc<dyn JobRunner>,
}

impl LocalEngine {
    pub fn new(job_store: PathBuf, restart: bool, runner: impl JobRunner + 'static) -> LocalEngine {
        LocalEngine { job_store, restart, runner: Rc::new(runner) }
    }
}

impl WorkflowEngine for LocalEngine {
    type Session = LocalSession;

    fn open_session(&self) -> Result<LocalSession, EngineError> {
        let store = match self.restart {
            true => JobStore::open_existing(&self.job_store)?,
            false => JobStore::open(&self.job_store)?,
        };
        let id = store.open_session()?;
        info!("Opened engine session {id} on {}", store.path.display());
        Ok(LocalSession { id, store, runner: Rc::clone(&self.runner) })
    }
}

/// One engine session, released when dropped
pub struct LocalSession {
    id: i64,
    store: JobStore,
    runner: Rc<dyn JobRunner>,
}

impl LocalSession {
    fn run(&mut self, id: i64, job: &RootJob) -> Result<Completed, EngineError> {
        let label = job.label();
        self.store.update(id, JobState::Running)?;
        info!("Running root job {id}: {} on {label}", job.name());

        match self.runner.run(job) {
            Ok(()) => {
                self.store.update(id, JobState::Completed)?;
                info!("Root job {id} ({label}) completed");
                Ok(Completed { id, label })
            }
            Err(err) => {
                error!("Root job {id} ({label}) failed: {err:#}");
                self.store.update(id, JobState::Failed)?;
                Err(EngineError::JobFailed { id, label, source: err.into() })
            }
        }
    }
}

impl EngineSession for LocalSession {
    fn start(&mut self, job: RootJob) -> Result<Completed, EngineError> {
        let count = self.store.count_unfinished()?;
        if count > 0 {
            return Err(EngineError::UnfinishedJobs { path: self.store.path.clone(), count });
        }

        if let Some(id) = self.store.find_completed(&job)? {
            let label = job.label();
            info!("Root job {id} ({label}) already completed with the same arguments, skipping");
            return Ok(Completed { id, label });
        }

        let id = self.store.stage(&job)?;
        self.run(id, &job)
    }

    fn restart(&mut self) -> Result<Vec<Completed>, EngineError> {
        let unfinished = self.store.unfinished()?;
        if unfinished.is_empty() {
            info!("No unfinished root jobs in {}, nothing to resume", self.store.path.display());
        }

        let mut completed: Vec<Completed> = Vec::with_capacity(unfinished.len());
        for stored in unfinished {
            info!("Resuming root job {} (was {})", stored.id, stored.state.as_str());
            completed.push(self.run(stored.id, &stored.job)?);
        }
        Ok(completed)
    }
}

impl Drop for LocalSession {
    fn drop(&mut self) {
        match self.store.close_session(self.id) {
            Ok(()) => info!("Released engine session {}", self.id),
            Err(err) => warn!("Can't record release of engine session {}: {err}", self.id),
        }
    }
}
