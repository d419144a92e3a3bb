use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};

use crate::engine::job::RootJob;
use crate::engine::state::JobState;
use crate::engine::EngineError;

/// Persistent record of root jobs and engine sessions
pub struct JobStore {
    pub path: PathBuf,
    conn: Connection,
}

/// A root job read back from the store
pub struct StoredJob {
    pub id: i64,
    pub state: JobState,
    pub job: RootJob,
}

impl JobStore {
    /// Open the job store at `path`, creating it if needed
    pub fn open(path: &Path) -> Result<JobStore, EngineError> {
        if !path.exists() { info!("Creating new job store {}", path.display()) }
        let conn = Connection::open(path)?;
        // the interrupt handler writes from another connection
        conn.busy_timeout(Duration::from_secs(5))?;

        static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));
        conn.execute_batch(SCHEMA)?;

        Ok(JobStore { path: path.to_path_buf(), conn })
    }

    /// Open an existing job store, for restarts
    pub fn open_existing(path: &Path) -> Result<JobStore, EngineError> {
        match path.exists() {
            true => JobStore::open(path),
            false => Err(EngineError::MissingJobStore { path: path.to_path_buf() }),
        }
    }

    pub fn open_session(&self) -> Result<i64, EngineError> {
        self.conn.execute("INSERT INTO session (opened) VALUES (?1)", params![now()])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn close_session(&self, id: i64) -> Result<(), EngineError> {
        self.conn.execute("UPDATE session SET closed = ?1 WHERE id = ?2", params![now(), id])?;
        Ok(())
    }

    /// Persist a root job before it runs and return its id
    pub fn stage(&self, job: &RootJob) -> Result<i64, EngineError> {
        let label = job.label();
        let json = encode(job)?;
        let timestamp = now();

        self.conn.execute(
            "INSERT INTO job (function, label, root_job, state, created, updated) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![job.name(), label, json, JobState::Staged.as_str(), timestamp],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Staged root job {id} ({label})");
        Ok(id)
    }

    /// Move a job to `state`. Entering `Running` counts as one attempt.
    pub fn update(&self, id: i64, state: JobState) -> Result<(), EngineError> {
        info!("Updating root job {id} with state {}", state.as_str());
        let attempt = i64::from(state == JobState::Running);
        self.conn.execute(
            "UPDATE job SET state = ?1, attempts = attempts + ?2, updated = ?3 WHERE id = ?4",
            params![state.as_str(), attempt, now(), id],
        )?;
        Ok(())
    }

    /// Id of a completed job bound to the same entry point, config and samples as `job`
    pub fn find_completed(&self, job: &RootJob) -> Result<Option<i64>, EngineError> {
        let json = encode(job)?;
        let id = self.conn
            .query_row(
                "SELECT id FROM job WHERE root_job = ?1 AND state = ?2 ORDER BY id LIMIT 1",
                params![json, JobState::Completed.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Record that the process was interrupted: close every open session and fail running jobs
    ///
    /// Returns the number of sessions closed and jobs failed.
    pub fn release_interrupted(&self) -> Result<(usize, usize), EngineError> {
        let timestamp = now();
        let sessions = self.conn.execute(
            "UPDATE session SET closed = ?1 WHERE closed IS NULL",
            params![timestamp],
        )?;
        let jobs = self.conn.execute(
            "UPDATE job SET state = ?1, updated = ?2 WHERE state = ?3",
            params![JobState::Failed.as_str(), timestamp, JobState::Running.as_str()],
        )?;
        Ok((sessions, jobs))
    }

    #[cfg(test)]
    pub(crate) fn state(&self, id: i64) -> Result<Option<JobState>, EngineError> {
        let state: Option<String> = self.conn
            .query_row("SELECT state FROM job WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        Ok(state.and_then(|state| parse_state(id, &state)))
    }

    #[cfg(test)]
    pub(crate) fn attempts(&self, id: i64) -> Result<i64, EngineError> {
        let attempts = self.conn.query_row("SELECT attempts FROM job WHERE id = ?1", params![id], |row| row.get(0))?;
        Ok(attempts)
    }

    /// Every job that hasn't completed, oldest first
    pub fn unfinished(&self) -> Result<Vec<StoredJob>, EngineError> {
        let mut stmt = self.conn.prepare("SELECT id, state, root_job FROM job WHERE state != ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![JobState::Completed.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut jobs: Vec<StoredJob> = Vec::new();
        for row in rows {
            let (id, state, json) = row?;
            let job: RootJob = serde_json::from_str(&json).map_err(|source| EngineError::Decode { id, source })?;
            let state = parse_state(id, &state).unwrap_or(JobState::Failed);
            jobs.push(StoredJob { id, state, job });
        }
        Ok(jobs)
    }

    pub fn count_unfinished(&self) -> Result<usize, EngineError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM job WHERE state != ?1",
            params![JobState::Completed.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    #[cfg(test)]
    pub(crate) fn count_open_sessions(&self) -> Result<usize, EngineError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM session WHERE closed IS NULL", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn parse_state(id: i64, state: &str) -> Option<JobState> {
    match state.parse::<JobState>() {
        Ok(state) => Some(state),
        Err(err) => {
            warn!("Root job {id}: {err}");
            None
        }
    }
}

fn encode(job: &RootJob) -> Result<String, EngineError> {
    serde_json::to_string(job).map_err(|source| EngineError::Encode { label: job.label(), source })
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sample::AlignmentSample;
    use tempfile::TempDir;

    fn job(label: &str) -> RootJob {
        let sample = AlignmentSample {
            source_url: "s3://bucket/a.bam".to_string(),
            label: label.to_string(),
            size_hint: "4G".to_string(),
        };
        RootJob::signal_align(&Config::default(), sample)
    }

    #[test]
    fn staged_jobs_are_unfinished_until_completed() {
        let dir = TempDir::new().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();

        let first = store.stage(&job("a")).unwrap();
        let second = store.stage(&job("b")).unwrap();
        store.update(first, JobState::Running).unwrap();
        store.update(first, JobState::Completed).unwrap();

        let unfinished = store.unfinished().unwrap();
        assert_eq!(unfinished.len(), 1);
        assert_eq!(unfinished[0].id, second);
        assert_eq!(unfinished[0].state, JobState::Staged);
        assert_eq!(unfinished[0].job, job("b"));
        assert_eq!(store.attempts(first).unwrap(), 1);
        assert_eq!(store.state(first).unwrap(), Some(JobState::Completed));
    }

    #[test]
    fn jobs_survive_reopening() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");
        let id = JobStore::open(&path).unwrap().stage(&job("a")).unwrap();

        let store = JobStore::open_existing(&path).unwrap();
        assert_eq!(store.count_unfinished().unwrap(), 1);
        assert_eq!(store.state(id).unwrap(), Some(JobState::Staged));
    }

    #[test]
    fn restart_needs_an_existing_store() {
        let dir = TempDir::new().unwrap();
        let err = JobStore::open_existing(&dir.path().join("missing.db")).err().unwrap();
        assert!(matches!(err, EngineError::MissingJobStore { .. }));
    }

    #[test]
    fn completed_jobs_are_found_by_their_arguments() {
        let dir = TempDir::new().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        let id = store.stage(&job("a")).unwrap();
        assert_eq!(store.find_completed(&job("a")).unwrap(), None);

        store.update(id, JobState::Completed).unwrap();
        assert_eq!(store.find_completed(&job("a")).unwrap(), Some(id));
        assert_eq!(store.find_completed(&job("b")).unwrap(), None);
    }

    #[test]
    fn interruption_closes_sessions_and_fails_running_jobs() {
        let dir = TempDir::new().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        store.open_session().unwrap();
        let running = store.stage(&job("a")).unwrap();
        store.update(running, JobState::Running).unwrap();
        let staged = store.stage(&job("b")).unwrap();

        assert_eq!(store.release_interrupted().unwrap(), (1, 1));
        assert_eq!(store.count_open_sessions().unwrap(), 0);
        assert_eq!(store.state(running).unwrap(), Some(JobState::Failed));
        assert_eq!(store.state(staged).unwrap(), Some(JobState::Staged));
    }

    #[test]
    fn sessions_are_tracked_until_closed() {
        let dir = TempDir::new().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        let id = store.open_session().unwrap();
        assert_eq!(store.count_open_sessions().unwrap(), 1);
        store.close_session(id).unwrap();
        assert_eq!(store.count_open_sessions().unwrap(), 0);
    }
}
