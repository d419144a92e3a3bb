//! Release engine state when the process is interrupted
//!
//! `Drop` can't run when a signal ends the process, so a listener thread closes open sessions and
//! fails running jobs in the job store before the process exits. A restart then resumes them.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use tokio::signal::unix::{signal, SignalKind};

use crate::engine::store::JobStore;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    Sigint,
    Sigterm,
    Sighup,
}

impl Interrupt {
    /// Shell convention: 128 + signal number
    pub fn exit_code(&self) -> u8 {
        match self {
            Interrupt::Sighup => 129,
            Interrupt::Sigint => 130,
            Interrupt::Sigterm => 143,
        }
    }
}

/// Listen for SIGINT, SIGTERM and SIGHUP on a background thread
///
/// On the first signal the job store is released and `then` is called with the signal. The
/// handlers are installed by the time this returns.
pub fn listen_for_signals<F>(job_store: PathBuf, then: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce(Interrupt) + Send + 'static,
{
    let (ready_tx, ready_rx) = mpsc::channel::<io::Result<()>>();

    let handle = thread::Builder::new().name("signals".to_string()).spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };

        if let Some(interrupt) = runtime.block_on(wait_for_signal(&ready_tx)) {
            warn!("Received {interrupt:?}, releasing job store {}", job_store.display());
            release(&job_store);
            then(interrupt);
        }
    })?;

    match ready_rx.recv() {
        Ok(installed) => installed.map(|_| handle),
        Err(_) => Err(io::Error::new(io::ErrorKind::Other, "signal listener exited before installing handlers")),
    }
}

async fn wait_for_signal(ready: &mpsc::Sender<io::Result<()>>) -> Option<Interrupt> {
    let handlers = (|| -> io::Result<_> {
        Ok((
            signal(SignalKind::interrupt())?,
            signal(SignalKind::terminate())?,
            signal(SignalKind::hangup())?,
        ))
    })();

    let (mut sigint, mut sigterm, mut sighup) = match handlers {
        Ok(handlers) => {
            let _ = ready.send(Ok(()));
            handlers
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return None;
        }
    };

    tokio::select! {
        _ = sigint.recv() => Some(Interrupt::Sigint),
        _ = sigterm.recv() => Some(Interrupt::Sigterm),
        _ = sighup.recv() => Some(Interrupt::Sighup),
    }
}

fn release(job_store: &Path) {
    if !job_store.exists() {
        return;
    }
    match JobStore::open(job_store).and_then(|store| store.release_interrupted()) {
        Ok((sessions, jobs)) => info!("Closed {sessions} session(s), marked {jobs} running job(s) failed"),
        Err(err) => warn!("Can't release job store {}: {err}", job_store.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{self, Command};
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::config::Config;
    use crate::engine::state::JobState;
    use crate::engine::RootJob;
    use crate::sample::AlignmentSample;

    #[test]
    fn sigint_mid_job_releases_the_job_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");

        let store = JobStore::open(&path).unwrap();
        store.open_session().unwrap();
        let sample = AlignmentSample {
            source_url: "s3://bucket/a.bam".to_string(),
            label: "a".to_string(),
            size_hint: "4G".to_string(),
        };
        let id = store.stage(&RootJob::signal_align(&Config::default(), sample)).unwrap();
        store.update(id, JobState::Running).unwrap();

        let (tx, rx) = mpsc::channel();
        let handle = listen_for_signals(path.clone(), move |interrupt| {
            let _ = tx.send(interrupt);
        })
        .unwrap();

        let status = Command::new("kill").args(["-INT", &process::id().to_string()]).status().unwrap();
        assert!(status.success());

        assert_eq!(rx.recv_timeout(Duration::from_secs(10)).unwrap(), Interrupt::Sigint);
        handle.join().unwrap();
        assert_eq!(store.count_open_sessions().unwrap(), 0);
        assert_eq!(store.state(id).unwrap(), Some(JobState::Failed));
    }

    #[test]
    fn exit_codes_follow_the_shell_convention() {
        assert_eq!(Interrupt::Sigint.exit_code(), 130);
        assert_eq!(Interrupt::Sigterm.exit_code(), 143);
    }
}
