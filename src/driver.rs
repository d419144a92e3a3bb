//! Submission of parsed samples to the workflow engine
//!
//! Every root job gets its own engine session: per-sample granularity opens one session per
//! sample, in manifest order, and batched granularity opens a single session whose root job gets
//! every sample. Sessions are never open at the same time. An engine failure stops the loop and
//! is returned as is; picking up from there is what `--restart` is for.

use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::config::{Config, ConfigError};
use crate::engine::{Completed, EngineError, EngineSession, RootJob, WorkflowEngine};
use crate::sample::{AlignmentSample, ReadstoreSample};

/// Config option selecting readstore granularity
pub const GRANULARITY_KEY: &str = "granularity";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Granularity {
    /// One root job and one engine session per sample
    PerSample,
    /// One root job over all samples in one engine session
    Batched,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Granularity::PerSample => write!(f, "per_sample"),
            Granularity::Batched => write!(f, "batched"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_sample" | "per-sample" => Ok(Granularity::PerSample),
            "batched" => Ok(Granularity::Batched),
            other => Err(other.to_string()),
        }
    }
}

impl Granularity {
    /// Granularity requested by the config, if any
    pub fn from_config(config: &Config) -> Result<Option<Granularity>, ConfigError> {
        let invalid = |value: String| ConfigError::InvalidOption { key: GRANULARITY_KEY.to_string(), value };
        match config.get(GRANULARITY_KEY) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => s.parse().map(Some).map_err(invalid),
            Some(other) => Err(invalid(other.to_string())),
        }
    }
}

/// Samples of one pipeline kind, in manifest order
#[derive(Clone, Debug, PartialEq)]
pub enum Samples {
    Alignment(Vec<AlignmentSample>),
    Readstore(Vec<ReadstoreSample>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Alignment(samples) => samples.len(),
            Samples::Readstore(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind samples to root jobs. Alignment root jobs always take exactly one sample.
    pub fn into_root_jobs(self, config: &Config, granularity: Granularity) -> Vec<RootJob> {
        match (self, granularity) {
            (Samples::Alignment(samples), _) => samples
                .into_iter()
                .map(|sample| RootJob::signal_align(config, sample))
                .collect(),
            (Samples::Readstore(samples), Granularity::PerSample) => samples
                .into_iter()
                .map(|sample| RootJob::read_ledger(config, vec![sample]))
                .collect(),
            (Samples::Readstore(samples), Granularity::Batched) => match samples.is_empty() {
                true => Vec::new(),
                false => vec![RootJob::read_ledger(config, samples)],
            },
        }
    }
}

/// What a driver invocation did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Engine sessions opened, and released
    pub sessions: usize,
    pub completed: Vec<Completed>,
}

/// Start fresh root jobs for `samples`
pub fn submit<E: WorkflowEngine>(
    engine: &E,
    config: &Config,
    samples: Samples,
    granularity: Granularity,
) -> Result<Report, EngineError> {
    if samples.is_empty() {
        warn!("No samples to submit");
        return Ok(Report::default());
    }

    let jobs = samples.into_root_jobs(config, granularity);
    info!("Submitting {} root job(s) with {granularity} granularity", jobs.len());

    let mut report = Report::default();
    for job in jobs {
        let mut session = engine.open_session()?;
        report.sessions += 1;
        report.completed.push(session.start(job)?);
    }
    Ok(report)
}

/// Resume unfinished root jobs from the engine's persisted state
pub fn resume<E: WorkflowEngine>(engine: &E) -> Result<Report, EngineError> {
    info!("Restarting from persisted workflow state");
    let mut session = engine.open_session()?;
    let completed = session.restart()?;
    Ok(Report { sessions: 1, completed })
}
