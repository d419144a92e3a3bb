//! The two pipelines and how a `run` invocation drives them

use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use crate::config::{schema, Config, ConfigError};
use crate::driver::{self, Granularity, Report, Samples, GRANULARITY_KEY};
use crate::engine::WorkflowEngine;
use crate::error::UserInputError;
use crate::manifest::{parse_manifest, ManifestError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineKind {
    /// Signal alignment of already collected reads (`run`)
    Alignment,
    /// Raw archives to readstore via a read ledger (`run-readstore`)
    Readstore,
}

impl PipelineKind {
    pub fn run_command(&self) -> &'static str {
        match self {
            PipelineKind::Alignment => "run",
            PipelineKind::Readstore => "run-readstore",
        }
    }

    pub fn generate_command(&self) -> &'static str {
        match self {
            PipelineKind::Alignment => "generate",
            PipelineKind::Readstore => "generate-readstore",
        }
    }

    pub fn default_config(&self) -> &'static str {
        match self {
            PipelineKind::Alignment => "config-signalAlign.yaml",
            PipelineKind::Readstore => "config-signalAlign-readstore.yaml",
        }
    }

    pub fn default_manifest(&self) -> &'static str {
        match self {
            PipelineKind::Alignment => "manifest-signalAlign.tsv",
            PipelineKind::Readstore => "manifest-signalAlign-readstore.tsv",
        }
    }

    /// JSON schema of the documented config options
    pub fn config_schema(&self) -> &'static str {
        static RUN: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/run.json"));
        static READSTORE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/readstore.json"));
        match self {
            PipelineKind::Alignment => RUN,
            PipelineKind::Readstore => READSTORE,
        }
    }

    /// Alignment is always per sample. Readstore follows the config and defaults to batched.
    pub fn granularity(&self, config: &Config) -> Result<Granularity, ConfigError> {
        match self {
            PipelineKind::Alignment => {
                if let Some(value) = config.get(GRANULARITY_KEY).filter(|v| !v.is_null()) {
                    warn!("Alignment root jobs take one sample each, ignoring granularity: {value}");
                }
                Ok(Granularity::PerSample)
            }
            PipelineKind::Readstore => Ok(Granularity::from_config(config)?.unwrap_or(Granularity::Batched)),
        }
    }
}

/// Everything a `run` invocation needs, resolved from the command line
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub kind: PipelineKind,
    pub config: PathBuf,
    pub manifest: PathBuf,
    pub restart: bool,
}

/// Check inputs, then resume or parse everything and submit
///
/// A restart resumes from the engine's persisted state and doesn't parse the manifest. A fresh
/// start validates the whole manifest before the first submission.
pub fn run<E: WorkflowEngine>(request: &RunRequest, engine: &E) -> Result<Report> {
    require_inputs(request)?;

    if request.restart {
        return Ok(driver::resume(engine)?);
    }

    let kind = request.kind;
    let config = Config::load(&request.config, kind.generate_command()).map_err(UserInputError::from)?;
    schema::check(&config, kind.config_schema());
    let granularity = kind.granularity(&config).map_err(UserInputError::from)?;

    let samples = match kind {
        PipelineKind::Alignment => Samples::Alignment(parse_manifest(&request.manifest).map_err(UserInputError::from)?),
        PipelineKind::Readstore => Samples::Readstore(parse_manifest(&request.manifest).map_err(UserInputError::from)?),
    };
    info!("Parsed {} sample(s) for {}", samples.len(), kind.run_command());

    Ok(driver::submit(engine, &config, samples, granularity)?)
}

fn require_inputs(request: &RunRequest) -> Result<(), UserInputError> {
    if !request.config.exists() {
        let command = request.kind.generate_command();
        return Err(ConfigError::ConfigNotFound { path: request.config.clone(), command }.into());
    }
    if !request.manifest.exists() {
        return Err(ManifestError::ManifestNotFound { path: request.manifest.clone() }.into());
    }
    Ok(())
}
