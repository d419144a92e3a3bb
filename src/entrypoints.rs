//! Entry points of the external collaborators
//!
//! Signal alignment and read ledger construction live outside this crate. Root jobs reach them
//! through the two function signatures below; `EntryPoints` binds a pair of implementations and
//! dispatches root jobs to them.

use anyhow::{bail, Result};
use log::info;

use crate::config::Config;
use crate::engine::{JobRunner, RootJob, RootJobFunction};
use crate::sample::{AlignmentSample, ReadstoreSample};

/// `(config, one sample) -> result`
pub type SignalAlignFn = Box<dyn Fn(&Config, &AlignmentSample) -> Result<()>>;

/// `(config, samples) -> result`
pub type ReadLedgerFn = Box<dyn Fn(&Config, &[ReadstoreSample]) -> Result<()>>;

pub struct EntryPoints {
    signal_align: SignalAlignFn,
    read_ledger: ReadLedgerFn,
}

impl EntryPoints {
    pub fn new(signal_align: SignalAlignFn, read_ledger: ReadLedgerFn) -> EntryPoints {
        EntryPoints { signal_align, read_ledger }
    }
}

impl Default for EntryPoints {
    fn default() -> Self {
        EntryPoints::new(Box::new(signal_align_root_job), Box::new(read_ledger_root_job))
    }
}

impl JobRunner for EntryPoints {
    fn run(&self, job: &RootJob) -> Result<()> {
        match &job.function {
            RootJobFunction::SignalAlign { sample } => (self.signal_align)(&job.config, sample),
            RootJobFunction::ReadLedger { samples } => (self.read_ledger)(&job.config, samples.as_slice()),
        }
    }
}

/// Alignment root job. Alignment is supplied by an external toolkit; no implementation ships here.
pub fn signal_align_root_job(_config: &Config, sample: &AlignmentSample) -> Result<()> {
    bail!("signal alignment of {} is not implemented in this build", sample.label)
}

/// Ledger root job. Building ledgers and readstores is owned by an external toolkit.
pub fn read_ledger_root_job(config: &Config, samples: &[ReadstoreSample]) -> Result<()> {
    let ledger = config.get_str("ledger_name").unwrap_or("unnamed");
    info!("Ledger {ledger} requested for {} archive(s)", samples.len());
    bail!("read ledger construction is not implemented in this build")
}
