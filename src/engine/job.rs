use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::sample::{AlignmentSample, ReadstoreSample};

/// The entry point a root job calls, with its sample arguments bound
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "function", rename_all = "snake_case")]
pub enum RootJobFunction {
    /// `(config, one sample)`
    SignalAlign { sample: AlignmentSample },
    /// `(config, samples)`, one sample when submitted per sample
    ReadLedger { samples: Vec<ReadstoreSample> },
}

/// Top-level unit of work handed to the engine: an entry point bound to its arguments
///
/// Root jobs are stored as JSON so a restart can rebuild them without the manifest or config.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RootJob {
    pub config: Config,
    pub function: RootJobFunction,
}

impl RootJob {
    pub fn signal_align(config: &Config, sample: AlignmentSample) -> RootJob {
        RootJob { config: config.clone(), function: RootJobFunction::SignalAlign { sample } }
    }

    pub fn read_ledger(config: &Config, samples: Vec<ReadstoreSample>) -> RootJob {
        RootJob { config: config.clone(), function: RootJobFunction::ReadLedger { samples } }
    }

    pub fn name(&self) -> &'static str {
        match self.function {
            RootJobFunction::SignalAlign { .. } => "signal_align",
            RootJobFunction::ReadLedger { .. } => "read_ledger",
        }
    }

    /// Sample label(s) the job works on, for logs and the job store
    pub fn label(&self) -> String {
        match &self.function {
            RootJobFunction::SignalAlign { sample } => sample.label.clone(),
            RootJobFunction::ReadLedger { samples } => samples
                .iter()
                .map(|s| s.label.as_str())
                .collect::<Vec<&str>>()
                .join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ArchiveKind;

    fn readstore_sample(label: &str) -> ReadstoreSample {
        ReadstoreSample {
            archive_kind: ArchiveKind::Tar,
            source_url: format!("s3://bucket/{label}.tar"),
            label: label.to_string(),
            size_hint: "1G".to_string(),
        }
    }

    #[test]
    fn batch_label_lists_every_sample() {
        let job = RootJob::read_ledger(&Config::default(), vec![readstore_sample("a"), readstore_sample("b")]);
        assert_eq!(job.name(), "read_ledger");
        assert_eq!(job.label(), "a,b");
    }

    #[test]
    fn persisted_form_names_the_function() {
        let job = RootJob::read_ledger(&Config::default(), vec![readstore_sample("a")]);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["function"]["function"], "read_ledger");
        assert_eq!(json["function"]["samples"][0]["archive_kind"], "tar");

        let decoded: RootJob = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, job);
    }
}
