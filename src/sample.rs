use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw instrument archive formats a readstore can be built from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ArchiveKind {
    #[serde(rename = "tar")]
    Tar,
    #[serde(rename = "gz-tar")]
    GzTar,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArchiveKind::Tar => write!(f, "tar"),
            ArchiveKind::GzTar => write!(f, "gz-tar"),
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar" => Ok(ArchiveKind::Tar),
            "gz-tar" => Ok(ArchiveKind::GzTar),
            _ => Err(s.to_string()),
        }
    }
}

/// One sample for the alignment pipeline (`run`)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlignmentSample {
    /// URL exactly as written in the manifest, validated but not normalized
    pub source_url: String,
    pub label: String,
    /// Free-form size such as `4G`, passed through to the job
    pub size_hint: String,
}

/// One raw archive for the readstore pipeline (`run-readstore`)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadstoreSample {
    pub archive_kind: ArchiveKind,
    pub source_url: String,
    pub label: String,
    pub size_hint: String,
}
