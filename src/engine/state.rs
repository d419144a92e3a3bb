use std::str::FromStr;

/// Lifecycle of a root job in the job store
///
/// Jobs are staged (persisted, not yet run), running, then completed or failed. A crash leaves a
/// job staged or running; restart picks up everything that isn't completed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    Staged,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Value stored in the `state` column
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Staged => "staged",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staged" => Ok(JobState::Staged),
            "running" => Ok(JobState::Running),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            other => Err(format!("unknown job state '{other}'")),
        }
    }
}
