use lagens_core::LagError;
use serde::{Deserialize, Serialize};

/// Final classification of a target issuance time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    /// The artifact already existed.
    Skipped,
    /// The ensemble was assembled and persisted.
    Built,
    /// Assembly or persistence failed; the error was recorded.
    Failed,
}

/// Outcome details for a target issuance time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum TargetStatus {
    /// The artifact already existed and was left untouched.
    Skipped,
    /// The ensemble was written.
    Built {
        /// Members in the artifact.
        members: usize,
        /// Time steps surviving the inner join.
        time_steps: usize,
        /// SHA256 of the artifact bytes.
        sha256: String,
    },
    /// The target could not be produced.
    Failed {
        /// Recorded cause.
        error: LagError,
    },
}

impl TargetStatus {
    /// Coarse state of the outcome.
    pub fn state(&self) -> TargetState {
        match self {
            TargetStatus::Skipped => TargetState::Skipped,
            TargetStatus::Built { .. } => TargetState::Built,
            TargetStatus::Failed { .. } => TargetState::Failed,
        }
    }
}

/// Result recorded for one target issuance time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    /// Compact issuance token of the target (`YYYYMMDDTHHZ`).
    pub target: String,
    /// Artifact path the target maps to.
    pub artifact: String,
    /// What happened.
    pub status: TargetStatus,
}

/// Summary of a pipeline invocation over the archive's full range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Lag depth used for every target.
    pub lag_depth: usize,
    /// Oldest run in the archive.
    pub earliest_run: String,
    /// Newest run in the archive.
    pub latest_run: String,
    /// First target with a complete lag window.
    pub first_target: String,
    /// Per-target outcomes in chronological order.
    pub outcomes: Vec<TargetOutcome>,
}

impl PipelineReport {
    /// Number of outcomes in the given state.
    pub fn count(&self, state: TargetState) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.state() == state)
            .count()
    }

    /// Recorded failures in chronological order.
    pub fn failures(&self) -> Vec<(&str, &LagError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                TargetStatus::Failed { error } => Some((outcome.target.as_str(), error)),
                _ => None,
            })
            .collect()
    }

    /// Human readable summary: one count line, then one line per failure.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} targets: {} built, {} skipped, {} failed",
            self.outcomes.len(),
            self.count(TargetState::Built),
            self.count(TargetState::Skipped),
            self.count(TargetState::Failed),
        )];
        for (target, error) in self.failures() {
            lines.push(format!("{target}: {error}"));
        }
        lines
    }
}
