//! Job lifecycle state machine
//!
//! A job moves `queued → running → {succeeded, failed}` and is immutable
//! once terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::narration::{NarrationResult, TaskKind, VisionResult};

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Queued, JobStatus::Running) => true,
            (JobStatus::Queued | JobStatus::Running, JobStatus::Succeeded | JobStatus::Failed) => {
                true
            }
            _ => false,
        }
    }
}

/// Result stored on a succeeded job
///
/// Serialized without a tag so the stored result is byte-identical to the
/// one embedded in the submitting response; the job's `kind` carries the
/// discriminant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobResult {
    Narration(NarrationResult),
    Vision(VisionResult),
}

impl JobResult {
    pub fn kind(&self) -> TaskKind {
        match self {
            JobResult::Narration(_) => TaskKind::Narration,
            JobResult::Vision(_) => TaskKind::Vision,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            JobResult::Narration(r) => &r.summary,
            JobResult::Vision(r) => &r.summary,
        }
    }
}

/// Tracked lifecycle record for one narration or vision request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    pub kind: TaskKind,
    pub status: JobStatus,
    /// Present iff succeeded
    pub result: Option<JobResult>,
    /// Present iff synthesis ran
    pub audio_url: Option<String>,
    pub duration: Option<f64>,
    /// Present iff failed
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    /// Present iff terminal
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a job in the `queued` state
    pub fn new(job_id: Uuid, kind: TaskKind) -> Self {
        Self {
            job_id,
            kind,
            status: JobStatus::Queued,
            result: None,
            audio_url: None,
            duration: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a transition, stamping the matching timestamp
    ///
    /// Returns the previous status, or `None` if the transition is illegal
    /// (in which case the job is unchanged).
    pub fn transition_to(&mut self, next: JobStatus) -> Option<JobStatus> {
        if !self.status.can_transition_to(next) {
            return None;
        }
        let previous = self.status;
        self.status = next;
        let now = Utc::now();
        if next == JobStatus::Running {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Some(previous)
    }

    /// Progress percentage reported to pollers
    pub fn progress(&self) -> Option<u8> {
        match self.status {
            JobStatus::Succeeded => Some(100),
            _ => None,
        }
    }
}
