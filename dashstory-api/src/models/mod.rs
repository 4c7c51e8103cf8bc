//! Data models for dashstory-api

pub mod job;
pub mod narration;
pub mod panel;
pub mod voice;

pub use job::{Job, JobResult, JobStatus};
pub use narration::{Language, NarrationResult, TaskKind, VisionResult};
pub use panel::{MetricType, PanelData, PanelDescriptor, PanelValidationError, Thresholds};
pub use voice::Voice;
