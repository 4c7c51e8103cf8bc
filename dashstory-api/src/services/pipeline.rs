//! Job-tracked narration and vision pipelines
//!
//! Narration: prompt → inference → normalize → synthesize → record.
//! Vision: the same with the confidence gate ahead of synthesis.
//!
//! `play_narration` and `interpret_image` run to a terminal job state before
//! returning. `submit_narration` returns once the job is queued and drives
//! it on a spawned task.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::audio_store::AudioStore;
use super::confidence_gate::should_synthesize;
use super::inference_gateway::InferenceBackend;
use super::job_tracker::{JobError, JobTracker};
use super::narration_service::NarrationService;
use super::synthesis_dispatcher::{SynthesisDispatcher, SynthesisOutcome};
use super::vision_service::{ImagePayload, VisionService};
use crate::models::{
    Job, JobResult, Language, NarrationResult, PanelDescriptor, TaskKind, VisionResult,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Job(#[from] JobError),
}

/// Narration job input
#[derive(Debug, Clone)]
pub struct NarrationJob {
    pub panels: Vec<PanelDescriptor>,
    pub language: Language,
    pub voice_id: String,
}

#[derive(Debug, Clone)]
pub struct NarrationOutcome {
    pub job: Job,
    pub result: NarrationResult,
    pub audio: SynthesisOutcome,
    pub used_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct VisionOutcome {
    pub job: Job,
    pub result: VisionResult,
    /// Absent when the confidence gate blocked synthesis
    pub audio: Option<SynthesisOutcome>,
    pub used_fallback: bool,
}

/// Shared pipeline handle; clones share the job registry and backends
#[derive(Clone)]
pub struct Pipeline {
    narration: NarrationService,
    vision: VisionService,
    dispatcher: Arc<SynthesisDispatcher>,
    jobs: JobTracker,
    speed: f64,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        store: Arc<dyn AudioStore>,
        jobs: JobTracker,
        speed: f64,
    ) -> Self {
        Self {
            narration: NarrationService::new(backend.clone()),
            vision: VisionService::new(backend.clone()),
            dispatcher: Arc::new(SynthesisDispatcher::new(backend, store)),
            jobs,
            speed,
        }
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }

    /// Run a narration job to completion and return its outcome
    pub async fn play_narration(&self, request: NarrationJob) -> Result<NarrationOutcome, PipelineError> {
        let job_id = Uuid::new_v4();
        self.jobs.create(job_id, TaskKind::Narration).await?;
        self.run_or_fail(job_id, request).await
    }

    /// Queue a narration job and drive it in the background
    pub async fn submit_narration(&self, request: NarrationJob) -> Result<Job, PipelineError> {
        let job_id = Uuid::new_v4();
        let job = self.jobs.create(job_id, TaskKind::Narration).await?;

        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(e) = pipeline.run_or_fail(job_id, request).await {
                error!(job_id = %job_id, error = %e, "Background narration job failed");
            }
        });

        Ok(job)
    }

    async fn run_or_fail(
        &self,
        job_id: Uuid,
        request: NarrationJob,
    ) -> Result<NarrationOutcome, PipelineError> {
        match self.run_narration(job_id, request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Job may already be terminal, in which case this error is still returned
                let _ = self.jobs.fail(job_id, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run_narration(
        &self,
        job_id: Uuid,
        request: NarrationJob,
    ) -> Result<NarrationOutcome, PipelineError> {
        self.jobs.start(job_id).await?;
        info!(
            job_id = %job_id,
            panel_count = request.panels.len(),
            voice_id = %request.voice_id,
            "Narration job running"
        );

        let normalized = self
            .narration
            .generate_narration(&request.panels, request.language)
            .await;

        let audio = self
            .dispatcher
            .synthesize(&normalized.result.summary, &request.voice_id, self.speed)
            .await;

        let job = self
            .jobs
            .complete(
                job_id,
                JobResult::Narration(normalized.result.clone()),
                Some(audio.audio_url.clone()),
                Some(audio.duration_seconds),
            )
            .await?;

        info!(
            job_id = %job_id,
            duration = audio.duration_seconds,
            used_fallback = normalized.used_fallback,
            "Narration generated successfully"
        );

        Ok(NarrationOutcome {
            job,
            result: normalized.result,
            audio,
            used_fallback: normalized.used_fallback,
        })
    }

    /// Interpret a validated image as a tracked vision job
    pub async fn interpret_image(
        &self,
        image: &ImagePayload,
        language: Language,
        voice_id: &str,
    ) -> Result<VisionOutcome, PipelineError> {
        let job_id = Uuid::new_v4();
        self.jobs.create(job_id, TaskKind::Vision).await?;
        self.jobs.start(job_id).await?;

        let normalized = self.vision.interpret(image, language).await;

        let audio = if should_synthesize(&normalized.result) {
            Some(
                self.dispatcher
                    .synthesize(&normalized.result.summary, voice_id, self.speed)
                    .await,
            )
        } else {
            info!(
                job_id = %job_id,
                confidence = normalized.result.confidence,
                "Confidence below threshold, skipping synthesis"
            );
            None
        };

        let job = self
            .jobs
            .complete(
                job_id,
                JobResult::Vision(normalized.result.clone()),
                audio.as_ref().map(|a| a.audio_url.clone()),
                audio.as_ref().map(|a| a.duration_seconds),
            )
            .await?;

        Ok(VisionOutcome {
            job,
            result: normalized.result,
            audio,
            used_fallback: normalized.used_fallback,
        })
    }
}
