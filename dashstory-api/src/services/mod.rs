//! Narration pipeline components

pub mod audio_store;
pub mod confidence_gate;
pub mod demo_content;
pub mod inference_gateway;
pub mod job_tracker;
pub mod narration_service;
pub mod pipeline;
pub mod prompt_builder;
pub mod response_normalizer;
pub mod synthesis_dispatcher;
pub mod vision_service;
pub mod voice_catalog;

pub use audio_store::{AudioStore, AudioStoreError, LocalAudioStore};
pub use inference_gateway::{
    InferenceBackend, InferenceError, InferenceGateway, InferenceRequest, InferenceSettings,
    Modality,
};
pub use job_tracker::{JobError, JobTracker};
pub use narration_service::NarrationService;
pub use pipeline::{NarrationJob, NarrationOutcome, Pipeline, PipelineError, VisionOutcome};
pub use response_normalizer::Normalized;
pub use synthesis_dispatcher::{SynthesisDispatcher, SynthesisOutcome};
pub use vision_service::{decode_image_payload, ImageError, ImagePayload, VisionService};
