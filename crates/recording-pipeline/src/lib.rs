#![allow(dead_code)]

pub mod audio_producer;
pub mod coalescer;
pub mod errors;
pub mod event_producer;
pub mod events;
pub mod frame_producer;
pub mod manifest;
pub mod pipeline;
pub mod transcription;
pub mod triggers;

pub use errors::RecordingError;
pub use manifest::{build_manifest, pick_narration};
pub use pipeline::{HelperCommand, RecordingSession, RecordingSessionConfig};
pub use transcription::{OpenAiTranscriber, Transcriber};
pub use triggers::TriggerReason;
