use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to spawn native helper \"{0}\": {1}")]
    HelperSpawnFailed(String, String),

    #[error("frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("transcription request failed: {0}")]
    TranscriptionFailed(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("session directory already finalized")]
    AlreadyStopped,
}
