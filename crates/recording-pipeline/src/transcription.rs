//! Narration transcription (spec.md §4.C11): runs only when an API key is
//! configured and a non-empty WAV recording exists.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;

use core_types::TranscriptionSegment;

use crate::errors::RecordingError;

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav_path: &Path) -> Result<Vec<TranscriptionSegment>, RecordingError>;
}

/// Transcribes via OpenAI's audio transcription endpoint, requesting
/// `verbose_json` so per-segment start/end offsets survive (spec.md §4.C11
/// narration matching needs them scaled by 1000 against event timestamps).
pub struct OpenAiTranscriber {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: impl Into<String>) -> Result<Self, RecordingError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|err| RecordingError::TranscriptionFailed(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
        })
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, wav_path: &Path) -> Result<Vec<TranscriptionSegment>, RecordingError> {
        let bytes = tokio::fs::read(wav_path)
            .await
            .map_err(|err| RecordingError::Io(err.to_string()))?;

        let file_name = wav_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", multipart::Part::bytes(bytes).file_name(file_name).mime_str("audio/wav").map_err(|err| {
                RecordingError::TranscriptionFailed(format!("invalid multipart mime: {err}"))
            })?);

        let url = format!("{}/audio/transcriptions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|err| RecordingError::TranscriptionFailed(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "<unavailable>".to_string());
            return Err(RecordingError::TranscriptionFailed(format!("transcription API returned {status}: {text}")));
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .map_err(|err| RecordingError::TranscriptionFailed(format!("invalid transcription response: {err}")))?;

        Ok(parsed
            .segments
            .into_iter()
            .map(|segment| TranscriptionSegment {
                text: segment.text.trim().to_string(),
                start_time: segment.start,
                end_time: segment.end,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whisper_segments_deserialize_into_transcription_segments() {
        let raw = r#"{"segments":[{"start":0.0,"end":1.5,"text":" hello "}]}"#;
        let parsed: WhisperResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments[0].text.trim(), "hello");
    }
}
