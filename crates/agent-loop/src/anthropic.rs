//! Concrete [`Oracle`] backed by the Anthropic Messages API, grounded on the
//! same request/response shape as a Claude-backed LLM provider: one system
//! string, a message list, `x-api-key`/`anthropic-version` headers, content
//! blocks in, content blocks out.

use std::time::Duration;

use async_trait::async_trait;
use oracle_protocol::{ContentBlock, OracleMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::OracleError;
use crate::oracle::Oracle;

#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Reads `ANTHROPIC_API_KEY` (required) and `ANTHROPIC_MODEL` (optional,
    /// defaults to Claude Sonnet) per SPEC_FULL.md §7's env var wiring.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").ok().filter(|v| !v.is_empty())?;
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
        Some(Self {
            api_key,
            model,
            api_base: "https://api.anthropic.com/v1".to_string(),
            max_tokens: 1536,
            timeout: Duration::from_secs(60),
        })
    }
}

pub struct AnthropicOracle {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicOracle {
    pub fn new(config: AnthropicConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| OracleError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn ask(&self, system_prompt: &str, history: &[OracleMessage]) -> Result<String, OracleError> {
        let body = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: system_prompt.to_string(),
            messages: history.iter().map(to_wire_message).collect(),
        };

        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|err| OracleError::Transport(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(OracleError::Transport(format!("oracle returned {status}: {text}")));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|err| OracleError::Transport(format!("oracle response invalid: {err}")))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(OracleError::Empty);
        }

        Ok(text)
    }
}

fn to_wire_message(message: &OracleMessage) -> WireMessage {
    WireMessage {
        role: message.role.clone(),
        content: message.content.iter().map(to_wire_content).collect(),
    }
}

fn to_wire_content(block: &ContentBlock) -> WireContent {
    match block {
        ContentBlock::Text { text } => WireContent::Text { text: text.clone() },
        ContentBlock::Image { media_type, data } => WireContent::Image {
            source: WireImageSource {
                kind: "base64".to_string(),
                media_type: media_type.clone(),
                data: data.clone(),
            },
        },
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    #[serde(rename = "max_tokens")]
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent {
    Text { text: String },
    Image { source: WireImageSource },
}

#[derive(Debug, Serialize)]
struct WireImageSource {
    #[serde(rename = "type")]
    kind: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicResponseContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponseContent {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_is_none_without_an_api_key() {
        std::env::remove_var("ANTHROPIC_API_KEY");
        assert!(AnthropicConfig::from_env().is_none());
    }

    #[test]
    fn wire_content_preserves_image_media_type() {
        let block = ContentBlock::image_png("Zm9v");
        match to_wire_content(&block) {
            WireContent::Image { source } => {
                assert_eq!(source.kind, "base64");
                assert_eq!(source.media_type, "image/png");
                assert_eq!(source.data, "Zm9v");
            }
            WireContent::Text { .. } => panic!("expected an image content block"),
        }
    }
}
