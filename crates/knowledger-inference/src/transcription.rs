//! Transcription backend for voice ibits.
//!
//! The pipeline treats transcription output as ordinary raw text input; the
//! backend here speaks the OpenAI-compatible `/audio/transcriptions`
//! multipart endpoint (OpenAI Whisper, Speaches, faster-whisper-server).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use knowledger_core::{defaults, Error, Result};

/// Backend for transcribing audio to text.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe audio data to plain text.
    async fn transcribe(&self, audio_data: &[u8], mime_type: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible Whisper backend.
pub struct WhisperBackend {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl WhisperBackend {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::TRANSCRIBE_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Transcription(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(defaults::ENV_OPENAI_BASE_URL)
            .unwrap_or_else(|_| defaults::OPENAI_URL.to_string());
        let api_key = std::env::var(defaults::ENV_OPENAI_API_KEY).ok();
        let model = std::env::var(defaults::ENV_TRANSCRIBE_MODEL)
            .unwrap_or_else(|_| defaults::TRANSCRIBE_MODEL.to_string());
        Self::new(base_url, api_key, model)
    }
}

#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    async fn transcribe(&self, audio_data: &[u8], mime_type: &str) -> Result<String> {
        let url = format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        );

        let ext = match mime_type {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/ogg" => "ogg",
            "audio/flac" => "flac",
            "audio/webm" => "webm",
            _ => "wav",
        };

        let file_part = reqwest::multipart::Part::bytes(audio_data.to_vec())
            .file_name(format!("audio.{}", ext))
            .mime_str(mime_type)
            .map_err(|e| Error::Transcription(format!("Invalid MIME type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", file_part);

        let mut req = self.client.post(&url).multipart(form);
        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Backend returned {}: {}",
                status, body
            )));
        }

        let result: WhisperResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse response: {}", e)))?;

        debug!(
            subsystem = "inference",
            component = "transcription",
            op = "transcribe",
            response_len = result.text.len(),
            "Transcription complete"
        );
        Ok(result.text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
