//! Speech-to-text client for Kinyarwanda audio.
//!
//! Uploads the audio blob as a multipart form and reads the transcript out
//! of the `{ data: { text } }` payload. One call per upload, no retries.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::assistant::SpeechToTextProvider;
use crate::error::UpstreamError;

const SERVICE: &str = "speech-to-text";

/// Language code sent alongside the upload.
const STT_LANGUAGE: &str = "rw";

#[derive(Debug, Clone, Deserialize)]
struct SttResponse {
    data: SttData,
}

#[derive(Debug, Clone, Deserialize)]
struct SttData {
    text: String,
}

/// Client for the transcription endpoint.
#[derive(Debug)]
pub struct SttClient {
    client: reqwest::Client,
    url: String,
}

impl SttClient {
    pub fn new(url: &str) -> Result<Self, String> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| format!("Invalid speech-to-text URL '{url}': {e}"))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "Speech-to-text URL must use http or https scheme, got: {}",
                parsed.scheme()
            ));
        }

        info!("SttClient created for {url}");

        Ok(Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SpeechToTextProvider for SttClient {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, UpstreamError> {
        if audio.is_empty() {
            return Ok(String::new());
        }

        debug!("transcribing {} bytes from {filename}", audio.len());

        let file_name = if filename.is_empty() {
            "file.wav".to_string()
        } else {
            filename.to_string()
        };

        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| UpstreamError::malformed(SERVICE, e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("audio", file_part)
            .text("lang", STT_LANGUAGE);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::bad_status(SERVICE, status, body));
        }

        let parsed: SttResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::malformed(SERVICE, e.to_string()))?;

        debug!("transcription returned {} chars", parsed.data.text.len());
        Ok(parsed.data.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcription_response() {
        let json = serde_json::json!({
            "status": "ok",
            "data": {"text": "mfite umuriro", "lang": "rw"}
        });
        let parsed: SttResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.data.text, "mfite umuriro");
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        let json = serde_json::json!({"status": "ok"});
        assert!(serde_json::from_value::<SttResponse>(json).is_err());
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(SttClient::new("file:///etc/passwd").is_err());
        assert!(SttClient::new("").is_err());
    }

    #[test]
    fn test_new_accepts_https() {
        assert!(SttClient::new("https://api.example.com/ai/stt/rw/public").is_ok());
    }
}
