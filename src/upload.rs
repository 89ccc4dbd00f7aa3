//! One-shot analysis upload
//!
//! The record-then-upload workflow: a complete recording is posted to the
//! backend's analyze endpoint as a multipart file and the response is mapped
//! into the same transcript/summary/action-items vocabulary the streaming
//! path uses. Single request, no retries.

use reqwest::multipart;
use tracing::{info, warn};

use crate::channel::AnalysisResult;
use crate::error::UploadError;

pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Upload a complete recording for analysis.
    ///
    /// An empty recording is rejected before any network activity.
    pub async fn upload(&self, audio: Vec<u8>) -> Result<AnalysisResult, UploadError> {
        if audio.is_empty() {
            warn!("Upload requested with no audio data");
            return Err(UploadError::NoAudio);
        }

        info!("Uploading {} bytes of audio for analysis", audio.len());

        let part = multipart::Part::bytes(audio)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(UploadError::Request)?;
        let form = multipart::Form::new().part("audio_file", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result = response.json::<AnalysisResult>().await?;
        info!(
            "Analysis complete: {} action items",
            result.action_items.len()
        );
        Ok(result)
    }
}
