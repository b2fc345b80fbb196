//! Suno music generation backend
//!
//! Talks to the Suno-compatible HTTP API: `POST /generate` to submit,
//! `GET /status/{id}` to poll, then a plain fetch of the returned audio URL.
//! Calls are single attempts on purpose: submit and download failures are
//! terminal for a job, and poll retries belong to the job state machine.

use crate::config::AriaConfig;
use crate::service::{MusicService, PollStatus, SubmitRequest};
use aria_core::{AriaError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_SUNO_URL: &str = "https://api.sunoapi.org/api/v1";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the Suno generation API
pub struct SunoService {
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    prompt: &'a str,
    model: &'a str,
    custom_mode: bool,
    instrumental: bool,
    call_back_url: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SunoService {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Create a SunoService from config; a missing credential fails fast
    pub fn from_config(config: &AriaConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| {
                AriaError::ConfigError(
                    "Suno API key not configured. Set ARIA_SUNO_API_KEY or add to .aria/config.toml"
                        .to_string(),
                )
            })?
            .to_string();

        let base_url = config.api_url().unwrap_or(DEFAULT_SUNO_URL).to_string();

        Ok(Self { api_key, base_url })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl MusicService for SunoService {
    fn name(&self) -> &str {
        "suno"
    }

    fn submit(&self, request: &SubmitRequest) -> Result<String> {
        let url = format!("{}/generate", self.base_url);
        let body = GenerateBody {
            prompt: &request.prompt,
            model: &request.model,
            custom_mode: request.custom_mode,
            instrumental: request.instrumental,
            call_back_url: &request.callback_url,
        };

        let agent = build_agent();
        let mut response = agent
            .post(url.as_str())
            .header("Authorization", &self.bearer())
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| AriaError::TransportError(format!("Submit request failed: {}", e)))?;

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AriaError::TransportError(format!("Failed to read submit response: {}", e)))?;
        parse_submit_response(&text)
    }

    fn poll(&self, job_id: &str) -> Result<PollStatus> {
        let url = format!("{}/status/{}", self.base_url, job_id);

        let agent = build_agent();
        let mut response = agent
            .get(url.as_str())
            .header("Authorization", &self.bearer())
            .call()
            .map_err(|e| classify_status_error(job_id, e))?;

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AriaError::TransportError(format!("Failed to read status response: {}", e)))?;
        parse_status_response(&text)
    }

    fn download(&self, audio_url: &str) -> Result<Vec<u8>> {
        let agent = build_agent();
        let response = agent
            .get(audio_url)
            .call()
            .map_err(|e| AriaError::TransportError(format!("Audio download failed: {}", e)))?;

        let mut reader = response.into_body().into_reader();
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut bytes)
            .map_err(|e| AriaError::TransportError(format!("Failed to read audio data: {}", e)))?;
        Ok(bytes)
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

// A 404 from the status endpoint means the job id or endpoint is wrong,
// which is a configuration problem, not a transient one.
fn classify_status_error(job_id: &str, e: ureq::Error) -> AriaError {
    match e {
        ureq::Error::StatusCode(404) => AriaError::ContractViolation(format!(
            "status endpoint returned 404 for job {}",
            job_id
        )),
        other => AriaError::TransportError(format!("Status check failed: {}", other)),
    }
}

/// Parse a submit response body into a job id
pub fn parse_submit_response(json: &str) -> Result<String> {
    let response: SubmitResponse = serde_json::from_str(json)
        .map_err(|e| AriaError::ParseError(format!("Invalid submit response: {}", e)))?;

    if let Some(error) = response.error.filter(|e| !e.is_empty()) {
        return Err(AriaError::RemoteFailure(error));
    }

    match response.id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AriaError::RemoteFailure(
            "generation id missing from response".to_string(),
        )),
    }
}

/// Parse a status response body into a `PollStatus`
pub fn parse_status_response(json: &str) -> Result<PollStatus> {
    let response: StatusResponse = serde_json::from_str(json)
        .map_err(|e| AriaError::ParseError(format!("Invalid status response: {}", e)))?;

    match response.status.as_str() {
        "complete" => Ok(PollStatus::Complete {
            audio_url: response.audio_url.filter(|u| !u.is_empty()),
        }),
        "failed" => Ok(PollStatus::Failed(
            response
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "unknown error".to_string()),
        )),
        // "submitted" and "processing" both mean keep waiting
        _ => Ok(PollStatus::Processing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_body_wire_format() {
        let body = GenerateBody {
            prompt: "dark dungeon intense combat",
            model: "V3_5",
            custom_mode: false,
            instrumental: true,
            call_back_url: "https://example.com/cb",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["prompt"], "dark dungeon intense combat");
        assert_eq!(value["model"], "V3_5");
        assert_eq!(value["customMode"], false);
        assert_eq!(value["instrumental"], true);
        assert_eq!(value["callBackUrl"], "https://example.com/cb");
    }

    #[test]
    fn test_parse_submit_response_ok() {
        let id = parse_submit_response(r#"{"id":"job-123","status":"submitted"}"#).unwrap();
        assert_eq!(id, "job-123");
    }

    #[test]
    fn test_parse_submit_response_error_field() {
        let err = parse_submit_response(r#"{"error":"quota exceeded"}"#).unwrap_err();
        assert!(matches!(err, AriaError::RemoteFailure(msg) if msg == "quota exceeded"));
    }

    #[test]
    fn test_parse_submit_response_empty_id() {
        assert!(parse_submit_response(r#"{"id":""}"#).is_err());
        assert!(parse_submit_response(r#"{}"#).is_err());
    }

    #[test]
    fn test_parse_status_processing() {
        let status = parse_status_response(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(status, PollStatus::Processing);
        // "submitted" also counts as still pending
        let status = parse_status_response(r#"{"status":"submitted"}"#).unwrap();
        assert_eq!(status, PollStatus::Processing);
    }

    #[test]
    fn test_parse_status_complete() {
        let status = parse_status_response(
            r#"{"status":"complete","audio_url":"https://cdn.example.com/t.mp3"}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            PollStatus::Complete {
                audio_url: Some("https://cdn.example.com/t.mp3".to_string())
            }
        );
    }

    #[test]
    fn test_parse_status_complete_without_url() {
        let status = parse_status_response(r#"{"status":"complete","audio_url":""}"#).unwrap();
        assert_eq!(status, PollStatus::Complete { audio_url: None });
    }

    #[test]
    fn test_parse_status_failed() {
        let status = parse_status_response(
            r#"{"status":"failed","error":"content policy violation"}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            PollStatus::Failed("content policy violation".to_string())
        );

        let status = parse_status_response(r#"{"status":"failed"}"#).unwrap();
        assert_eq!(status, PollStatus::Failed("unknown error".to_string()));
    }
}
