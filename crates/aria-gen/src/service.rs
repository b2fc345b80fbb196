//! Music synthesis service contract
//!
//! Everything the generation pipeline assumes about the external service
//! lives behind this trait: submit a prompt for a job id, poll the job,
//! download the finished artifact. `SunoService` talks to the real API;
//! `MockService` generates placeholder audio without a network.

use crate::config::AriaConfig;
use aria_core::{AriaError, Result};
use std::sync::Arc;

/// A request to generate one piece of music
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub prompt: String,
    pub model: String,
    pub custom_mode: bool,
    pub instrumental: bool,
    pub callback_url: String,
}

impl SubmitRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: "V3_5".to_string(),
            custom_mode: false,
            instrumental: false,
            callback_url: String::new(),
        }
    }
}

/// What one status poll reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Submitted or processing, not done yet
    Processing,
    /// Finished; the locator may still be missing, which callers treat as
    /// a failure
    Complete { audio_url: Option<String> },
    /// The service reported failure with a reason
    Failed(String),
}

/// Trait implemented by each music synthesis backend
pub trait MusicService: Send + Sync {
    /// Backend name (e.g. "suno", "mock")
    fn name(&self) -> &str;

    /// Submit a generation request, returning the service's job id.
    /// Any error here is terminal for the job.
    fn submit(&self, request: &SubmitRequest) -> Result<String>;

    /// Check a job once. A "not found" response surfaces as
    /// `AriaError::ContractViolation`; other transport failures as
    /// `AriaError::TransportError` (the job layer retries those).
    fn poll(&self, job_id: &str) -> Result<PollStatus>;

    /// Fetch the finished artifact from its locator.
    /// Any error here is terminal for the job.
    fn download(&self, audio_url: &str) -> Result<Vec<u8>>;
}

/// Create a service backend by name
pub fn create_service(name: &str, config: &AriaConfig) -> Result<Arc<dyn MusicService>> {
    match name {
        "mock" => Ok(Arc::new(crate::mock::MockService::new())),
        "suno" => Ok(Arc::new(crate::suno::SunoService::from_config(config)?)),
        _ => Err(AriaError::ConfigError(format!(
            "Unknown service '{}'. Available: suno, mock",
            name
        ))),
    }
}
