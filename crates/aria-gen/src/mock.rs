//! Mock music service for testing and offline use
//!
//! Completes jobs after a scripted number of "processing" polls and returns
//! a silence WAV without any network calls. Submission times are recorded so
//! tests can assert rate-limit behavior.

use crate::service::{MusicService, PollStatus, SubmitRequest};
use aria_core::{AriaError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// A mock backend that generates placeholder audio locally
pub struct MockService {
    polls_before_complete: u32,
    artifact: Vec<u8>,
    poll_counts: Mutex<HashMap<String, u32>>,
    submissions: Mutex<Vec<Instant>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    /// Jobs complete on the first poll
    pub fn new() -> Self {
        Self::with_polls(0)
    }

    /// Jobs report "processing" for `polls` polls before completing
    pub fn with_polls(polls: u32) -> Self {
        Self {
            polls_before_complete: polls,
            artifact: silence_wav(1.0),
            poll_counts: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Replace the artifact returned on download
    pub fn with_artifact(mut self, bytes: Vec<u8>) -> Self {
        self.artifact = bytes;
        self
    }

    /// Times at which submissions were accepted
    pub fn submission_times(&self) -> Vec<Instant> {
        self.submissions.lock().expect("mock lock poisoned").clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().expect("mock lock poisoned").len()
    }
}

impl MusicService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    fn submit(&self, _request: &SubmitRequest) -> Result<String> {
        self.submissions
            .lock()
            .expect("mock lock poisoned")
            .push(Instant::now());
        Ok(uuid::Uuid::new_v4().to_string())
    }

    fn poll(&self, job_id: &str) -> Result<PollStatus> {
        let mut counts = self.poll_counts.lock().expect("mock lock poisoned");
        let count = counts.entry(job_id.to_string()).or_insert(0);
        *count += 1;
        if *count > self.polls_before_complete {
            Ok(PollStatus::Complete {
                audio_url: Some(format!("mock://{}", job_id)),
            })
        } else {
            Ok(PollStatus::Processing)
        }
    }

    fn download(&self, audio_url: &str) -> Result<Vec<u8>> {
        if audio_url.starts_with("mock://") {
            Ok(self.artifact.clone())
        } else {
            Err(AriaError::TransportError(format!(
                "Mock cannot fetch {}",
                audio_url
            )))
        }
    }
}

/// Generate a mono 16-bit PCM WAV of silence
pub fn silence_wav(duration_secs: f64) -> Vec<u8> {
    let sample_rate: u32 = 44100;
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let num_samples = (sample_rate as f64 * duration_secs) as u32;
    let data_size = num_samples * (bits_per_sample / 8) as u32 * num_channels as u32;

    let mut wav = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    let block_align = num_channels * (bits_per_sample / 8);
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk (silence)
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.resize(44 + data_size as usize, 0);

    wav
}
