//! Generation job state machine
//!
//! One job covers a single submit -> poll -> download cycle against the
//! synthesis service. Transitions are one-directional; `Complete`, `Failed`
//! and `TimedOut` are terminal and the job is discarded after reporting.

use crate::service::{MusicService, PollStatus, SubmitRequest};
use aria_core::{AriaError, Result, SceneDescriptor};
use std::time::{Duration, Instant};

/// Poll pacing for a single job
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    Polling,
    Complete,
    Failed,
    TimedOut,
}

/// What one poll tick produced
#[derive(Debug)]
pub enum JobTick {
    /// Still waiting (also covers transient transport failures)
    Pending,
    /// Done; the artifact can be downloaded from this locator
    Ready(String),
}

/// A single in-flight generation request
#[derive(Debug)]
pub struct GenerationJob {
    /// Job identifier assigned by the service on submit
    pub id: String,
    pub prompt: String,
    /// Scene that spawned the job, if any (used to persist the result)
    pub scene: Option<SceneDescriptor>,
    pub state: JobState,
    submitted_at: Instant,
    pub last_polled_at: Option<Instant>,
}

impl GenerationJob {
    /// Submit a request and construct the job around the returned id.
    ///
    /// Any submit failure — transport, remote error, or an empty id — is
    /// terminal and never retried here.
    pub fn submit(
        service: &dyn MusicService,
        request: &SubmitRequest,
        scene: Option<SceneDescriptor>,
    ) -> Result<Self> {
        let id = service.submit(request)?;
        if id.is_empty() {
            return Err(AriaError::RemoteFailure(
                "service returned an empty job id".to_string(),
            ));
        }
        Ok(Self {
            id,
            prompt: request.prompt.clone(),
            scene,
            state: JobState::Submitted,
            submitted_at: Instant::now(),
            last_polled_at: None,
        })
    }

    /// Time since submission
    pub fn elapsed(&self) -> Duration {
        self.submitted_at.elapsed()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            JobState::Complete | JobState::Failed | JobState::TimedOut
        )
    }

    /// Mark the job timed out if its wall-clock budget is spent
    pub fn check_timeout(&mut self, max_wait: Duration) -> bool {
        if !self.is_terminal() && self.elapsed() >= max_wait {
            self.state = JobState::TimedOut;
            true
        } else {
            false
        }
    }

    /// Poll the service once.
    ///
    /// Transient transport failures leave the job in `Polling` and report
    /// `Pending`; a "not found" response, a remote-reported failure, or a
    /// completion without a result locator are terminal.
    pub fn tick(&mut self, service: &dyn MusicService) -> Result<JobTick> {
        self.state = JobState::Polling;
        self.last_polled_at = Some(Instant::now());

        match service.poll(&self.id) {
            Ok(PollStatus::Processing) => Ok(JobTick::Pending),
            Ok(PollStatus::Complete {
                audio_url: Some(url),
            }) => Ok(JobTick::Ready(url)),
            Ok(PollStatus::Complete { audio_url: None }) => {
                self.state = JobState::Failed;
                Err(AriaError::RemoteFailure(
                    "generation completed without an audio url".to_string(),
                ))
            }
            Ok(PollStatus::Failed(reason)) => {
                self.state = JobState::Failed;
                Err(AriaError::RemoteFailure(reason))
            }
            Err(AriaError::ContractViolation(msg)) => {
                self.state = JobState::Failed;
                Err(AriaError::ContractViolation(msg))
            }
            Err(transient) => {
                eprintln!("Job {}: poll failed, retrying next tick: {}", self.id, transient);
                Ok(JobTick::Pending)
            }
        }
    }

    /// Download the finished artifact. Failures here are terminal.
    pub fn fetch(&mut self, service: &dyn MusicService, audio_url: &str) -> Result<Vec<u8>> {
        match service.download(audio_url) {
            Ok(bytes) => {
                self.state = JobState::Complete;
                Ok(bytes)
            }
            Err(e) => {
                self.state = JobState::Failed;
                Err(e)
            }
        }
    }

    /// Drive the job to a terminal state, sleeping between polls.
    ///
    /// `progress` is called once per tick with the elapsed fraction of the
    /// wait budget, whatever the eventual outcome.
    pub fn run(
        &mut self,
        service: &dyn MusicService,
        config: &PollConfig,
        mut progress: impl FnMut(f32),
    ) -> Result<Vec<u8>> {
        loop {
            if self.elapsed() >= config.max_wait {
                self.state = JobState::TimedOut;
                return Err(AriaError::Timeout(config.max_wait.as_secs_f64()));
            }

            std::thread::sleep(config.interval);
            progress((self.elapsed().as_secs_f32() / config.max_wait.as_secs_f32()).min(1.0));

            match self.tick(service)? {
                JobTick::Pending => continue,
                JobTick::Ready(url) => return self.fetch(service, &url),
            }
        }
    }
}
