//! Rate-limited concurrent batch generation
//!
//! Drives many generation jobs against the service's submission rate limit:
//! admissions are counted against a sliding-reset window, at most
//! `max_concurrent_polls` in-flight jobs are polled per cycle, and completed
//! artifacts are committed to the preset library. A failed or timed-out job
//! counts as done; it is not retried.

use crate::job::{GenerationJob, JobTick, PollConfig};
use crate::service::{MusicService, SubmitRequest};
use aria_core::SceneDescriptor;
use aria_preset::PresetLibrary;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What to do when a submission fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFailurePolicy {
    /// Log and drop the item
    Drop,
    /// Push the item to the back of the queue, up to `max_attempts` tries
    Requeue { max_attempts: u32 },
}

/// Scheduler tuning. The defaults leave headroom under Suno's 20
/// submissions per 10 seconds.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_submissions_per_window: usize,
    pub window: Duration,
    pub max_concurrent_polls: usize,
    pub idle_wait: Duration,
    pub poll: PollConfig,
    pub submit_failure: SubmitFailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_submissions_per_window: 18,
            window: Duration::from_secs(10),
            max_concurrent_polls: 20,
            idle_wait: Duration::from_millis(200),
            poll: PollConfig::default(),
            submit_failure: SubmitFailurePolicy::Drop,
        }
    }
}

/// One queued generation request
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub label: String,
    pub scene: SceneDescriptor,
}

/// Outcome counts for a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub dropped: usize,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} completed, {} failed, {} dropped",
            self.completed, self.total, self.failed, self.dropped
        )
    }
}

struct InFlight {
    item: BatchItem,
    job: GenerationJob,
}

/// Queue-driven scheduler for bulk preset generation
pub struct BatchScheduler {
    service: Arc<dyn MusicService>,
    library: Arc<Mutex<PresetLibrary>>,
    config: BatchConfig,
    pending: VecDeque<(BatchItem, u32)>,
}

impl BatchScheduler {
    pub fn new(
        service: Arc<dyn MusicService>,
        library: Arc<Mutex<PresetLibrary>>,
        config: BatchConfig,
    ) -> Self {
        Self {
            service,
            library,
            config,
            pending: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, item: BatchItem) {
        self.pending.push_back((item, 0));
    }

    pub fn enqueue_scene(&mut self, label: impl Into<String>, scene: SceneDescriptor) {
        self.enqueue(BatchItem {
            label: label.into(),
            scene,
        });
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Run until the queue and the in-flight set are both empty.
    ///
    /// Per-job timeouts guarantee the in-flight set drains even when the
    /// service never answers, so the loop always terminates.
    pub fn run(&mut self) -> BatchReport {
        let mut report = BatchReport {
            total: self.pending.len(),
            ..Default::default()
        };
        let mut in_flight: HashMap<String, InFlight> = HashMap::new();
        let mut window_start = Instant::now();
        let mut sent_in_window = 0usize;

        while !self.pending.is_empty() || !in_flight.is_empty() {
            // window accounting
            if window_start.elapsed() >= self.config.window {
                window_start = Instant::now();
                sent_in_window = 0;
            }

            // admission, bounded by the submission window
            while sent_in_window < self.config.max_submissions_per_window {
                let Some((item, attempts)) = self.pending.pop_front() else {
                    break;
                };
                let request = SubmitRequest::new(item.scene.style_prompt());

                match GenerationJob::submit(
                    self.service.as_ref(),
                    &request,
                    Some(item.scene.clone()),
                ) {
                    Ok(job) => {
                        sent_in_window += 1;
                        in_flight.insert(job.id.clone(), InFlight { item, job });
                    }
                    Err(e) => match self.config.submit_failure {
                        SubmitFailurePolicy::Drop => {
                            eprintln!("Submit failed for {}: {} (dropped)", item.label, e);
                            report.dropped += 1;
                        }
                        SubmitFailurePolicy::Requeue { max_attempts } => {
                            if attempts + 1 < max_attempts {
                                self.pending.push_back((item, attempts + 1));
                            } else {
                                eprintln!(
                                    "Submit failed for {} after {} attempts: {} (dropped)",
                                    item.label,
                                    attempts + 1,
                                    e
                                );
                                report.dropped += 1;
                            }
                        }
                    },
                }
            }

            // poll a bounded slice of the in-flight jobs
            let ids: Vec<String> = in_flight
                .keys()
                .take(self.config.max_concurrent_polls)
                .cloned()
                .collect();
            for id in ids {
                let finished = match in_flight.get_mut(&id) {
                    Some(entry) => self.step(entry),
                    None => continue,
                };
                if let Some(success) = finished {
                    in_flight.remove(&id);
                    if success {
                        report.completed += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }

            std::thread::sleep(self.config.idle_wait);
        }

        report
    }

    /// Advance one in-flight job; `Some(success)` when it reached a
    /// terminal state.
    fn step(&self, entry: &mut InFlight) -> Option<bool> {
        if entry.job.check_timeout(self.config.poll.max_wait) {
            eprintln!("{}: generation timed out", entry.item.label);
            return Some(false);
        }

        match entry.job.tick(self.service.as_ref()) {
            Ok(JobTick::Pending) => None,
            Ok(JobTick::Ready(url)) => match entry.job.fetch(self.service.as_ref(), &url) {
                Ok(bytes) => {
                    let mut library = self.library.lock().expect("preset library lock poisoned");
                    let preset = library.create_entry(&entry.item.scene, Arc::new(bytes));
                    println!("{}: preset {}", entry.item.label, preset.id);
                    Some(true)
                }
                Err(e) => {
                    eprintln!("{}: download failed: {}", entry.item.label, e);
                    Some(false)
                }
            },
            Err(e) => {
                eprintln!("{}: generation failed: {}", entry.item.label, e);
                Some(false)
            }
        }
    }
}
