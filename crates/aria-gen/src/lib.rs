//! Aria Gen - Music generation pipeline
//!
//! Drives the external synthesis service through a submit/poll/download job
//! state machine, with a bounded FIFO track cache, a rate-limited batch
//! scheduler for bulk preset generation, and a director that picks presets
//! before spending a generation.

pub mod batch;
pub mod cache;
pub mod config;
pub mod director;
pub mod job;
pub mod mock;
pub mod service;
pub mod suno;

pub use batch::{BatchConfig, BatchItem, BatchReport, BatchScheduler, SubmitFailurePolicy};
pub use cache::{cache_key, TrackCache, DEFAULT_CACHE_CAPACITY};
pub use config::{AriaConfig, GenerationSettings, ServiceConfig};
pub use director::{DirectorConfig, JobEvent, JobHandle, MusicDirector, MusicSelection};
pub use job::{GenerationJob, JobState, JobTick, PollConfig};
pub use mock::{silence_wav, MockService};
pub use service::{create_service, MusicService, PollStatus, SubmitRequest};
pub use suno::SunoService;
