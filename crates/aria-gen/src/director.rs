//! Select-or-generate orchestration
//!
//! The director is the front door for gameplay: given a scene it returns a
//! matching preset immediately, or starts one generation job and hands back
//! a result channel. One job at a time per director; bulk work goes through
//! `BatchScheduler` instead.

use crate::cache::{cache_key, TrackCache, DEFAULT_CACHE_CAPACITY};
use crate::config::AriaConfig;
use crate::job::{GenerationJob, PollConfig};
use crate::service::{MusicService, SubmitRequest};
use aria_core::{AriaError, Result, SceneDescriptor};
use aria_preset::{PresetEntry, PresetLibrary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

/// Per-job notifications delivered over the job's own channel
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Elapsed fraction of the wait budget, reported every poll tick
    Progress(f32),
    /// The finished track; exactly one terminal event fires per job
    Complete(Arc<Vec<u8>>),
    Failed(String),
}

/// Handle to an in-flight generation job
#[derive(Debug)]
pub struct JobHandle {
    events: mpsc::Receiver<JobEvent>,
    join: Option<JoinHandle<()>>,
}

impl JobHandle {
    /// The event stream for this job. Dropping the handle abandons the job;
    /// its outcome is then simply ignored.
    pub fn events(&self) -> &mpsc::Receiver<JobEvent> {
        &self.events
    }

    /// Block until the job's terminal event and return the track
    pub fn wait(mut self) -> Result<Arc<Vec<u8>>> {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                JobEvent::Progress(_) => {}
                JobEvent::Complete(track) => {
                    outcome = Some(Ok(track));
                    break;
                }
                JobEvent::Failed(reason) => {
                    outcome = Some(Err(AriaError::RemoteFailure(reason)));
                    break;
                }
            }
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
        outcome.unwrap_or_else(|| {
            Err(AriaError::RemoteFailure(
                "job ended without a result".to_string(),
            ))
        })
    }
}

/// What a music request resolved to
#[derive(Debug)]
pub enum MusicSelection {
    /// An existing preset matched the scene
    Preset {
        entry: PresetEntry,
        track: Arc<Vec<u8>>,
    },
    /// A previously generated track was cached under this key
    Cached { key: String, track: Arc<Vec<u8>> },
    /// A generation job was started; listen on the handle
    Generating(JobHandle),
}

/// Director tuning
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    pub poll: PollConfig,
    pub cache_capacity: usize,
    /// Persist completed scene jobs as presets
    pub auto_save_generated: bool,
    pub model: String,
    pub custom_mode: bool,
    pub instrumental: bool,
    pub callback_url: String,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            auto_save_generated: true,
            model: "V3_5".to_string(),
            custom_mode: false,
            instrumental: false,
            callback_url: String::new(),
        }
    }
}

impl From<&AriaConfig> for DirectorConfig {
    fn from(config: &AriaConfig) -> Self {
        Self {
            poll: config.poll_config(),
            cache_capacity: config.generation.cache_capacity,
            auto_save_generated: config.generation.auto_save_generated,
            model: config.generation.model.clone(),
            custom_mode: config.generation.custom_mode,
            instrumental: config.generation.instrumental,
            callback_url: config.generation.callback_url.clone(),
        }
    }
}

/// Orchestrates preset selection, caching, and generation
pub struct MusicDirector {
    service: Arc<dyn MusicService>,
    cache: Arc<Mutex<TrackCache>>,
    library: Arc<Mutex<PresetLibrary>>,
    config: DirectorConfig,
    generating: Arc<AtomicBool>,
}

impl MusicDirector {
    pub fn new(
        service: Arc<dyn MusicService>,
        library: PresetLibrary,
        config: DirectorConfig,
    ) -> Self {
        let cache = Arc::new(Mutex::new(TrackCache::new(config.cache_capacity)));
        Self {
            service,
            cache,
            library: Arc::new(Mutex::new(library)),
            config,
            generating: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the preset library
    pub fn library(&self) -> Arc<Mutex<PresetLibrary>> {
        self.library.clone()
    }

    /// Shared handle to the track cache
    pub fn cache(&self) -> Arc<Mutex<TrackCache>> {
        self.cache.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Music for a scene: best preset first, generation as the fallback.
    ///
    /// A preset that fails to load falls through to generation rather than
    /// failing the request.
    pub fn music_for_scene(&self, scene: &SceneDescriptor) -> Result<MusicSelection> {
        {
            let mut library = self.library.lock().expect("preset library lock poisoned");
            let selected = library.select_best(scene).map(|e| e.id.clone());
            if let Some(id) = selected {
                match library.resolve_artifact(&id) {
                    Ok(track) => {
                        if let Some(entry) = library.get(&id) {
                            return Ok(MusicSelection::Preset {
                                entry: entry.clone(),
                                track,
                            });
                        }
                    }
                    Err(e) => {
                        eprintln!("Preset {} failed to load, generating instead: {}", id, e)
                    }
                }
            }
        }

        self.start_job(scene.style_prompt(), Some(scene.clone()), None)
    }

    /// Music for a named zone: cached track first, generation on a miss.
    /// The cache key is derived from the zone label and prompt.
    pub fn music_for_zone(&self, zone: &str, prompt: &str) -> Result<MusicSelection> {
        let key = cache_key(zone, prompt);
        if let Some(track) = self
            .cache
            .lock()
            .expect("track cache lock poisoned")
            .get(&key)
        {
            return Ok(MusicSelection::Cached { key, track });
        }

        self.start_job(prompt.to_string(), None, Some(key))
    }

    fn start_job(
        &self,
        prompt: String,
        scene: Option<SceneDescriptor>,
        cache_key: Option<String>,
    ) -> Result<MusicSelection> {
        // single-flight guard: one outstanding job per director
        if self.generating.swap(true, Ordering::SeqCst) {
            return Err(AriaError::JobInFlight);
        }

        let (tx, rx) = mpsc::channel();
        let service = self.service.clone();
        let cache = self.cache.clone();
        let library = self.library.clone();
        let config = self.config.clone();
        let guard = self.generating.clone();

        let join = std::thread::spawn(move || {
            let request = SubmitRequest {
                prompt,
                model: config.model,
                custom_mode: config.custom_mode,
                instrumental: config.instrumental,
                callback_url: config.callback_url,
            };

            let progress_tx = tx.clone();
            let result = GenerationJob::submit(service.as_ref(), &request, scene.clone())
                .and_then(|mut job| {
                    let bytes = job.run(service.as_ref(), &config.poll, |fraction| {
                        let _ = progress_tx.send(JobEvent::Progress(fraction));
                    })?;
                    Ok((job, bytes))
                });

            match result {
                Ok((job, bytes)) => {
                    let track = Arc::new(bytes);
                    // completions key by the zone context when one was given,
                    // else by the job id
                    let key = cache_key.unwrap_or_else(|| format!("job_{}", job.id));
                    cache
                        .lock()
                        .expect("track cache lock poisoned")
                        .put(key, track.clone());

                    if config.auto_save_generated {
                        if let Some(scene) = &scene {
                            library
                                .lock()
                                .expect("preset library lock poisoned")
                                .create_entry(scene, track.clone());
                        }
                    }

                    let _ = tx.send(JobEvent::Complete(track));
                }
                Err(e) => {
                    let _ = tx.send(JobEvent::Failed(e.to_string()));
                }
            }

            guard.store(false, Ordering::SeqCst);
        });

        Ok(MusicSelection::Generating(JobHandle {
            events: rx,
            join: Some(join),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockService;
    use aria_core::{Action, Environment};
    use aria_preset::PresetStore;
    use std::path::PathBuf;
    use std::time::Duration;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("aria_director_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn fast_director(dir: &PathBuf, service: Arc<dyn MusicService>) -> MusicDirector {
        let library = PresetLibrary::new(PresetStore::new(dir));
        let config = DirectorConfig {
            poll: PollConfig {
                interval: Duration::from_millis(1),
                max_wait: Duration::from_secs(5),
            },
            ..Default::default()
        };
        MusicDirector::new(service, library, config)
    }

    fn forest_scene() -> SceneDescriptor {
        SceneDescriptor {
            environment: Environment::Forest,
            current_action: Action::Walking,
            threat_level: 0.2,
            ..Default::default()
        }
    }

    #[test]
    fn test_scene_with_matching_preset_skips_generation() {
        let dir = temp_dir();
        let service = Arc::new(MockService::new());
        let director = fast_director(&dir, service.clone());

        director
            .library()
            .lock()
            .unwrap()
            .create_entry(&forest_scene(), Arc::new(vec![1u8; 16]));

        match director.music_for_scene(&forest_scene()).unwrap() {
            MusicSelection::Preset { entry, track } => {
                assert_eq!(entry.scene.environment, Environment::Forest);
                assert_eq!(*track, vec![1u8; 16]);
            }
            _ => panic!("expected a preset match"),
        }
        // nothing was submitted
        assert_eq!(service.submission_count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_scene_without_preset_generates_and_saves() {
        let dir = temp_dir();
        let service = Arc::new(MockService::with_polls(1).with_artifact(vec![7u8; 32]));
        let director = fast_director(&dir, service);

        let handle = match director.music_for_scene(&forest_scene()).unwrap() {
            MusicSelection::Generating(handle) => handle,
            _ => panic!("expected generation on an empty library"),
        };

        let track = handle.wait().unwrap();
        assert_eq!(*track, vec![7u8; 32]);

        // auto-saved as a preset and cached under the job key
        assert_eq!(director.library().lock().unwrap().len(), 1);
        assert_eq!(director.cache().lock().unwrap().len(), 1);
        assert!(!director.is_generating());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zone_cache_hit_and_miss() {
        let dir = temp_dir();
        let service = Arc::new(MockService::new().with_artifact(vec![9u8; 8]));
        let director = fast_director(&dir, service);

        // miss: generates, keyed by zone + prompt
        let handle = match director.music_for_zone("zone_cave", "dark cave echoes").unwrap() {
            MusicSelection::Generating(handle) => handle,
            _ => panic!("expected a cache miss"),
        };
        handle.wait().unwrap();

        // hit: same zone and prompt come straight from the cache
        match director.music_for_zone("zone_cave", "dark cave echoes").unwrap() {
            MusicSelection::Cached { key, track } => {
                assert_eq!(key, cache_key("zone_cave", "dark cave echoes"));
                assert_eq!(*track, vec![9u8; 8]);
            }
            _ => panic!("expected a cache hit"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_single_flight_guard() {
        let dir = temp_dir();
        // enough polls that the first job is still running
        let service = Arc::new(MockService::with_polls(50));
        let director = fast_director(&dir, service);

        let first = director.music_for_scene(&forest_scene()).unwrap();
        let err = director
            .music_for_zone("zone_a", "anything")
            .unwrap_err();
        assert!(matches!(err, AriaError::JobInFlight));

        match first {
            MusicSelection::Generating(handle) => {
                handle.wait().unwrap();
            }
            _ => panic!("expected generation"),
        }
        assert!(!director.is_generating());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_progress_then_exactly_one_terminal_event() {
        let dir = temp_dir();
        let service = Arc::new(MockService::with_polls(3));
        let director = fast_director(&dir, service);

        let handle = match director.music_for_scene(&forest_scene()).unwrap() {
            MusicSelection::Generating(handle) => handle,
            _ => panic!("expected generation"),
        };

        let mut progress = 0;
        let mut terminal = 0;
        for event in handle.events().iter() {
            match event {
                JobEvent::Progress(f) => {
                    assert!(f > 0.0 && f <= 1.0);
                    progress += 1;
                }
                JobEvent::Complete(_) | JobEvent::Failed(_) => terminal += 1,
            }
        }
        assert!(progress >= 1);
        assert_eq!(terminal, 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failure_reported_through_channel() {
        struct BrokenSubmit;
        impl MusicService for BrokenSubmit {
            fn name(&self) -> &str {
                "broken"
            }
            fn submit(&self, _request: &SubmitRequest) -> aria_core::Result<String> {
                Err(AriaError::TransportError("boom".to_string()))
            }
            fn poll(&self, _job_id: &str) -> aria_core::Result<crate::service::PollStatus> {
                unreachable!()
            }
            fn download(&self, _audio_url: &str) -> aria_core::Result<Vec<u8>> {
                unreachable!()
            }
        }

        let dir = temp_dir();
        let director = fast_director(&dir, Arc::new(BrokenSubmit));

        let handle = match director.music_for_scene(&forest_scene()).unwrap() {
            MusicSelection::Generating(handle) => handle,
            _ => panic!("expected generation"),
        };
        let err = handle.wait().unwrap_err();
        assert!(matches!(err, AriaError::RemoteFailure(_)));
        // guard released after failure, a new request may start
        assert!(!director.is_generating());
        std::fs::remove_dir_all(&dir).ok();
    }
}
