//! The preset library
//!
//! Holds every known (scene, artifact) pairing, scores candidates against a
//! live scene, and owns the dedup rules for committing freshly generated
//! artifacts. Persistence failures never roll back in-memory state; they are
//! reported as warnings so gameplay keeps running.

use crate::entry::{preset_id, preset_name, PresetEntry};
use crate::similarity::similarity;
use crate::store::{safe_file_name, PresetStore};
use aria_core::{now_iso8601, AriaError, Result, SceneDescriptor};
use std::fmt;
use std::sync::Arc;

/// Best-effort, in-process library notifications
pub enum LibraryEvent<'a> {
    PresetSelected(&'a PresetEntry),
    PresetGenerated(&'a PresetEntry),
}

pub type EventSink = Box<dyn for<'a> Fn(LibraryEvent<'a>) + Send>;

/// Library of music presets backed by a durable store
pub struct PresetLibrary {
    entries: Vec<PresetEntry>,
    store: PresetStore,
    /// Minimum similarity score for a direct match
    pub similarity_threshold: f32,
    event_sink: Option<EventSink>,
}

/// Summary counts for the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub total: usize,
    pub generated: usize,
    pub resolvable: usize,
}

impl fmt::Display for LibraryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} presets, {} generated, {} resolvable",
            self.total, self.generated, self.resolvable
        )
    }
}

impl PresetLibrary {
    /// Create an empty library over the given store
    pub fn new(store: PresetStore) -> Self {
        Self {
            entries: Vec::new(),
            store,
            similarity_threshold: 0.8,
            event_sink: None,
        }
    }

    /// Load a library from its store
    pub fn load(store: PresetStore) -> Result<Self> {
        let entries = store.load_all()?;
        Ok(Self {
            entries,
            store,
            similarity_threshold: 0.8,
            event_sink: None,
        })
    }

    /// Install a notification sink (fire-and-forget, in-process)
    pub fn set_event_sink(&mut self, sink: EventSink) {
        self.event_sink = Some(sink);
    }

    pub fn entries(&self) -> &[PresetEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&PresetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick the preset that best matches the scene.
    ///
    /// Entries without a loaded or loadable artifact are skipped. When the
    /// best similarity score clears the threshold that entry wins; otherwise
    /// the entry whose recorded intensity is numerically closest to the
    /// scene's wins. Returns `None` for an empty or unresolvable library.
    pub fn select_best(&self, scene: &SceneDescriptor) -> Option<&PresetEntry> {
        let mut best: Option<&PresetEntry> = None;
        let mut best_score = 0.0f32;

        for entry in self.entries.iter().filter(|e| e.is_resolvable()) {
            let score = similarity(scene, &entry.scene);
            if score > best_score {
                best_score = score;
                best = Some(entry);
            }
        }

        let selected = match best {
            Some(entry) if best_score >= self.similarity_threshold => Some(entry),
            _ => self.closest_intensity(scene.intensity()),
        };

        if let Some(entry) = selected {
            self.emit(LibraryEvent::PresetSelected(entry));
        }
        selected
    }

    fn closest_intensity(&self, target: f32) -> Option<&PresetEntry> {
        let mut closest = None;
        let mut min_diff = f32::MAX;
        for entry in self.entries.iter().filter(|e| e.is_resolvable()) {
            let diff = (entry.intensity - target).abs();
            if diff < min_diff {
                min_diff = diff;
                closest = Some(entry);
            }
        }
        closest
    }

    /// Commit a generated artifact as a preset.
    ///
    /// Scenes bucket by `preset_id`; an existing id returns the existing
    /// entry without a second artifact write (backfilling the audio file if
    /// an earlier write failed or was skipped). Durable-write failures keep
    /// the in-memory entry and log a warning.
    pub fn create_entry(&mut self, scene: &SceneDescriptor, track: Arc<Vec<u8>>) -> &PresetEntry {
        let id = preset_id(scene);
        let file_name = format!("{}.mp3", safe_file_name(&id));

        if let Some(idx) = self.entries.iter().position(|e| e.id == id) {
            if self.entries[idx].audio_file.is_none() {
                match self.store.write_artifact(&file_name, &track) {
                    Ok(_) => {
                        self.entries[idx].audio_file = Some(file_name);
                        if let Err(e) = self.save_all() {
                            eprintln!("Warning: failed to save preset index: {}", e);
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to write audio for {}: {}", id, e),
                }
                self.entries[idx].track = Some(track);
            }
            return &self.entries[idx];
        }

        let audio_file = match self.store.write_artifact(&file_name, &track) {
            Ok(_) => Some(file_name),
            Err(e) => {
                eprintln!("Warning: failed to write audio for {}: {}", id, e);
                None
            }
        };

        self.entries.push(PresetEntry {
            id,
            name: preset_name(scene),
            audio_file,
            intensity: scene.intensity(),
            description: scene.style_prompt(),
            generated: true,
            created_at: now_iso8601(),
            scene: scene.clone(),
            track: Some(track),
        });
        if let Err(e) = self.save_all() {
            eprintln!("Warning: failed to save preset index: {}", e);
        }

        let entry = &self.entries[self.entries.len() - 1];
        self.emit(LibraryEvent::PresetGenerated(entry));
        entry
    }

    /// Load an entry's artifact from the store if it is not in memory yet
    pub fn resolve_artifact(&mut self, id: &str) -> Result<Arc<Vec<u8>>> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AriaError::PresetError(format!("Unknown preset: {}", id)))?;

        if self.entries[idx].track.is_none() {
            let file_name = self.entries[idx].audio_file.clone().ok_or_else(|| {
                AriaError::PresetError(format!("Preset {} has no audio file", id))
            })?;
            let bytes = self.store.read_artifact(&file_name)?;
            self.entries[idx].track = Some(Arc::new(bytes));
        }

        Ok(self.entries[idx]
            .track
            .clone()
            .expect("track resolved above"))
    }

    /// Persist the full entry set
    pub fn save_all(&self) -> Result<()> {
        self.store.save_all(&self.entries)
    }

    /// Empty the library and persist the empty state
    pub fn clear_all(&mut self) -> Result<()> {
        self.entries.clear();
        self.save_all()
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            total: self.entries.len(),
            generated: self.entries.iter().filter(|e| e.generated).count(),
            resolvable: self.entries.iter().filter(|e| e.is_resolvable()).count(),
        }
    }

    fn emit(&self, event: LibraryEvent<'_>) {
        if let Some(sink) = &self.event_sink {
            sink(event);
        }
    }
}
