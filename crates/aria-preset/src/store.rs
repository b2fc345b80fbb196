//! Durable preset storage
//!
//! Presets persist as a single `presets.toml` document under the store root;
//! artifact bytes live as named files in an `audio/` subdirectory so the
//! index stays small and artifacts load lazily.

use crate::entry::PresetEntry;
use aria_core::{AriaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PRESET_FILE: &str = "presets.toml";
const AUDIO_DIR: &str = "audio";

/// File-backed preset store
pub struct PresetStore {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct PresetFile {
    presets: Vec<PresetEntry>,
}

impl PresetStore {
    /// Create a store rooted at the given directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default store location
    pub fn default_store() -> Self {
        Self::new(".aria/presets")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist the full entry set (artifacts are not written here)
    pub fn save_all(&self, entries: &[PresetEntry]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let file = PresetFile {
            presets: entries.to_vec(),
        };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| AriaError::PresetError(format!("Failed to serialize presets: {}", e)))?;
        fs::write(self.root.join(PRESET_FILE), content)?;
        Ok(())
    }

    /// Load all entries; a missing index file is an empty library
    pub fn load_all(&self) -> Result<Vec<PresetEntry>> {
        let path = self.root.join(PRESET_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        let file: PresetFile = toml::from_str(&content)
            .map_err(|e| AriaError::PresetError(format!("Failed to parse presets: {}", e)))?;
        Ok(file.presets)
    }

    /// Write artifact bytes under the audio directory, returning the path
    pub fn write_artifact(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(AUDIO_DIR);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Read artifact bytes by file name
    pub fn read_artifact(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(AUDIO_DIR).join(file_name);
        if !path.exists() {
            return Err(AriaError::PresetError(format!(
                "Audio file not found: {}",
                path.display()
            )));
        }
        Ok(fs::read(&path)?)
    }
}

/// Replace path-hostile characters so preset ids are usable as file names
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{preset_id, preset_name};
    use aria_core::SceneDescriptor;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aria_store_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_entry() -> PresetEntry {
        let scene = SceneDescriptor::default();
        PresetEntry {
            id: preset_id(&scene),
            name: preset_name(&scene),
            audio_file: Some("calm.mp3".to_string()),
            intensity: scene.intensity(),
            description: scene.style_prompt(),
            generated: true,
            created_at: aria_core::now_iso8601(),
            scene,
            track: None,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = temp_dir();
        let store = PresetStore::new(&dir);

        let entry = sample_entry();
        store.save_all(&[entry.clone()]).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, entry.id);
        assert_eq!(loaded[0].scene, entry.scene);
        assert_eq!(loaded[0].audio_file.as_deref(), Some("calm.mp3"));
        // in-memory artifact is never persisted
        assert!(loaded[0].track.is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_index_is_empty() {
        let dir = temp_dir();
        let store = PresetStore::new(dir.join("nowhere"));
        assert!(store.load_all().unwrap().is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dir = temp_dir();
        let store = PresetStore::new(&dir);

        store.write_artifact("track.mp3", b"not really mp3").unwrap();
        let bytes = store.read_artifact("track.mp3").unwrap();
        assert_eq!(bytes, b"not really mp3");

        assert!(store.read_artifact("missing.mp3").is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("preset_forest_walking_0"), "preset_forest_walking_0");
        assert_eq!(safe_file_name("a/b\\c:d e"), "a_b_c_d_e");
    }
}
