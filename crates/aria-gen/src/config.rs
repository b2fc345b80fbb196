//! Layered configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `ARIA_SUNO_API_KEY`, `ARIA_SUNO_API_URL`
//! 2. Project-local: `.aria/config.toml`
//! 3. Global: `~/.aria/config.toml`

use crate::job::PollConfig;
use aria_core::{AriaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Synthesis service credentials and endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub custom_mode: bool,
    #[serde(default)]
    pub instrumental: bool,
    #[serde(default)]
    pub callback_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: f64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_true")]
    pub auto_save_generated: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            custom_mode: false,
            instrumental: false,
            callback_url: String::new(),
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
            cache_capacity: default_cache_capacity(),
            similarity_threshold: default_similarity_threshold(),
            auto_save_generated: true,
        }
    }
}

fn default_model() -> String {
    "V3_5".to_string()
}
fn default_poll_interval() -> f64 {
    2.0
}
fn default_max_wait() -> f64 {
    300.0
}
fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CACHE_CAPACITY
}
fn default_similarity_threshold() -> f32 {
    0.8
}
fn default_true() -> bool {
    true
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AriaConfigFile {
    #[serde(default)]
    service: ServiceConfig,
    #[serde(default)]
    generation: Option<GenerationSettings>,
}

/// Resolved configuration with all layers applied
#[derive(Debug, Clone, Default)]
pub struct AriaConfig {
    pub service: ServiceConfig,
    pub generation: GenerationSettings,
}

impl AriaConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut file = AriaConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                Self::merge_into(&mut file, Self::load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".aria/config.toml");
        if local_path.exists() {
            Self::merge_into(&mut file, Self::load_file(&local_path)?);
        }

        Self::apply_env_overrides(&mut file);
        Ok(Self::resolve(file))
    }

    /// Load config from a specific file only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut file = Self::load_file(path)?;
        Self::apply_env_overrides(&mut file);
        Ok(Self::resolve(file))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.service.api_key.as_deref()
    }

    pub fn api_url(&self) -> Option<&str> {
        self.service.api_url.as_deref()
    }

    /// Poll pacing from the configured interval and wait budget
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs_f64(self.generation.poll_interval_secs),
            max_wait: Duration::from_secs_f64(self.generation.max_wait_secs),
        }
    }

    fn resolve(file: AriaConfigFile) -> Self {
        Self {
            service: file.service,
            generation: file.generation.unwrap_or_default(),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".aria").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<AriaConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let file: AriaConfigFile = toml::from_str(&content).map_err(|e| {
            AriaError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(file)
    }

    fn merge_into(base: &mut AriaConfigFile, overlay: AriaConfigFile) {
        if overlay.service.api_key.is_some() {
            base.service.api_key = overlay.service.api_key;
        }
        if overlay.service.api_url.is_some() {
            base.service.api_url = overlay.service.api_url;
        }
        if overlay.generation.is_some() {
            base.generation = overlay.generation;
        }
    }

    fn apply_env_overrides(file: &mut AriaConfigFile) {
        if let Ok(key) = std::env::var("ARIA_SUNO_API_KEY") {
            file.service.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("ARIA_SUNO_API_URL") {
            file.service.api_url = Some(url);
        }
    }
}
