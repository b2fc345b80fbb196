//! Preset entry types

use aria_core::SceneDescriptor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A named, persisted pairing of a scene descriptor and a music artifact.
///
/// The artifact itself lives on disk under the store's audio directory;
/// `track` is a lazily-resolved in-memory copy and is never persisted.
/// The `scene` table is kept last so scalar fields serialize ahead of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub audio_file: Option<String>,
    /// Snapshot of `scene.intensity()` taken at creation time
    pub intensity: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub created_at: String,
    pub scene: SceneDescriptor,
    #[serde(skip)]
    pub track: Option<Arc<Vec<u8>>>,
}

impl PresetEntry {
    /// Whether this entry's artifact is loaded or loadable
    pub fn is_resolvable(&self) -> bool {
        self.track.is_some() || self.audio_file.is_some()
    }
}

/// Deterministic preset id from the scene's discretized fields.
///
/// Near-identical scenes bucket to the same id on purpose: a minor threat
/// variation should reuse the existing preset, not mint a new artifact.
pub fn preset_id(scene: &SceneDescriptor) -> String {
    format!(
        "preset_{}_{}_{}_{}_{}_{}",
        scene.environment,
        scene.current_action,
        scene.enemy_presence,
        scene.game_level,
        scene.time_of_day,
        (scene.threat_level * 10.0).round() as i32
    )
}

/// Human-readable preset name
pub fn preset_name(scene: &SceneDescriptor) -> String {
    format!(
        "{} - {} - {}",
        scene.environment, scene.current_action, scene.enemy_presence
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_core::{Action, EnemyPresence, Environment, GameLevel, TimeOfDay};

    fn combat_scene() -> SceneDescriptor {
        SceneDescriptor {
            environment: Environment::DarkDungeon,
            current_action: Action::Combat,
            enemy_presence: EnemyPresence::Many,
            game_level: GameLevel::Mid,
            time_of_day: TimeOfDay::Night,
            threat_level: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_preset_id_buckets_threat() {
        let mut a = combat_scene();
        let mut b = combat_scene();
        a.threat_level = 0.81;
        b.threat_level = 0.79;
        assert_eq!(preset_id(&a), preset_id(&b));

        b.threat_level = 0.3;
        assert_ne!(preset_id(&a), preset_id(&b));
    }

    #[test]
    fn test_preset_id_ignores_continuous_noise() {
        let mut a = combat_scene();
        let mut b = combat_scene();
        a.action_intensity = 0.2;
        b.action_intensity = 0.9;
        b.enemy_count = 7;
        b.player_health = 0.4;
        assert_eq!(preset_id(&a), preset_id(&b));
    }

    #[test]
    fn test_preset_id_format() {
        assert_eq!(
            preset_id(&combat_scene()),
            "preset_dark_dungeon_combat_many_mid_night_8"
        );
    }

    #[test]
    fn test_preset_name() {
        assert_eq!(preset_name(&combat_scene()), "dark_dungeon - combat - many");
    }

    #[test]
    fn test_resolvable() {
        let mut entry = PresetEntry {
            id: "p".to_string(),
            name: "p".to_string(),
            audio_file: None,
            intensity: 0.5,
            description: String::new(),
            generated: false,
            created_at: String::new(),
            scene: SceneDescriptor::default(),
            track: None,
        };
        assert!(!entry.is_resolvable());
        entry.audio_file = Some("p.mp3".to_string());
        assert!(entry.is_resolvable());
        entry.audio_file = None;
        entry.track = Some(Arc::new(vec![1, 2, 3]));
        assert!(entry.is_resolvable());
    }
}
