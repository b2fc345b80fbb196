//! Scene descriptors
//!
//! A `SceneDescriptor` is an immutable snapshot of the gameplay state that
//! matters for music selection. The game pushes one per query; this crate
//! never inspects the world itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad environment the player is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Grasslands,
    Forest,
    DarkDungeon,
    Urban,
    Ocean,
    Mountain,
    Desert,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Day,
    Night,
    Dawn,
    Dusk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    Snow,
    Storm,
    Fog,
}

/// What the player is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Walking,
    Running,
    Combat,
    Stealth,
    Flying,
    Swimming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyPresence {
    None,
    Few,
    Many,
    Boss,
    Lurking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameLevel {
    Tutorial,
    Early,
    Mid,
    Late,
    FinalBoss,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Environment::Grasslands => "grasslands",
            Environment::Forest => "forest",
            Environment::DarkDungeon => "dark_dungeon",
            Environment::Urban => "urban",
            Environment::Ocean => "ocean",
            Environment::Mountain => "mountain",
            Environment::Desert => "desert",
            Environment::Snow => "snow",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Night => "night",
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Dusk => "dusk",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Walking => "walking",
            Action::Running => "running",
            Action::Combat => "combat",
            Action::Stealth => "stealth",
            Action::Flying => "flying",
            Action::Swimming => "swimming",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for EnemyPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnemyPresence::None => "none",
            EnemyPresence::Few => "few",
            EnemyPresence::Many => "many",
            EnemyPresence::Boss => "boss",
            EnemyPresence::Lurking => "lurking",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GameLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameLevel::Tutorial => "tutorial",
            GameLevel::Early => "early",
            GameLevel::Mid => "mid",
            GameLevel::Late => "late",
            GameLevel::FinalBoss => "final_boss",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of gameplay state used to select or generate matching music.
///
/// Value type: identity is content, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescriptor {
    pub environment: Environment,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub current_action: Action,
    /// 0-1 action intensity
    pub action_intensity: f32,
    pub is_stealth: bool,
    pub enemy_presence: EnemyPresence,
    pub enemy_count: u32,
    /// 0-1 threat level
    pub threat_level: f32,
    pub game_level: GameLevel,
    /// 0-1 player health
    pub player_health: f32,
    pub is_boss_fight: bool,
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self {
            environment: Environment::Grasslands,
            time_of_day: TimeOfDay::Day,
            weather: Weather::Clear,
            current_action: Action::Walking,
            action_intensity: 0.5,
            is_stealth: false,
            enemy_presence: EnemyPresence::None,
            enemy_count: 0,
            threat_level: 0.0,
            game_level: GameLevel::Tutorial,
            player_health: 1.0,
            is_boss_fight: false,
        }
    }
}

impl SceneDescriptor {
    /// Overall intensity of the scene, used for music selection.
    ///
    /// Weighted sum of action intensity (0.3), threat level (0.4), enemy
    /// count capped at 10 (0.2), boss fight (0.3), and missing health (0.1),
    /// clamped to [0, 1].
    pub fn intensity(&self) -> f32 {
        let mut intensity = self.action_intensity * 0.3;
        intensity += self.threat_level * 0.4;
        intensity += (self.enemy_count as f32 / 10.0).min(1.0) * 0.2;
        if self.is_boss_fight {
            intensity += 0.3;
        }
        intensity += (1.0 - self.player_health) * 0.1;
        intensity.clamp(0.0, 1.0)
    }

    /// Stable identifier for this kind of scene (ignores continuous fields)
    pub fn scene_key(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.environment,
            self.current_action,
            self.enemy_presence,
            self.game_level,
            self.time_of_day
        )
    }

    /// Natural-language prompt describing the music this scene calls for
    pub fn style_prompt(&self) -> String {
        format!(
            "{} {} {} {}",
            self.environment.music_description(),
            self.current_action.music_description(),
            threat_description(self.threat_level),
            self.time_of_day.music_description()
        )
    }
}

impl Environment {
    fn music_description(&self) -> &'static str {
        match self {
            Environment::Grasslands => "peaceful grasslands",
            Environment::Forest => "mysterious forest",
            Environment::DarkDungeon => "dark dungeon",
            Environment::Urban => "urban city",
            Environment::Ocean => "ocean beach",
            Environment::Mountain => "mountain peaks",
            Environment::Desert => "hot desert",
            Environment::Snow => "frozen snow",
        }
    }
}

impl Action {
    fn music_description(&self) -> &'static str {
        match self {
            Action::Walking => "exploration",
            Action::Running => "fast-paced",
            Action::Combat => "intense combat",
            Action::Stealth => "stealth",
            Action::Flying => "aerial",
            Action::Swimming => "underwater",
        }
    }
}

impl TimeOfDay {
    fn music_description(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "daytime",
            TimeOfDay::Night => "nighttime",
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Dusk => "dusk",
        }
    }
}

fn threat_description(threat_level: f32) -> &'static str {
    if threat_level > 0.7 {
        "high tension"
    } else if threat_level > 0.3 {
        "moderate tension"
    } else {
        "relaxed"
    }
}
