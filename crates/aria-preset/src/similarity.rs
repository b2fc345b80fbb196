//! Scene similarity scoring
//!
//! Weighted comparison of two scene descriptors, used to pick the preset
//! that best matches a live scene.

use aria_core::SceneDescriptor;

const ENVIRONMENT_WEIGHT: f32 = 0.30;
const ACTION_WEIGHT: f32 = 0.25;
const THREAT_WEIGHT: f32 = 0.20;
const INTENSITY_WEIGHT: f32 = 0.15;
const TIME_WEIGHT: f32 = 0.10;

/// Score how closely two scenes match, in [0, 1].
///
/// The result is normalized by the total weight applied, so adding or
/// removing factors keeps the range stable.
pub fn similarity(a: &SceneDescriptor, b: &SceneDescriptor) -> f32 {
    let mut score = 0.0;
    let mut total_weight = 0.0;

    let env_score = if a.environment == b.environment { 1.0 } else { 0.0 };
    score += env_score * ENVIRONMENT_WEIGHT;
    total_weight += ENVIRONMENT_WEIGHT;

    let action_score = if a.current_action == b.current_action { 1.0 } else { 0.0 };
    score += action_score * ACTION_WEIGHT;
    total_weight += ACTION_WEIGHT;

    let threat_score = 1.0 - (a.threat_level - b.threat_level).abs();
    score += threat_score * THREAT_WEIGHT;
    total_weight += THREAT_WEIGHT;

    let intensity_score = 1.0 - (a.intensity() - b.intensity()).abs();
    score += intensity_score * INTENSITY_WEIGHT;
    total_weight += INTENSITY_WEIGHT;

    let time_score = if a.time_of_day == b.time_of_day { 1.0 } else { 0.0 };
    score += time_score * TIME_WEIGHT;
    total_weight += TIME_WEIGHT;

    if total_weight > 0.0 {
        score / total_weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_core::{Action, EnemyPresence, Environment, GameLevel, TimeOfDay};

    #[test]
    fn test_identical_scenes_score_one() {
        let scene = SceneDescriptor {
            environment: Environment::Forest,
            current_action: Action::Combat,
            threat_level: 0.6,
            time_of_day: TimeOfDay::Dusk,
            ..Default::default()
        };
        assert!((similarity(&scene, &scene) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fully_different_scenes_score_zero() {
        let a = SceneDescriptor {
            environment: Environment::Grasslands,
            current_action: Action::Walking,
            action_intensity: 0.0,
            threat_level: 0.0,
            time_of_day: TimeOfDay::Day,
            ..Default::default()
        };
        // opposite in every factor: different env/action/time, threat and
        // intensity both at the far end
        let b = SceneDescriptor {
            environment: Environment::DarkDungeon,
            current_action: Action::Combat,
            action_intensity: 1.0,
            threat_level: 1.0,
            enemy_count: 10,
            player_health: 0.0,
            is_boss_fight: true,
            time_of_day: TimeOfDay::Night,
            ..Default::default()
        };
        assert!(similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let a = SceneDescriptor {
            environment: Environment::Ocean,
            threat_level: 0.2,
            ..Default::default()
        };
        let b = SceneDescriptor {
            environment: Environment::Ocean,
            current_action: Action::Swimming,
            threat_level: 0.7,
            ..Default::default()
        };
        assert!((similarity(&a, &b) - similarity(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn test_same_environment_outweighs_close_threat() {
        let query = SceneDescriptor {
            environment: Environment::Snow,
            ..Default::default()
        };
        let same_env = SceneDescriptor {
            environment: Environment::Snow,
            threat_level: 0.5,
            ..Default::default()
        };
        let same_threat = SceneDescriptor {
            environment: Environment::Desert,
            threat_level: 0.0,
            ..Default::default()
        };
        assert!(similarity(&query, &same_env) > similarity(&query, &same_threat));
    }

    #[test]
    fn test_enum_only_factors() {
        // env + action + time match, continuous factors at maximum distance
        let a = SceneDescriptor {
            environment: Environment::Urban,
            current_action: Action::Stealth,
            enemy_presence: EnemyPresence::Lurking,
            game_level: GameLevel::Mid,
            action_intensity: 0.0,
            threat_level: 0.0,
            ..Default::default()
        };
        let b = SceneDescriptor {
            environment: Environment::Urban,
            current_action: Action::Stealth,
            action_intensity: 1.0,
            threat_level: 1.0,
            enemy_count: 10,
            player_health: 0.0,
            is_boss_fight: true,
            ..Default::default()
        };
        // 0.30 + 0.25 + 0.10 for the matching enums, intensity gap is
        // 1 - 0.15*|...| etc.
        let score = similarity(&a, &b);
        assert!(score > 0.6 && score < 0.7, "score = {}", score);
    }
}
