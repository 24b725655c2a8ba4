use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty preset selecting pipe gap size, pipe spacing, and scroll speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Extreme,
}

impl Difficulty {
    /// Returns (gap_size, pipe_spacing, scroll_speed) for this preset.
    pub fn preset(&self) -> (f32, f32, f32) {
        match self {
            Difficulty::Easy => (220.0, 300.0, 2.0),
            Difficulty::Normal => (180.0, 280.0, 3.0),
            Difficulty::Hard => (150.0, 260.0, 3.0),
            Difficulty::Extreme => (130.0, 240.0, 4.0),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            other => Err(format!(
                "unknown difficulty '{}' (expected easy, normal, hard, or extreme)",
                other
            )),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Width of the playfield in pixels
    pub screen_width: f32,
    /// Height of the playfield in pixels
    pub screen_height: f32,
    /// Fixed horizontal position of the bird
    pub bird_x: f32,
    /// Collision radius of the bird
    pub bird_radius: f32,
    /// Width of pipe obstacles
    pub pipe_width: f32,
    /// Distance of the first pipe past the right screen edge at reset
    pub init_pipe_offset: f32,
    /// Minimum y-position for a pipe gap
    pub min_gap_y: f32,
    /// Height of the ground strip at the bottom of the screen
    pub ground_height: f32,

    // Physics
    /// Downward acceleration applied every step
    pub gravity: f32,
    /// Velocity assigned on a flap (negative = upward)
    pub flap_vel: f32,
    /// Velocity clamp magnitude
    pub max_vel: f32,

    // Rewards (for RL)
    /// Small reward for surviving a step
    pub living_reward: f32,
    /// Reward for passing through a pipe gap
    pub score_reward: f32,
    /// Penalty for dying
    pub death_penalty: f32,
    /// Weight of the vertical gap-alignment penalty
    pub vertical_weight: f32,
    /// Weight of the velocity-stability penalty
    pub velocity_weight: f32,
    /// Multiplier for the gap-centering bonus on a score event
    pub center_bonus_mult: f32,
    /// Normalized horizontal distance below which a pipe counts as "approaching"
    pub approaching_threshold: f32,
    /// Alignment-penalty multiplier while approaching a pipe
    pub approaching_multiplier: f32,

    /// Difficulty preset
    pub difficulty: Difficulty,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            screen_width: 400.0,
            screen_height: 600.0,
            bird_x: 80.0,
            bird_radius: 12.0,
            pipe_width: 52.0,
            init_pipe_offset: 100.0,
            min_gap_y: 50.0,
            ground_height: 100.0,
            gravity: 0.5,
            flap_vel: -9.0,
            max_vel: 12.0,
            living_reward: 0.01,
            score_reward: 10.0,
            death_penalty: -10.0,
            vertical_weight: 0.3,
            velocity_weight: 0.1,
            center_bonus_mult: 5.0,
            approaching_threshold: 0.3,
            approaching_multiplier: 2.0,
            difficulty: Difficulty::Normal,
        }
    }
}

impl EnvConfig {
    /// Create a configuration for the given difficulty preset
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    /// Vertical size of the pipe gap for the current difficulty
    pub fn gap_size(&self) -> f32 {
        self.difficulty.preset().0
    }

    /// Horizontal distance between consecutive pipes
    pub fn pipe_spacing(&self) -> f32 {
        self.difficulty.preset().1
    }

    /// Horizontal scroll speed per step
    pub fn scroll_speed(&self) -> f32 {
        self.difficulty.preset().2
    }

    /// Y-coordinate of the ground line
    pub fn ground_y(&self) -> f32 {
        self.screen_height - self.ground_height
    }

    /// Largest legal gap_y for a freshly spawned pipe
    pub fn max_gap_y(&self) -> f32 {
        self.screen_height - self.min_gap_y - self.gap_size() - self.ground_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.screen_width, 400.0);
        assert_eq!(config.screen_height, 600.0);
        assert_eq!(config.difficulty, Difficulty::Normal);
    }

    #[test]
    fn test_difficulty_presets() {
        assert_eq!(Difficulty::Easy.preset(), (220.0, 300.0, 2.0));
        assert_eq!(Difficulty::Normal.preset(), (180.0, 280.0, 3.0));
        assert_eq!(Difficulty::Hard.preset(), (150.0, 260.0, 3.0));
        assert_eq!(Difficulty::Extreme.preset(), (130.0, 240.0, 4.0));
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("extreme".parse::<Difficulty>(), Ok(Difficulty::Extreme));
        assert!("impossible".parse::<Difficulty>().is_err());
        assert!("Normal".parse::<Difficulty>().is_err()); // case-sensitive
    }

    #[test]
    fn test_difficulty_display_round_trip() {
        for difficulty in [
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Hard,
            Difficulty::Extreme,
        ] {
            assert_eq!(difficulty.to_string().parse::<Difficulty>(), Ok(difficulty));
        }
    }

    #[test]
    fn test_derived_geometry() {
        let config = EnvConfig::new(Difficulty::Normal);
        assert_eq!(config.ground_y(), 500.0);
        // 600 - 50 - 180 - 100
        assert_eq!(config.max_gap_y(), 270.0);
    }
}
