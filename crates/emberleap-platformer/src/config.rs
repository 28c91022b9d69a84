use serde::{Deserialize, Serialize};

/// Horizontal player speed (tiles/s).
pub const PLAYER_SPEED: f32 = 7.0;
/// Downward acceleration (tiles/s^2, +y is down).
pub const GRAVITY: f32 = 30.0;
/// Upward speed given by a jump (tiles/s).
pub const JUMP_SPEED: f32 = 17.0;
/// Longest sub-step the integrator takes (seconds).
pub const MAX_STEP: f32 = 0.05;
/// Seconds a level keeps running after it is won or lost.
pub const FINISH_DELAY: f32 = 1.0;
/// Coin wobble angular speed (rad/s).
pub const WOBBLE_SPEED: f32 = 8.0;
/// Coin wobble amplitude (tiles).
pub const WOBBLE_DIST: f32 = 0.07;
/// Lives at the start of a campaign.
pub const STARTING_LIVES: u32 = 3;

/// Tunable simulation constants, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub player_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub max_step: f32,
    pub finish_delay: f32,
    pub wobble_speed: f32,
    pub wobble_dist: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_SPEED,
            gravity: GRAVITY,
            jump_speed: JUMP_SPEED,
            max_step: MAX_STEP,
            finish_delay: FINISH_DELAY,
            wobble_speed: WOBBLE_SPEED,
            wobble_dist: WOBBLE_DIST,
        }
    }
}

impl PhysicsConfig {
    /// Sub-step length actually used by the integrator. A non-positive or
    /// non-finite `max_step` would never consume elapsed time, so it falls
    /// back to [`MAX_STEP`].
    pub fn effective_max_step(&self) -> f32 {
        if self.max_step.is_finite() && self.max_step > 0.0 {
            self.max_step
        } else {
            MAX_STEP
        }
    }
}

/// Campaign sequencing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub lives: u32,
    /// Tier of the first generated level once the presets run out.
    pub start_tier: u32,
    /// Seed for level generation and coin phases.
    pub seed: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            lives: STARTING_LIVES,
            start_tier: 1,
            seed: 42,
        }
    }
}

/// Top-level platformer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub campaign: CampaignConfig,
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("EMBERLEAP_PLATFORMER_CONFIG")
            .unwrap_or_else(|_| "config/platformer.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
