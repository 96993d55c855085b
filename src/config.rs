//! Generation configuration: world geometry and spawn tuning loaded from ~/.ldl/config.yaml.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunables for structure generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Height of the world grid; the bottom row is the floor row.
    #[serde(default = "default_grid_height")]
    pub grid_height: i32,
    /// Width of the flat floor every level starts with.
    #[serde(default = "default_start_floor_width")]
    pub start_floor_width: u32,
    /// Chance that an empty cell receives a coin when auto coin spawn is on.
    #[serde(default = "default_coin_probability")]
    pub coin_probability: f64,
    /// Width of the arena built around a boss.
    #[serde(default = "default_boss_room_width")]
    pub boss_room_width: u32,
    /// How many units ahead of the player the CLI generates by default.
    #[serde(default = "default_generate_ahead")]
    pub generate_ahead: i32,
}

fn default_grid_height() -> i32 {
    9
}

fn default_start_floor_width() -> u32 {
    12
}

fn default_coin_probability() -> f64 {
    0.05
}

fn default_boss_room_width() -> u32 {
    12
}

fn default_generate_ahead() -> i32 {
    30
}

impl GenerationConfig {
    /// Load config from the standard path (~/.ldl/config.yaml).
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let home = dirs::home_dir()?;
        Self::load_from(home.join(".ldl").join("config.yaml"))
    }

    /// Load config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring malformed config: {e}");
                None
            }
        }
    }

    /// Standard config, or defaults when none is present.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            grid_height: default_grid_height(),
            start_floor_width: default_start_floor_width(),
            coin_probability: default_coin_probability(),
            boss_room_width: default_boss_room_width(),
            generate_ahead: default_generate_ahead(),
        }
    }
}
