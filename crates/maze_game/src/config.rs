use crate::scene::SessionSettings;
use maze_core::Difficulty;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GameConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: None,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl GameConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            difficulty: self.difficulty,
            seed: self.seed,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!("Config '{}' not found, using defaults.", path.display());
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.screen_width == 0 || config.screen_height == 0 {
        return Err("Config validation failed: screen size must be non-zero".to_string());
    }
    Ok(())
}

const fn default_screen_width() -> u32 {
    640
}

const fn default_screen_height() -> u32 {
    480
}
