use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path} at {pointer}: {source}")]
    Parse {
        path: PathBuf,
        pointer: String,
        #[source]
        source: serde_json::Error,
    },
}

fn default_window_title() -> String {
    "Overworld".to_string()
}

fn default_window_width() -> u32 {
    800
}

fn default_window_height() -> u32 {
    600
}

fn default_target_tps() -> u32 {
    60
}

fn default_starting_map() -> String {
    "maps/village.tmx".to_string()
}

fn default_hero_speed() -> f32 {
    160.0
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub(crate) struct SpawnPoint {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self { x: 400.0, y: 300.0 }
    }
}

/// Game settings from `assets/config.json`. Every field has a default, so a
/// partial file only overrides what it names and a missing file runs with
/// the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameConfig {
    #[serde(default = "default_window_title")]
    pub(crate) window_title: String,
    #[serde(default = "default_window_width")]
    pub(crate) window_width: u32,
    #[serde(default = "default_window_height")]
    pub(crate) window_height: u32,
    #[serde(default = "default_target_tps")]
    pub(crate) target_tps: u32,
    #[serde(default = "default_starting_map")]
    pub(crate) starting_map: String,
    #[serde(default)]
    pub(crate) spawn_point: SpawnPoint,
    #[serde(default = "default_hero_speed")]
    pub(crate) hero_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            target_tps: default_target_tps(),
            starting_map: default_starting_map(),
            spawn_point: SpawnPoint::default(),
            hero_speed: default_hero_speed(),
        }
    }
}

impl GameConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file absent, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        serde_path_to_error::deserialize::<_, Self>(&mut deserializer).map_err(|error| {
            let pointer = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                pointer,
                source: error.into_inner(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = TempDir::new().expect("temp");

        let config = GameConfig::load(&temp.path().join("config.json")).expect("load");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"window_title": "Overworld Dev", "target_tps": 30}"#)
            .expect("write");

        let config = GameConfig::load(&path).expect("load");
        assert_eq!(config.window_title, "Overworld Dev");
        assert_eq!(config.target_tps, 30);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.starting_map, "maps/village.tmx");
    }

    #[test]
    fn parse_error_names_the_offending_field() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"spawn_point": {"x": "middle", "y": 0.0}}"#).expect("write");

        let error = GameConfig::load(&path).expect_err("bad field");
        match error {
            ConfigError::Parse { pointer, .. } => assert_eq!(pointer, "spawn_point.x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"windw_title": "typo"}"#).expect("write");

        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
