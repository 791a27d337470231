//! TOML-based application configuration.
//!
//! Stores interval durations and cue preferences. Configuration is stored at
//! `~/.config/tomata/config.toml`; set `TOMATA_ENV=dev` to use a separate
//! development directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::session::Stage;

/// Interval durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default = "default_work_min")]
    pub work_min: u64,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u64,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u64,
}

/// Cue preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuesConfig {
    /// Ring the terminal bell for countdown and completion cues.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tomata/config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub durations: DurationsConfig,
    #[serde(default)]
    pub cues: CuesConfig,
}

fn default_work_min() -> u64 {
    25
}
fn default_short_break_min() -> u64 {
    5
}
fn default_long_break_min() -> u64 {
    20
}
fn default_true() -> bool {
    true
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            work_min: default_work_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            durations: DurationsConfig::default(),
            cues: CuesConfig::default(),
        }
    }
}

/// Returns `~/.config/tomata[-dev]/` based on TOMATA_ENV.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TOMATA_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tomata-dev")
    } else {
        base_dir.join("tomata")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

impl SessionConfig {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Interval duration in seconds for a stage.
    pub fn stage_duration_secs(&self, stage: Stage) -> u64 {
        let minutes = match stage {
            Stage::Work => self.durations.work_min,
            Stage::ShortBreak => self.durations.short_break_min,
            Stage::LongBreak => self.durations.long_break_min,
        };
        minutes.saturating_mul(60)
    }

    /// Load from disk, writing the defaults first if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path, writing the defaults first if no file
    /// exists there.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: SessionConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// A zero-length interval would complete on its first tick; reject it at
    /// the config boundary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("durations.work_min", self.durations.work_min),
            ("durations.short_break_min", self.durations.short_break_min),
            ("durations.long_break_min", self.durations.long_break_min),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "duration must be at least 1 minute".into(),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the result is invalid, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: SessionConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        self.save()
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::InvalidValue {
        key: key.into(),
        message: "unknown config key".into(),
    };
    let unparsable = |ty: &str| ConfigError::InvalidValue {
        key: key.into(),
        message: format!("cannot parse '{value}' as {ty}"),
    };

    let (section, leaf) = key.split_once('.').ok_or_else(unknown)?;
    let obj = root
        .get_mut(section)
        .and_then(|v| v.as_object_mut())
        .ok_or_else(unknown)?;
    let existing = obj.get(leaf).ok_or_else(unknown)?;

    let new_value = match existing {
        serde_json::Value::Bool(_) => serde_json::Value::Bool(
            value.parse::<bool>().map_err(|_| unparsable("bool"))?,
        ),
        serde_json::Value::Number(_) => serde_json::Value::Number(
            value.parse::<u64>().map_err(|_| unparsable("number"))?.into(),
        ),
        _ => serde_json::Value::String(value.into()),
    };
    obj.insert(leaf.to_string(), new_value);
    Ok(())
}
