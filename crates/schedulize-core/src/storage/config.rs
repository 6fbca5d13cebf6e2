//! TOML-based application configuration.
//!
//! Stores:
//! - Scheduler constants (slot granularity, busy buffer, meal length)
//! - The fixed UTC offset used for all wall-clock computations
//! - The user's daily routine
//! - Calendar provider settings
//!
//! Configuration is stored at `~/.config/schedulize/config.toml`.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::integrations::google::GOOGLE_CALENDAR_API;
use crate::schedule::{Routine, RoutineInput};
use crate::scheduler::SchedulerConfig;

/// Scheduler-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    #[serde(default = "default_granularity")]
    pub granularity_minutes: u32,
    #[serde(default = "default_buffer")]
    pub buffer_minutes: u32,
    #[serde(default = "default_meal")]
    pub meal_minutes: u32,
    /// Deadline for each calendar provider call.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

/// Time zone configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Fixed offset such as `+09:00`, `-05:00` or `UTC`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

/// Google Calendar provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/schedulize/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    /// Unset until the user enters a routine.
    #[serde(default)]
    pub routine: Option<RoutineInput>,
}

// Default functions
fn default_granularity() -> u32 {
    15
}
fn default_buffer() -> u32 {
    10
}
fn default_meal() -> u32 {
    60
}
fn default_call_timeout() -> u64 {
    30
}
fn default_utc_offset() -> String {
    "+00:00".into()
}
fn default_base_url() -> String {
    GOOGLE_CALENDAR_API.into()
}
fn default_calendar_id() -> String {
    "primary".into()
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            granularity_minutes: default_granularity(),
            buffer_minutes: default_buffer(),
            meal_minutes: default_meal(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            calendar_id: default_calendar_id(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            timezone: TimezoneConfig::default(),
            google: GoogleConfig::default(),
            routine: None,
        }
    }
}

/// Parse `+HH:MM` / `-HH:MM` / `UTC` / `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    trimmed.parse::<FixedOffset>().map_err(|e| ConfigError::InvalidValue {
        key: "timezone.utc_offset".into(),
        message: format!("'{value}' is not an offset like +09:00 ({e})"),
    })
}

impl Config {
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
        let unknown = || ConfigError::MissingKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/schedulize"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The change is validated but not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.scheduler_config()?;
        *self = updated;
        Ok(())
    }

    /// Configured zone.
    pub fn zone(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.timezone.utc_offset)
    }

    /// Scheduler constants plus zone, validated.
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        let s = &self.scheduler;
        if s.granularity_minutes == 0 || s.granularity_minutes > 24 * 60 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.granularity_minutes".into(),
                message: format!("must be between 1 and 1440, got {}", s.granularity_minutes),
            });
        }
        Ok(SchedulerConfig {
            granularity_minutes: i64::from(s.granularity_minutes),
            buffer_minutes: i64::from(s.buffer_minutes),
            meal_minutes: i64::from(s.meal_minutes),
            zone: self.zone()?,
        })
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.scheduler.call_timeout_secs)
    }

    /// The stored routine, or [`ConfigError::RoutineMissing`].
    pub fn routine(&self) -> Result<Routine, ConfigError> {
        let input = self
            .routine
            .as_ref()
            .ok_or_else(|| ConfigError::RoutineMissing("no routine has been set".into()))?;
        Routine::try_from(input)
    }
}
