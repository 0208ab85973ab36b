//! TOML-based application configuration.
//!
//! Stores the choreography timings and labels:
//! - Progress button cadence, target and follow-up labels
//! - Reveal screen delays
//! - Press feedback targets handed to the render surface
//! - Stepper starting value
//! - Background colour-phase clock
//!
//! Configuration is stored at `~/.config/glassmotion/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};

/// Progress button configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Counter value that ends the counting phase.
    #[serde(default = "default_target")]
    pub target: u32,
    /// Delay from the end of counting to the celebratory label.
    #[serde(default = "default_celebrate_delay_ms")]
    pub celebrate_delay_ms: u64,
    /// Delay from the celebratory label to the re-invite prompt.
    #[serde(default = "default_prompt_delay_ms")]
    pub prompt_delay_ms: u64,
    #[serde(default = "default_idle_label")]
    pub idle_label: String,
    #[serde(default = "default_celebrate_label")]
    pub celebrate_label: String,
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

/// Reveal screen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_auto_dismiss_ms")]
    pub auto_dismiss_ms: u64,
    /// Gap between the card leaving and the sticky banner arriving.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    #[serde(default = "default_open_detail_delay_ms")]
    pub open_detail_delay_ms: u64,
}

/// Press feedback targets. The render surface animates towards these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressConfig {
    #[serde(default = "default_pressed_scale")]
    pub pressed_scale: f32,
    #[serde(default = "default_shadow_radius")]
    pub shadow_radius: f32,
    #[serde(default = "default_pressed_shadow_radius")]
    pub pressed_shadow_radius: f32,
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: f32,
    #[serde(default = "default_pressed_shadow_offset")]
    pub pressed_shadow_offset: f32,
}

/// Background colour-phase clock. The phase advances by `step` every
/// `interval_ms` and returns to zero once it passes `wrap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_background_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_background_step")]
    pub step: f64,
    #[serde(default = "default_background_wrap")]
    pub wrap: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepperConfig {
    #[serde(default)]
    pub initial: i64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/glassmotion/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub press: PressConfig,
    #[serde(default)]
    pub stepper: StepperConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_target() -> u32 {
    100
}
fn default_celebrate_delay_ms() -> u64 {
    1_000
}
fn default_prompt_delay_ms() -> u64 {
    1_000
}
fn default_idle_label() -> String {
    "1".into()
}
fn default_celebrate_label() -> String {
    "Yayyyyyy!!!".into()
}
fn default_prompt_label() -> String {
    "Once Again?".into()
}
fn default_auto_dismiss_ms() -> u64 {
    2_000
}
fn default_reveal_delay_ms() -> u64 {
    280
}
fn default_open_detail_delay_ms() -> u64 {
    120
}
fn default_pressed_scale() -> f32 {
    0.8
}
fn default_shadow_radius() -> f32 {
    8.0
}
fn default_pressed_shadow_radius() -> f32 {
    4.0
}
fn default_shadow_offset() -> f32 {
    12.0
}
fn default_pressed_shadow_offset() -> f32 {
    8.0
}
fn default_background_interval_ms() -> u64 {
    50
}
fn default_background_step() -> f64 {
    0.05
}
fn default_background_wrap() -> f64 {
    std::f64::consts::TAU
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            target: default_target(),
            celebrate_delay_ms: default_celebrate_delay_ms(),
            prompt_delay_ms: default_prompt_delay_ms(),
            idle_label: default_idle_label(),
            celebrate_label: default_celebrate_label(),
            prompt_label: default_prompt_label(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: default_auto_dismiss_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
            open_detail_delay_ms: default_open_detail_delay_ms(),
        }
    }
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            pressed_scale: default_pressed_scale(),
            shadow_radius: default_shadow_radius(),
            pressed_shadow_radius: default_pressed_shadow_radius(),
            shadow_offset: default_shadow_offset(),
            pressed_shadow_offset: default_pressed_shadow_offset(),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_background_interval_ms(),
            step: default_background_step(),
            wrap: default_background_wrap(),
        }
    }
}

impl ProgressConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn celebrate_delay(&self) -> Duration {
        Duration::from_millis(self.celebrate_delay_ms)
    }

    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }
}

impl RevealConfig {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn open_detail_delay(&self) -> Duration {
        Duration::from_millis(self.open_detail_delay_ms)
    }
}

impl BackgroundConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
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

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<i64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a leaf key".into()).into());
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            return Self::load_from(&path);
        }
        let cfg = Self::default();
        cfg.save_to(&path)?;
        Ok(cfg)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
        };
        write().map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a leaf value by dot-separated key, keeping its type.
    ///
    /// The change is only applied if the resulting config validates.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject settings that would stall or blank the controls.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let zero = |field: &str| ValidationError::ZeroDuration {
            field: field.to_string(),
        };
        let p = &self.progress;
        if p.tick_interval_ms == 0 {
            return Err(zero("progress.tick_interval_ms"));
        }
        if p.target == 0 {
            return Err(ValidationError::InvalidValue {
                field: "progress.target".into(),
                message: "must be at least 1".into(),
            });
        }
        for (field, label) in [
            ("progress.idle_label", &p.idle_label),
            ("progress.celebrate_label", &p.celebrate_label),
            ("progress.prompt_label", &p.prompt_label),
        ] {
            if label.trim().is_empty() {
                return Err(ValidationError::Empty {
                    field: field.into(),
                });
            }
        }
        if !(self.press.pressed_scale > 0.0 && self.press.pressed_scale <= 1.0) {
            return Err(ValidationError::InvalidValue {
                field: "press.pressed_scale".into(),
                message: format!("{} is outside (0, 1]", self.press.pressed_scale),
            });
        }
        let b = &self.background;
        if b.interval_ms == 0 {
            return Err(zero("background.interval_ms"));
        }
        for (field, value) in [("background.step", b.step), ("background.wrap", b.wrap)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("{value} must be a positive number"),
                });
            }
        }
        Ok(())
    }
}
