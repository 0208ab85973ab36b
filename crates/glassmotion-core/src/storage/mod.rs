mod config;

pub use config::{
    BackgroundConfig, Config, PressConfig, ProgressConfig, RevealConfig, StepperConfig,
};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/glassmotion[-dev]/` based on GLASSMOTION_ENV.
///
/// Set GLASSMOTION_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .ok_or_else(|| ConfigError::NoDataDir("home directory not found".into()))?
        .join(".config");

    let env = std::env::var("GLASSMOTION_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("glassmotion-dev")
    } else {
        base_dir.join("glassmotion")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
