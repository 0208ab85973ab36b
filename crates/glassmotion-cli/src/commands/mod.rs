pub mod completions;
pub mod config;
pub mod run;
pub mod simulate;

mod output;

use std::path::Path;

use glassmotion_core::Config;

/// Use `--config` when given, otherwise the user's config file.
fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}
