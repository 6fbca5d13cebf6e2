mod config;

pub use config::{Config, GoogleConfig, SchedulerSettings, TimezoneConfig};

use std::path::PathBuf;

/// Returns `~/.config/schedulize[-dev]/` based on SCHEDULIZE_ENV.
///
/// Set SCHEDULIZE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    let env = std::env::var("SCHEDULIZE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("schedulize-dev")
    } else {
        base_dir.join("schedulize")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
