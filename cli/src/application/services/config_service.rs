//! Application service — configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::AppConfig;

/// Load configuration and check every value.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or holds a value `config set` would reject.
pub fn load_config(store: &impl ConfigStore) -> Result<AppConfig> {
    let config = store.load()?;
    config.validate().with_context(|| {
        let path = store
            .path()
            .map_or_else(|_| "config file".to_string(), |p| p.display().to_string());
        format!("invalid setting in {path} (fix it with `ec2-webserver config set`)")
    })?;
    Ok(config)
}

/// Validate and persist one `key = value` assignment, returning the new config.
///
/// Nothing is written when validation fails. Other stored values are not
/// checked, so a broken file can be repaired one key at a time.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the file cannot be written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<AppConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
