//! Client configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! holds the SGIS consumer key/secret and optional endpoint overrides.
//!
//! Configuration is stored at `~/.config/sgis-client/config.json`.
//! `SGIS_*` environment variables take precedence over file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;

/// Application name used for the config directory path
const APP_NAME: &str = "sgis-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_CONSUMER_KEY: &str = "SGIS_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "SGIS_CONSUMER_SECRET";
pub const ENV_BASE_URL: &str = "SGIS_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "SGIS_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from variables found by `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_CONSUMER_KEY) {
            self.consumer_key = Some(key);
        }
        if let Some(secret) = get(ENV_CONSUMER_SECRET) {
            self.consumer_secret = Some(secret);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
            self.timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let key = self.consumer_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No SGIS consumer key configured (set {} or consumer_key)", ENV_CONSUMER_KEY)
        })?;
        let secret = self.consumer_secret.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No SGIS consumer secret configured (set {} or consumer_secret)",
                ENV_CONSUMER_SECRET
            )
        })?;
        Ok(Credentials::new(key, secret))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            consumer_key: Some("file-key".to_string()),
            consumer_secret: Some("file-secret".to_string()),
            ..Default::default()
        };
        config
            .apply_env(env(&[(ENV_CONSUMER_KEY, "env-key"), (ENV_TIMEOUT_SECS, "5")]))
            .unwrap();
        assert_eq!(config.consumer_key.as_deref(), Some("env-key"));
        assert_eq!(config.consumer_secret.as_deref(), Some("file-secret"));
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = Config {
            base_url: Some("http://proxy".to_string()),
            ..Default::default()
        };
        config.apply_env(env(&[(ENV_BASE_URL, "  ")])).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://proxy"));
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[(ENV_TIMEOUT_SECS, "soon")])).is_err());
    }

    #[test]
    fn test_credentials_require_key_and_secret() {
        let config = Config {
            consumer_key: Some("key".to_string()),
            ..Default::default()
        };
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains(ENV_CONSUMER_SECRET));

        let config = Config {
            consumer_secret: Some("secret".to_string()),
            ..config
        };
        assert_eq!(config.credentials().unwrap().key(), "key");
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let path = std::env::temp_dir()
            .join(format!("sgis-config-test-{}", std::process::id()))
            .join(CONFIG_FILE);
        let config = Config {
            consumer_key: Some("key".to_string()),
            consumer_secret: Some("secret".to_string()),
            base_url: None,
            timeout_secs: Some(10),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_gives_default() {
        let path = std::env::temp_dir().join("sgis-config-test-does-not-exist.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
