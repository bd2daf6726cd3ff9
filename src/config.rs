use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stingray::{ClientConfig, DEFAULT_API_VERSION};

use crate::cli::ConnectionArgs;

/// Get the config directory path (~/.config/brocade)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("brocade"))
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

// ============================================================================
// Connection Settings
// ============================================================================

/// Contents of `config.toml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// A missing default file yields empty settings; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (expand_path(p), true),
            None => (config_dir()?.join("config.toml"), false),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Apply flag and environment overrides on top of the file.
    pub fn resolve(self, overrides: &ConnectionArgs) -> Result<ClientConfig> {
        let server_url = overrides
            .server_url
            .clone()
            .or(self.server_url)
            .context("No server URL configured (use --server-url or BROCADE_SERVER_URL)")?;
        let username = overrides
            .username
            .clone()
            .or(self.username)
            .context("No username configured (use --username or BROCADE_USERNAME)")?;
        let password = overrides
            .password
            .clone()
            .or(self.password)
            .context("No password configured (use --password or BROCADE_PASSWORD)")?;

        let mut config = ClientConfig::new(server_url, username, password);
        config.verify_ssl = overrides.verify_ssl().or(self.verify_ssl).unwrap_or(true);
        config.api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        config.timeout = self.timeout_secs.map(Duration::from_secs);
        Ok(config)
    }
}
