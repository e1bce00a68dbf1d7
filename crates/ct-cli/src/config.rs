//! Configuration loading and management.
//!
//! Settings are layered, later sources winning:
//! defaults, `~/.config/ct/config.toml`, the `--config` file, the working
//! directory's `config.json` written by `ct init`, then `CT_*` environment
//! variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ct_core::event::sanitize;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Name of the per-working-directory settings file.
pub const WORKING_CONFIG_FILE: &str = "config.json";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Working directory holding one log per user.
    pub home: PathBuf,

    /// Whose log to write to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Where you are working from; shown in the Adium status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Update the Adium status message on clockin and clockout.
    #[serde(default)]
    pub adium: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: dirs_data_path().unwrap_or_else(|| PathBuf::from(".ct")),
            name: None,
            location: None,
            adium: false,
        }
    }
}

/// Settings `ct init` stores in the working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingConfig {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub adium: bool,
}

impl WorkingConfig {
    /// Reads `config.json` from a working directory, if present.
    pub fn load(home: &Path) -> Result<Option<Self>> {
        let path = home.join(WORKING_CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Writes `config.json` into a working directory.
    pub fn save(&self, home: &Path) -> Result<PathBuf> {
        let path = home.join(WORKING_CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, format!("{content}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        // The working directory itself is configurable, so resolve it before
        // reading the settings stored inside it.
        let home: PathBuf = Self::figment(config_path, None).extract_inner("home")?;
        Self::figment(config_path, Some(&home)).extract()
    }

    fn figment(config_path: Option<&Path>, home: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(home) = home {
            figment = figment.merge(Json::file(home.join(WORKING_CONFIG_FILE)));
        }

        // CT_HOME, CT_NAME, CT_LOCATION, CT_ADIUM
        figment.merge(Env::prefixed("CT_"))
    }

    /// The user whose log commands read and write, sanitized like `ct init`
    /// does so it always names a file inside the working directory.
    pub fn require_name(&self) -> Result<String> {
        self.name
            .as_deref()
            .map(sanitize)
            .filter(|name| !name.is_empty() && name != "." && name != "..")
            .context("no user name configured; run 'ct init --name <NAME>' or set CT_NAME")
    }

    /// The configured location, falling back to the host name.
    pub fn location_or_hostname(&self) -> String {
        self.location.clone().unwrap_or_else(hostname_or_unknown)
    }
}

/// The machine's host name, or `unknown` if it cannot be read.
pub fn hostname_or_unknown() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Returns the platform-specific config directory for ct.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ct"))
}

/// Returns the platform-specific data directory for ct.
///
/// On Linux: `~/.local/share/ct`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ct"))
}
