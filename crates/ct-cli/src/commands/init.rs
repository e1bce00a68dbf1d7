//! Init command for setting up a working directory.

use std::io::Write;

use anyhow::{Context as _, Result};
use ct_core::event::sanitize;
use ct_store::LogStore;

use crate::Config;
use crate::cli::InitArgs;
use crate::config::{WorkingConfig, hostname_or_unknown};

/// Creates the working directory and records who logs into it.
///
/// Values not given on the command line are kept from an existing
/// `config.json`, then taken from the loaded configuration.
pub fn run<W: Write>(writer: &mut W, config: &Config, args: &InitArgs) -> Result<()> {
    let store = LogStore::create(&config.home)
        .with_context(|| format!("failed to create {}", config.home.display()))?;
    let existing = WorkingConfig::load(store.dir())?;

    let name = args
        .name
        .as_deref()
        .or(existing.as_ref().map(|c| c.name.as_str()))
        .or(config.name.as_deref())
        .map(sanitize)
        .filter(|name| !name.is_empty())
        .context("a name is required: ct init --name <NAME>")?;

    let location = args
        .location
        .clone()
        .or_else(|| existing.as_ref().map(|c| c.location.clone()))
        .or_else(|| config.location.clone())
        .unwrap_or_else(hostname_or_unknown);

    let adium = args
        .adium
        .or_else(|| existing.as_ref().map(|c| c.adium))
        .unwrap_or(config.adium);
    if adium && !cfg!(target_os = "macos") {
        tracing::warn!("Adium status updates are only available on macOS; disabling");
    }

    let working = WorkingConfig {
        name,
        location,
        adium: adium && cfg!(target_os = "macos"),
    };
    let path = working.save(store.dir())?;
    tracing::debug!(?working, path = %path.display(), "saved working config");

    writeln!(writer, "Working directory: {}", store.dir().display())?;
    writeln!(writer, "Name:              {}", working.name)?;
    writeln!(writer, "Location:          {}", working.location)?;
    writeln!(writer, "Adium:             {}", if working.adium { "on" } else { "off" })?;
    writeln!(writer, "Saved to:          {}", path.display())?;
    Ok(())
}
