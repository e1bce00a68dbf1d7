//! CLI subcommand implementations.

pub mod clockin;
pub mod clockout;
pub mod init;
pub mod status;
pub mod summary;
pub mod toggle;
pub mod util;

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use ct_store::LogStore;

use crate::Config;

/// What every command that touches the logs needs.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub store: LogStore,
    /// The invocation time, read once.
    pub now: NaiveDateTime,
}

impl Context {
    /// Opens the configured working directory.
    pub fn open(config: Config, now: NaiveDateTime) -> Result<Self> {
        let store = LogStore::open(&config.home)
            .with_context(|| format!("failed to open working directory {}", config.home.display()))?;
        Ok(Self { config, store, now })
    }
}
