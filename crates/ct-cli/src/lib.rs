//! ct command-line interface.
//!
//! Argument parsing, configuration and the subcommands of the `ct` binary.

pub mod adium;
mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, ClockArgs, ClockinArgs, Commands, InitArgs, StatusArgs, SummaryArgs, SummaryFormat,
};
pub use config::{Config, WorkingConfig};
