//! Adium status updates on macOS.
//!
//! Failures are logged and never fail the clock command that triggered them.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::Config;
use crate::commands::util::format_user_time;

const BLURB: &str = "\n\nThis message brought to you by ct";

/// What the status message should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity<'a> {
    Working { project: &'a str },
    Idle { last_project: &'a str },
}

/// The status text for `activity`, without the trailing blurb.
pub fn status_message(activity: Activity<'_>, location: &str, at: NaiveDateTime) -> String {
    let time = format_user_time(at);
    match activity {
        Activity::Working { project } => {
            format!("At {location} working on {project}. (updated {time})")
        }
        Activity::Idle { last_project } => format!(
            "Not currently tracking time. Last seen at {location} working on {last_project}. (updated {time})"
        ),
    }
}

/// Updates the Adium status if enabled in `config`.
pub fn update(config: &Config, activity: Activity<'_>, at: NaiveDateTime, away: bool) {
    if !config.adium || !cfg!(target_os = "macos") {
        return;
    }

    let message = status_message(activity, &config.location_or_hostname(), at);
    match set_status(&format!("{message}{BLURB}"), away) {
        Ok(true) => tracing::info!(status = %message, "updated Adium status"),
        Ok(false) => tracing::info!("Adium is not running; status not updated"),
        Err(e) => tracing::warn!(error = %e, "couldn't update Adium status"),
    }
}

/// Sets the status through AppleScript. Returns `false` if Adium isn't running.
fn set_status(message: &str, away: bool) -> Result<bool> {
    let ps = Command::new("ps")
        .arg("axw")
        .stderr(Stdio::null())
        .output()
        .context("failed to list processes")?;
    if !String::from_utf8_lossy(&ps.stdout).contains("Adium") {
        return Ok(false);
    }

    let availability = if away { "away" } else { "available" };
    let script = format!(
        "tell app \"Adium\" to go {availability} with message \"{}\"",
        escape_applescript_string(message)
    );
    let status = Command::new("osascript")
        .args(["-e", &script])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .status()
        .context("failed to run osascript")?;
    anyhow::ensure!(status.success(), "osascript exited with {status}");
    Ok(true)
}

fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
