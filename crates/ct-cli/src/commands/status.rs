//! Status command for showing whether the user is clocked in.

use std::io::Write;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use ct_core::{ClockState, format_duration};
use serde::Serialize;

use super::Context;
use super::util::{format_user_time, load_user_state};

#[derive(Debug, Serialize)]
struct JsonStatus<'a> {
    user: &'a str,
    #[serde(flatten)]
    state: &'a ClockState,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_seconds: Option<i64>,
}

pub fn run<W: Write>(writer: &mut W, ctx: &Context, json: bool) -> Result<()> {
    let state = load_user_state(ctx)?;

    if json {
        let output = JsonStatus {
            user: &state.user,
            state: &state.state,
            elapsed_seconds: elapsed(&state.state, ctx.now).map(|d| d.num_seconds()),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    match &state.state {
        ClockState::ClockedIn { project, since } => {
            let elapsed = elapsed(&state.state, ctx.now).unwrap_or_else(Duration::zero);
            writeln!(
                writer,
                "Clocked into {project} since {} ({})",
                format_user_time(*since),
                format_duration(elapsed)
            )?;
        }
        ClockState::ClockedOut => match &state.last_project {
            Some(project) => writeln!(writer, "Not clocked in. Last project: {project}")?,
            None => writeln!(writer, "Not clocked in.")?,
        },
    }
    Ok(())
}

/// Time since clocking in; never negative.
fn elapsed(state: &ClockState, now: NaiveDateTime) -> Option<Duration> {
    match state {
        ClockState::ClockedIn { since, .. } => Some(now.max(*since) - *since),
        ClockState::ClockedOut => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use ct_store::LogStore;
    use insta::assert_snapshot;
    use tempfile::TempDir;

    use crate::Config;

    fn context(temp: &TempDir) -> Context {
        let config = Config {
            home: temp.path().to_path_buf(),
            name: Some("alice".to_string()),
            ..Config::default()
        };
        Context {
            store: LogStore::open(temp.path()).unwrap(),
            config,
            now: NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(10, 15, 0)
                .unwrap(),
        }
    }

    fn status(ctx: &Context, json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, ctx, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn status_when_never_clocked_in() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        assert_snapshot!(status(&ctx, false), @"Not clocked in.");
    }

    #[test]
    fn status_when_clocked_in() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_line("alice", "Proj A clockin 01-01-2020 09:00:00")
            .unwrap();

        assert_snapshot!(
            status(&ctx, false),
            @"Clocked into Proj A since 09:00 AM on Jan 01, 2020 (1 hour, 15 minutes)"
        );
        assert_snapshot!(status(&ctx, true), @r#"
        {
          "user": "alice",
          "state": "clocked_in",
          "project": "Proj A",
          "since": "2020-01-01T09:00:00",
          "elapsed_seconds": 4500
        }
        "#);
    }

    #[test]
    fn status_after_clockout_names_last_project() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_lines(
                "alice",
                &["B clockin 01-01-2020 09:00:00", "clockout 01-01-2020 09:30:00"],
            )
            .unwrap();

        assert_snapshot!(status(&ctx, false), @"Not clocked in. Last project: B");
    }
}
