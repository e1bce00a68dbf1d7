//! Clockout command.

use std::io::Write;

use anyhow::Result;
use ct_core::clock::{self, ClockPlan};

use super::Context;
use super::util::{format_user_time, load_user_state, resolve_time};
use crate::adium::{self, Activity};
use crate::cli::ClockArgs;

/// Closes the open session.
///
/// Refusals such as "not clocked in" are reported to `writer` and are not
/// errors; the log is left untouched.
pub fn run<W: Write>(writer: &mut W, ctx: &Context, args: &ClockArgs) -> Result<()> {
    let state = load_user_state(ctx)?;
    let at = resolve_time(args.time.as_deref(), ctx.now)?;

    let plan = match clock::plan_clock_out(&state.state, at) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::debug!(error = ?e, "clockout refused");
            writeln!(writer, "{e}")?;
            return Ok(());
        }
    };

    ctx.store.append_events(&state.user, &plan.events)?;
    report(writer, &plan)?;

    if let Some((project, _)) = &plan.closed {
        adium::update(&ctx.config, Activity::Idle { last_project: project }, plan.at, args.away);
    }
    Ok(())
}

/// Writes the confirmation lines for an applied plan.
pub(crate) fn report<W: Write>(writer: &mut W, plan: &ClockPlan) -> Result<()> {
    if let Some((project, _)) = &plan.closed {
        writeln!(writer, "Clocked out of {project} at {}", format_user_time(plan.at))?;
    }
    if let Some(project) = &plan.opened {
        writeln!(writer, "Clocked into {project} at {}", format_user_time(plan.at))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use chrono::{NaiveDate, NaiveDateTime};
    use ct_store::LogStore;
    use insta::assert_snapshot;
    use tempfile::TempDir;

    use crate::Config;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap()
    }

    fn context(temp: &TempDir) -> Context {
        let config = Config {
            home: temp.path().to_path_buf(),
            name: Some("alice".to_string()),
            ..Config::default()
        };
        Context {
            store: LogStore::open(temp.path()).unwrap(),
            config,
            now: now(),
        }
    }

    fn run_to_string(ctx: &Context, args: &ClockArgs) -> String {
        let mut output = Vec::new();
        run(&mut output, ctx, args).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn clockout_appends_and_reports() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_line("alice", "Proj A clockin 01-01-2020 09:00:00")
            .unwrap();

        let output = run_to_string(&ctx, &ClockArgs::default());
        assert_snapshot!(output, @"Clocked out of Proj A at 05:00 PM on Jan 01, 2020");

        let raw = fs::read_to_string(ctx.store.user_path("alice")).unwrap();
        assert_eq!(
            raw,
            "Proj A clockin 01-01-2020 09:00:00\nclockout 01-01-2020 17:00:00\n"
        );
    }

    #[test]
    fn clockout_twice_leaves_log_unchanged() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_line("alice", "Proj A clockin 01-01-2020 09:00:00")
            .unwrap();

        run_to_string(&ctx, &ClockArgs::default());
        let before = fs::read(ctx.store.user_path("alice")).unwrap();

        let output = run_to_string(&ctx, &ClockArgs::default());
        assert_snapshot!(output, @"Not clocked into anything. Clockout failed.");
        assert_eq!(fs::read(ctx.store.user_path("alice")).unwrap(), before);
    }

    #[test]
    fn clockout_before_clockin_is_refused() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_line("alice", "Proj A clockin 01-01-2020 09:00:00")
            .unwrap();

        let args = ClockArgs {
            time: Some("8am".to_string()),
            away: false,
        };
        let output = run_to_string(&ctx, &args);
        assert_snapshot!(output, @"Clockout time is before last clockin time. Clockout failed.");
        assert_eq!(ctx.store.read_lines("alice").unwrap().unwrap().len(), 1);
    }

    #[test]
    fn clockout_after_corrupt_tail_fails_without_writing() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store.append_line("alice", "garbage").unwrap();

        let mut output = Vec::new();
        assert!(run(&mut output, &ctx, &ClockArgs::default()).is_err());
        assert_eq!(ctx.store.read_lines("alice").unwrap().unwrap(), vec!["garbage"]);
    }
}
