//! Toggle command.

use std::io::Write;

use anyhow::Result;
use ct_core::clock;

use super::Context;
use super::clockout::report;
use super::util::{load_user_state, resolve_time};
use crate::adium::{self, Activity};
use crate::cli::ClockArgs;

/// Clocks out if clocked in, otherwise clocks into the most recent project.
pub fn run<W: Write>(writer: &mut W, ctx: &Context, args: &ClockArgs) -> Result<()> {
    let state = load_user_state(ctx)?;
    let at = resolve_time(args.time.as_deref(), ctx.now)?;

    let plan = match clock::plan_toggle(&state.state, state.last_project.as_deref(), at) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::debug!(error = ?e, "toggle refused");
            writeln!(writer, "{e}")?;
            return Ok(());
        }
    };

    ctx.store.append_events(&state.user, &plan.events)?;
    report(writer, &plan)?;

    let activity = match (&plan.opened, &plan.closed) {
        (Some(project), _) => Activity::Working { project },
        (None, Some((project, _))) => Activity::Idle { last_project: project },
        (None, None) => return Ok(()),
    };
    adium::update(&ctx.config, activity, plan.at, args.away);
    Ok(())
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
                .and_hms_opt(13, 30, 0)
                .unwrap(),
        }
    }

    fn toggle(ctx: &Context) -> String {
        let mut output = Vec::new();
        run(&mut output, ctx, &ClockArgs::default()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn toggle_round_trip() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        ctx.store
            .append_line("alice", "Proj A clockin 01-01-2020 09:00:00")
            .unwrap();

        assert_snapshot!(toggle(&ctx), @"Clocked out of Proj A at 01:30 PM on Jan 01, 2020");
        assert_snapshot!(toggle(&ctx), @"Clocked into Proj A at 01:30 PM on Jan 01, 2020");
        assert_eq!(ctx.store.read_lines("alice").unwrap().unwrap().len(), 3);
    }

    #[test]
    fn toggle_with_empty_log_needs_a_project() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        assert_snapshot!(toggle(&ctx), @"You must specify a project for your first clockin.");
    }
}
