//! Clockin command.

use std::io::Write;

use anyhow::Result;
use ct_core::clock;

use super::Context;
use super::clockout::report;
use super::util::{load_user_state, resolve_time};
use crate::adium::{self, Activity};
use crate::cli::ClockinArgs;

/// Opens a session, closing the current one at the same instant first.
///
/// Without a project the most recent one is reused.
pub fn run<W: Write>(writer: &mut W, ctx: &Context, args: &ClockinArgs) -> Result<()> {
    let state = load_user_state(ctx)?;
    let at = resolve_time(args.clock.time.as_deref(), ctx.now)?;
    let project = args.project();

    let plan = match clock::plan_clock_in(
        &state.state,
        project.as_deref(),
        state.last_project.as_deref(),
        at,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::debug!(error = ?e, "clockin refused");
            writeln!(writer, "{e}")?;
            return Ok(());
        }
    };

    ctx.store.append_events(&state.user, &plan.events)?;
    report(writer, &plan)?;

    if let Some(project) = &plan.opened {
        adium::update(&ctx.config, Activity::Working { project }, plan.at, args.clock.away);
    }
    Ok(())
}
