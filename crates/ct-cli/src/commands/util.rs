//! Shared utilities for CLI commands.

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use ct_core::ClockState;
use ct_core::session::last_project;

use super::Context;

/// How times are shown in command confirmations.
pub const USER_DATE_FORMAT: &str = "%I:%M %p on %b %d, %Y";

pub fn format_user_time(at: NaiveDateTime) -> String {
    at.format(USER_DATE_FORMAT).to_string()
}

/// The time a clock command should record: `--time` if given, else now.
pub fn resolve_time(time: Option<&str>, now: NaiveDateTime) -> Result<NaiveDateTime> {
    match time {
        Some(input) => Ok(ct_core::parse_user_date(input, now)?),
        None => Ok(now),
    }
}

/// The current user's clock state and most recent project.
pub struct UserState {
    pub user: String,
    pub state: ClockState,
    pub last_project: Option<String>,
}

/// Reads the configured user's log and derives its clock state.
///
/// Fails if the last record cannot be parsed, so nothing is appended on top
/// of a corrupt tail.
pub fn load_user_state(ctx: &Context) -> Result<UserState> {
    let user = ctx.config.require_name()?;
    let lines = ctx.store.read_lines(&user)?.unwrap_or_default();
    let state = ClockState::from_lines(&lines).with_context(|| {
        format!(
            "cannot determine clock state from {}",
            ctx.store.user_path(&user).display()
        )
    })?;
    tracing::debug!(user = %user, ?state, "loaded clock state");
    Ok(UserState {
        last_project: last_project(&lines),
        user,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 31)
            .unwrap()
            .and_hms_opt(17, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_format_user_time() {
        assert_eq!(format_user_time(now()), "05:05 PM on Jan 31, 2020");
    }

    #[test]
    fn test_resolve_time_defaults_to_now() {
        assert_eq!(resolve_time(None, now()).unwrap(), now());
    }

    #[test]
    fn test_resolve_time_parses_input() {
        let at = resolve_time(Some("9am"), now()).unwrap();
        assert_eq!(at, now().date().and_hms_opt(9, 0, 0).unwrap());
        assert!(resolve_time(Some("whenever"), now()).is_err());
    }
}
