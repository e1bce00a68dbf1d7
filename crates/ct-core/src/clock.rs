//! Deciding what clockin/clockout/toggle append to the log.
//!
//! These functions only look at the current [`ClockState`] and return the
//! events to append. Appending them is the caller's job, so a rejected
//! command never touches the log.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::event::{Event, ValidationError, project_name};
use crate::session::ClockState;

/// User-facing reasons a clock command was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Not clocked into anything. Clockout failed.")]
    NoActiveSession,

    #[error("Clockout time is before last clockin time. Clockout failed.")]
    InvalidClockoutTime {
        clock_in: NaiveDateTime,
        requested: NaiveDateTime,
    },

    #[error("You must specify a project for your first clockin.")]
    MissingProject,

    #[error("invalid project name: {0}")]
    InvalidProject(#[from] ValidationError),
}

/// Events produced by a successful clock command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockPlan {
    /// Events to append, in order.
    pub events: Vec<Event>,
    /// The session that was closed, if any: project and clock-in time.
    pub closed: Option<(String, NaiveDateTime)>,
    /// The project that was opened, if any.
    pub opened: Option<String>,
    /// The timestamp written to the log.
    pub at: NaiveDateTime,
}

/// Plans a clock-out at `at`.
pub fn plan_clock_out(state: &ClockState, at: NaiveDateTime) -> Result<ClockPlan, ClockError> {
    let ClockState::ClockedIn { project, since } = state else {
        return Err(ClockError::NoActiveSession);
    };

    let event = Event::clock_out(at);
    let at = event.at();
    if at < *since {
        return Err(ClockError::InvalidClockoutTime {
            clock_in: *since,
            requested: at,
        });
    }

    Ok(ClockPlan {
        events: vec![event],
        closed: Some((project.clone(), *since)),
        opened: None,
        at,
    })
}

/// Plans a clock-in at `at`.
///
/// `project` falls back to `last_project`. If the user is already clocked
/// in, the open session is closed at the same instant first; if that would
/// end the session before it started, nothing is planned.
pub fn plan_clock_in(
    state: &ClockState,
    project: Option<&str>,
    last_project: Option<&str>,
    at: NaiveDateTime,
) -> Result<ClockPlan, ClockError> {
    let raw = project
        .filter(|p| !p.trim().is_empty())
        .or(last_project)
        .ok_or(ClockError::MissingProject)?;
    let project = project_name(raw)?;

    let mut plan = match state {
        ClockState::ClockedIn { .. } => plan_clock_out(state, at)?,
        ClockState::ClockedOut => ClockPlan {
            events: Vec::new(),
            closed: None,
            opened: None,
            at,
        },
    };

    let event = Event::clock_in(project.clone(), at);
    plan.at = event.at();
    plan.events.push(event);
    plan.opened = Some(project);
    Ok(plan)
}

/// Plans a toggle: clock out if clocked in, else clock into `last_project`.
pub fn plan_toggle(
    state: &ClockState,
    last_project: Option<&str>,
    at: NaiveDateTime,
) -> Result<ClockPlan, ClockError> {
    match state {
        ClockState::ClockedIn { .. } => plan_clock_out(state, at),
        ClockState::ClockedOut => plan_clock_in(state, None, last_project, at),
    }
}
