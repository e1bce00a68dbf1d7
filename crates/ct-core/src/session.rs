//! Session reconstruction from a user's event log.
//!
//! Sessions are never stored. They are rebuilt on every read by pairing each
//! clock-in with the clock-out that follows it. A trailing clock-in with no
//! clock-out is an open session that ends at the caller-supplied `now`.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use crate::event::{Event, ParseError};

/// How a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum SessionEnd {
    /// A clock-out was recorded.
    Closed(NaiveDateTime),
    /// Still clocked in.
    Open,
}

/// One clock-in/clock-out interval for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub project: String,
    pub clock_in: NaiveDateTime,
    pub clock_out: SessionEnd,
}

impl Session {
    /// Returns the end of the session, using `now` for an open session.
    ///
    /// An open session whose clock-in lies after `now` ends at its clock-in.
    pub fn end_at(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self.clock_out {
            SessionEnd::Closed(at) => at,
            SessionEnd::Open => now.max(self.clock_in),
        }
    }

    /// Returns `true` if no clock-out was recorded.
    pub const fn is_open(&self) -> bool {
        matches!(self.clock_out, SessionEnd::Open)
    }

    /// Unclipped length of the session.
    pub fn duration(&self, now: NaiveDateTime) -> Duration {
        self.end_at(now) - self.clock_in
    }
}

/// A corrupt record skipped during reconstruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    /// The line could not be parsed.
    #[error("line {line}: malformed record: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: ParseError,
    },

    /// A clock-out with no open clock-in before it.
    #[error("line {line}: clockout without a preceding clockin")]
    UnpairedClockOut { line: usize },

    /// A clock-in followed by another clock-in.
    #[error("line {line}: clockin for {project:?} was never clocked out")]
    UnpairedClockIn { line: usize, project: String },

    /// A clock-out recorded before the clock-in it closes.
    #[error("line {line}: clockout precedes its clockin")]
    ReversedSession { line: usize },
}

impl RecordIssue {
    /// The 1-based line number the issue refers to.
    pub const fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. }
            | Self::UnpairedClockOut { line }
            | Self::UnpairedClockIn { line, .. }
            | Self::ReversedSession { line } => *line,
        }
    }
}

/// Sessions rebuilt from one log, plus the records that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    pub sessions: Vec<Session>,
    pub issues: Vec<RecordIssue>,
}

/// Pairing state while walking the log.
enum Pairing {
    Idle,
    Pending {
        line: usize,
        project: String,
        clock_in: NaiveDateTime,
    },
}

/// Rebuilds sessions from raw log lines.
///
/// Blank lines are ignored. Corrupt records are reported in
/// [`Reconstruction::issues`] and skipped; mismatched records are never
/// merged into a session.
pub fn reconstruct<S: AsRef<str>>(lines: &[S]) -> Reconstruction {
    let events = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.as_ref().trim().is_empty())
        .map(|(idx, line)| (idx + 1, Event::parse(line.as_ref())));
    reconstruct_events(events)
}

/// Rebuilds sessions from parsed records tagged with their 1-based line.
pub fn reconstruct_events<I>(events: I) -> Reconstruction
where
    I: IntoIterator<Item = (usize, Result<Event, ParseError>)>,
{
    let mut out = Reconstruction::default();
    let mut state = Pairing::Idle;

    for (line, parsed) in events {
        state = match (state, parsed) {
            (Pairing::Idle, Ok(Event::ClockIn { project, at })) => Pairing::Pending {
                line,
                project,
                clock_in: at,
            },
            (Pairing::Idle, Ok(Event::ClockOut { .. })) => {
                out.issues.push(RecordIssue::UnpairedClockOut { line });
                Pairing::Idle
            }
            (Pairing::Idle, Err(source)) => {
                out.issues.push(RecordIssue::Malformed { line, source });
                Pairing::Idle
            }
            (
                Pairing::Pending {
                    project, clock_in, ..
                },
                Ok(Event::ClockOut { at }),
            ) => {
                if at < clock_in {
                    out.issues.push(RecordIssue::ReversedSession { line });
                } else {
                    out.sessions.push(Session {
                        project,
                        clock_in,
                        clock_out: SessionEnd::Closed(at),
                    });
                }
                Pairing::Idle
            }
            (
                Pairing::Pending {
                    line: open_line,
                    project: open_project,
                    ..
                },
                Ok(Event::ClockIn { project, at }),
            ) => {
                out.issues.push(RecordIssue::UnpairedClockIn {
                    line: open_line,
                    project: open_project,
                });
                Pairing::Pending {
                    line,
                    project,
                    clock_in: at,
                }
            }
            (Pairing::Pending { .. }, Err(source)) => {
                // The pending clock-in has no usable partner; drop both.
                out.issues.push(RecordIssue::Malformed { line, source });
                Pairing::Idle
            }
        };
    }

    if let Pairing::Pending {
        project, clock_in, ..
    } = state
    {
        out.sessions.push(Session {
            project,
            clock_in,
            clock_out: SessionEnd::Open,
        });
    }

    for issue in &out.issues {
        tracing::debug!(%issue, "skipped corrupt record");
    }

    out
}

/// Whether the user is currently clocked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClockState {
    ClockedIn {
        project: String,
        since: NaiveDateTime,
    },
    ClockedOut,
}

impl ClockState {
    /// Derives the state from the last record of a log.
    ///
    /// An empty log is clocked out. A malformed last record is an error: the
    /// state cannot be known, so callers must not append to the log.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        let Some(last) = lines.iter().rev().find(|l| !l.as_ref().trim().is_empty()) else {
            return Ok(Self::ClockedOut);
        };

        match Event::parse(last.as_ref())? {
            Event::ClockIn { project, at } => Ok(Self::ClockedIn { project, since: at }),
            Event::ClockOut { .. } => Ok(Self::ClockedOut),
        }
    }
}

/// Returns the project of the most recent readable clock-in, if any.
pub fn last_project<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines.iter().rev().find_map(|line| match Event::parse(line.as_ref()) {
        Ok(Event::ClockIn { project, .. }) => Some(project),
        _ => None,
    })
}
