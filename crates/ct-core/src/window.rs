//! Time windows, project filters, and session clipping.

use std::collections::BTreeSet;

use chrono::{Duration, Months, NaiveDateTime};
use serde::Serialize;

use crate::session::Session;

/// Which projects a summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl ProjectFilter {
    /// Builds a filter from project names; no names means every project.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if set.is_empty() { Self::All } else { Self::Only(set) }
    }

    /// Returns `true` if sessions for `project` are counted.
    pub fn includes(&self, project: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(project),
        }
    }
}

/// A query range. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

/// The part of a session that falls inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clipped<'a> {
    pub project: &'a str,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Clipped<'_> {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl TimeWindow {
    /// A window with no bounds.
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    pub const fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        Self { from, to }
    }

    /// Resolves user-supplied bounds against `now`.
    ///
    /// A missing `to` means `now`. A `to` in the future is moved back a year
    /// at a time until it is not, so a bare date or time that the date parser
    /// placed in the current year reads as its most recent occurrence. `from`
    /// is then moved back a year at a time until it is not after `to`.
    pub fn resolve(
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        let mut to = to.unwrap_or(now);
        while to > now {
            to = previous_year(to);
        }

        let from = from.map(|mut from| {
            while from > to {
                from = previous_year(from);
            }
            from
        });

        Self { from, to: Some(to) }
    }

    /// Returns the part of `session` inside this window, or `None` if the
    /// session is filtered out or does not overlap.
    ///
    /// Overlap is half-open: a session ending exactly at `from`, or starting
    /// exactly at `to`, is excluded.
    pub fn clip<'a>(
        &self,
        session: &'a Session,
        filter: &ProjectFilter,
        now: NaiveDateTime,
    ) -> Option<Clipped<'a>> {
        if !filter.includes(&session.project) {
            return None;
        }

        let mut start = session.clock_in;
        let mut end = session.end_at(now);

        if let Some(from) = self.from {
            if end <= from {
                return None;
            }
            start = start.max(from);
        }

        if let Some(to) = self.to {
            if start >= to {
                return None;
            }
            end = end.min(to);
        }

        Some(Clipped {
            project: &session.project,
            start,
            end,
        })
    }
}

/// Same wall-clock time one year earlier; Feb 29 becomes Feb 28.
fn previous_year(at: NaiveDateTime) -> NaiveDateTime {
    at.checked_sub_months(Months::new(12)).unwrap_or(at)
}
