//! Per-project totals and calendar bucketing of clipped sessions.
//!
//! Every bucket is computed by clipping the same sessions against a narrower
//! window, so daily, weekly and monthly figures always add up to the totals.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::session::Session;
use crate::window::{ProjectFilter, TimeWindow};

/// Time per project inside a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Ordered by project name.
    pub per_project: BTreeMap<String, Duration>,
    pub total: Duration,
}

impl Summary {
    /// Sums the clipped duration of every session that survives the window
    /// and filter.
    pub fn compute<I, S>(
        sessions: I,
        window: &TimeWindow,
        filter: &ProjectFilter,
        now: NaiveDateTime,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Borrow<Session>,
    {
        let mut summary = Self::default();
        for session in sessions {
            let session: &Session = session.borrow();
            if let Some(clipped) = window.clip(session, filter, now) {
                let duration = clipped.duration();
                *summary
                    .per_project
                    .entry(clipped.project.to_string())
                    .or_insert_with(Duration::zero) += duration;
                summary.total += duration;
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.per_project.is_empty()
    }
}

/// Time counted on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub duration: Duration,
}

/// Active days of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayTotal>,
}

impl MonthTotal {
    pub fn total(&self) -> Duration {
        sum(self.days.iter().map(|d| d.duration))
    }
}

/// Active days of one Sunday-starting week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekTotal {
    /// The Sunday the week starts on.
    pub start: NaiveDate,
    pub days: Vec<DayTotal>,
}

impl WeekTotal {
    pub fn total(&self) -> Duration {
        sum(self.days.iter().map(|d| d.duration))
    }
}

/// One week of a weekly report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBreakdown {
    /// The Sunday the week starts on.
    pub start: NaiveDate,
    pub per_project: BTreeMap<String, Duration>,
    pub total: Duration,
}

/// Splits the counted time into calendar days.
///
/// Each day `D` between the first and last counted instant is summarized
/// over `[max(D, from), min(D + 1 day, to))`. Only days with strictly
/// positive time are returned, in date order.
pub fn daily_totals<S: Borrow<Session>>(
    sessions: &[S],
    window: &TimeWindow,
    filter: &ProjectFilter,
    now: NaiveDateTime,
) -> Vec<DayTotal> {
    let Some((first, last)) = counted_span(sessions, window, filter, now) else {
        return Vec::new();
    };

    let mut days = Vec::new();
    let mut day = first.date();
    while day <= last.date() {
        let day_start = day.and_time(NaiveTime::MIN);
        let bucket = TimeWindow::new(
            Some(day_start.max(first)),
            Some((day_start + Duration::days(1)).min(last)),
        );
        let duration = Summary::compute(iter(sessions), &bucket, filter, now).total;
        if duration > Duration::zero() {
            days.push(DayTotal { date: day, duration });
        }

        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    days
}

/// Daily totals for each project that has counted time, keyed by project.
pub fn project_days<S: Borrow<Session>>(
    sessions: &[S],
    window: &TimeWindow,
    filter: &ProjectFilter,
    now: NaiveDateTime,
) -> BTreeMap<String, Vec<DayTotal>> {
    let summary = Summary::compute(iter(sessions), window, filter, now);
    summary
        .per_project
        .into_keys()
        .map(|project| {
            let only = ProjectFilter::from_names([project.clone()]);
            let days = daily_totals(sessions, window, &only, now);
            (project, days)
        })
        .collect()
}

/// The Sunday starting the week that contains `date`.
pub fn week_for(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Groups date-ordered days by `(year, month)`.
pub fn group_by_month(days: &[DayTotal]) -> Vec<MonthTotal> {
    let mut months: BTreeMap<(i32, u32), Vec<DayTotal>> = BTreeMap::new();
    for day in days {
        months
            .entry((day.date.year(), day.date.month()))
            .or_default()
            .push(*day);
    }
    months
        .into_iter()
        .map(|((year, month), days)| MonthTotal { year, month, days })
        .collect()
}

/// Groups date-ordered days into Sunday-starting weeks.
pub fn group_by_week(days: &[DayTotal]) -> Vec<WeekTotal> {
    let mut weeks: BTreeMap<NaiveDate, Vec<DayTotal>> = BTreeMap::new();
    for day in days {
        weeks.entry(week_for(day.date)).or_default().push(*day);
    }
    weeks
        .into_iter()
        .map(|(start, days)| WeekTotal { start, days })
        .collect()
}

/// Per-project time for every week with counted time, oldest first.
pub fn weekly_breakdown<S: Borrow<Session>>(
    sessions: &[S],
    window: &TimeWindow,
    filter: &ProjectFilter,
    now: NaiveDateTime,
) -> Vec<WeekBreakdown> {
    let mut weeks: BTreeMap<NaiveDate, WeekBreakdown> = BTreeMap::new();

    for (project, days) in project_days(sessions, window, filter, now) {
        for week in group_by_week(&days) {
            let total = week.total();
            let entry = weeks.entry(week.start).or_insert_with(|| WeekBreakdown {
                start: week.start,
                per_project: BTreeMap::new(),
                total: Duration::zero(),
            });
            entry.per_project.insert(project.clone(), total);
            entry.total += total;
        }
    }

    weeks.into_values().collect()
}

/// Whole hours and leftover whole minutes; seconds are truncated.
pub fn hours_and_minutes(duration: Duration) -> (i64, i64) {
    let seconds = duration.num_seconds().max(0);
    (seconds / 3600, (seconds % 3600) / 60)
}

/// Formats a duration as `"H hours, M minutes"`, or just minutes under an hour.
pub fn format_duration(duration: Duration) -> String {
    let (hours, minutes) = hours_and_minutes(duration);
    let minute_word = if minutes == 1 { "minute" } else { "minutes" };
    if hours == 0 {
        return format!("{minutes} {minute_word}");
    }
    let hour_word = if hours == 1 { "hour" } else { "hours" };
    format!("{hours} {hour_word}, {minutes} {minute_word}")
}

/// Hours rounded to the nearest quarter hour.
#[allow(clippy::cast_precision_loss)]
pub fn quarter_hours(duration: Duration) -> f64 {
    let hours = duration.num_seconds().max(0) as f64 / 3600.0;
    (hours * 4.0).round() / 4.0
}

/// Earliest start and latest end of the counted parts of all sessions.
fn counted_span<S: Borrow<Session>>(
    sessions: &[S],
    window: &TimeWindow,
    filter: &ProjectFilter,
    now: NaiveDateTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    iter(sessions)
        .filter_map(|s| window.clip(s, filter, now))
        .map(|c| (c.start, c.end))
        .reduce(|(a_start, a_end), (b_start, b_end)| (a_start.min(b_start), a_end.max(b_end)))
}

fn iter<S: Borrow<Session>>(sessions: &[S]) -> impl Iterator<Item = &Session> {
    sessions.iter().map(Borrow::borrow)
}

fn sum(durations: impl Iterator<Item = Duration>) -> Duration {
    durations.fold(Duration::zero(), |acc, d| acc + d)
}
