//! Summary command: time per project over a date range.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ct_core::aggregate::{
    group_by_month, hours_and_minutes, project_days, quarter_hours, weekly_breakdown,
};
use ct_core::{
    DayTotal, ProjectFilter, Reconstruction, RecordIssue, Session, Summary, TimeWindow,
    format_duration, parse_user_date, reconstruct,
};
use ct_store::{LogStore, read_log};
use serde::Serialize;

use super::Context;
use crate::cli::{SummaryArgs, SummaryFormat};

/// One user's reconstructed log.
#[derive(Debug)]
pub struct UserSessions {
    pub user: String,
    pub path: PathBuf,
    pub sessions: Vec<Session>,
    pub issues: Vec<RecordIssue>,
}

/// The window, filter and evaluation time every renderer works from.
#[derive(Debug, Clone)]
pub struct Query {
    pub window: TimeWindow,
    pub filter: ProjectFilter,
    pub now: NaiveDateTime,
}

impl Query {
    pub fn from_args(args: &SummaryArgs, now: NaiveDateTime) -> Result<Self> {
        let from = args
            .from
            .as_deref()
            .map(|input| parse_user_date(input, now))
            .transpose()?;
        let to = args
            .to
            .as_deref()
            .map(|input| parse_user_date(input, now))
            .transpose()?;

        Ok(Self {
            window: TimeWindow::resolve(from, to, now),
            filter: ProjectFilter::from_names(args.project_names()),
            now,
        })
    }
}

pub fn run<W: Write>(writer: &mut W, ctx: &Context, args: &SummaryArgs) -> Result<()> {
    let query = Query::from_args(args, ctx.now)?;
    tracing::debug!(window = ?query.window, filter = ?query.filter, "summarizing");

    let users = load_all(&ctx.store)?;
    render(writer, args.format, &users, &query)
}

/// Reconstructs every user's log in the working directory.
///
/// Corrupt records are logged and collected; they never abort the summary.
/// Unreadable files do.
pub fn load_all(store: &LogStore) -> Result<Vec<UserSessions>> {
    let mut users = Vec::new();
    for log in store.list_user_files()? {
        let lines = read_log(&log.path)?.unwrap_or_default();
        let Reconstruction { sessions, issues } = reconstruct(&lines);
        for issue in &issues {
            tracing::warn!(file = %log.path.display(), "skipping corrupt record: {issue}");
        }
        users.push(UserSessions {
            user: log.user,
            path: log.path,
            sessions,
            issues,
        });
    }
    Ok(users)
}

pub fn render<W: Write>(
    writer: &mut W,
    format: SummaryFormat,
    users: &[UserSessions],
    query: &Query,
) -> Result<()> {
    match format {
        SummaryFormat::Plain => render_plain(writer, users, query),
        SummaryFormat::Pretty => render_pretty(writer, users, query),
        SummaryFormat::Weekly => render_weekly(writer, users, query),
        SummaryFormat::Csv => render_csv(writer, users, query),
        SummaryFormat::Json => render_json(writer, users, query),
    }
}

fn all_sessions(users: &[UserSessions]) -> Vec<&Session> {
    users.iter().flat_map(|u| u.sessions.iter()).collect()
}

fn render_plain<W: Write>(writer: &mut W, users: &[UserSessions], query: &Query) -> Result<()> {
    let summary = Summary::compute(all_sessions(users), &query.window, &query.filter, query.now);

    for (project, duration) in &summary.per_project {
        writeln!(writer, "{project}: {}", format_duration(*duration))?;
    }
    if !summary.is_empty() {
        writeln!(writer)?;
    }
    writeln!(writer, "Total: {}", format_duration(summary.total))?;

    skipped_note(writer, users)
}

fn render_pretty<W: Write>(writer: &mut W, users: &[UserSessions], query: &Query) -> Result<()> {
    for (i, user) in users.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", user.user)?;

        let summary = Summary::compute(&user.sessions, &query.window, &query.filter, query.now);
        let by_project = project_days(&user.sessions, &query.window, &query.filter, query.now);

        for (project, days) in &by_project {
            writeln!(writer, "{project}")?;

            let months = group_by_month(days);
            if months.len() > 1 {
                for month in &months {
                    if let Some(first) = month.days.first() {
                        writeln!(writer, "  {}", first.date.format("%B %Y"))?;
                    }
                    write_days(writer, &month.days, 4)?;
                }
            } else {
                write_days(writer, days, 2)?;
            }

            let total = summary
                .per_project
                .get(project)
                .copied()
                .unwrap_or_else(Duration::zero);
            writeln!(writer, "  Total: {}", format_duration(total))?;
        }

        if !summary.is_empty() {
            writeln!(writer)?;
        }
        writeln!(writer, "Total: {}", format_duration(summary.total))?;
    }

    skipped_note(writer, users)
}

fn write_days<W: Write>(writer: &mut W, days: &[DayTotal], indent: usize) -> Result<()> {
    for day in days {
        writeln!(
            writer,
            "{:indent$}{}: {}",
            "",
            day.date.format("%Y-%m-%d"),
            format_duration(day.duration)
        )?;
    }
    Ok(())
}

fn render_weekly<W: Write>(writer: &mut W, users: &[UserSessions], query: &Query) -> Result<()> {
    let sessions = all_sessions(users);
    let weeks = weekly_breakdown(&sessions, &query.window, &query.filter, query.now);

    if weeks.is_empty() {
        writeln!(writer, "No time recorded.")?;
        return Ok(());
    }

    for (i, week) in weeks.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Week of {}", week.start.format("%Y-%m-%d"))?;
        for (project, duration) in &week.per_project {
            writeln!(writer, "  {project}: {:.2}", quarter_hours(*duration))?;
        }
        writeln!(writer, "  Total: {:.2}", quarter_hours(week.total))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    user: &'a str,
    date: String,
    project: &'a str,
    hours: String,
}

fn render_csv<W: Write>(writer: &mut W, users: &[UserSessions], query: &Query) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(&mut *writer);
    out.write_record(["user", "date", "project", "hours"])?;

    for user in users {
        let by_project = project_days(&user.sessions, &query.window, &query.filter, query.now);
        let mut rows: Vec<(NaiveDate, &str, Duration)> = by_project
            .iter()
            .flat_map(|(project, days)| {
                days.iter()
                    .map(move |day| (day.date, project.as_str(), day.duration))
            })
            .collect();
        rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        for (date, project, duration) in rows {
            out.serialize(CsvRow {
                user: &user.user,
                date: date.format("%Y-%m-%d").to_string(),
                project,
                hours: format!("{:.2}", quarter_hours(duration)),
            })?;
        }
    }

    out.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonDuration {
    seconds: i64,
    hours: i64,
    minutes: i64,
}

impl From<Duration> for JsonDuration {
    fn from(duration: Duration) -> Self {
        let (hours, minutes) = hours_and_minutes(duration);
        Self {
            seconds: duration.num_seconds(),
            hours,
            minutes,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonProject<'a> {
    project: &'a str,
    #[serde(flatten)]
    duration: JsonDuration,
}

#[derive(Debug, Serialize)]
struct JsonIssue<'a> {
    user: &'a str,
    line: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    window: TimeWindow,
    projects: Vec<JsonProject<'a>>,
    total: JsonDuration,
    skipped: Vec<JsonIssue<'a>>,
}

fn render_json<W: Write>(writer: &mut W, users: &[UserSessions], query: &Query) -> Result<()> {
    let summary = Summary::compute(all_sessions(users), &query.window, &query.filter, query.now);

    let output = JsonSummary {
        window: query.window,
        projects: summary
            .per_project
            .iter()
            .map(|(project, duration)| JsonProject {
                project,
                duration: (*duration).into(),
            })
            .collect(),
        total: summary.total.into(),
        skipped: users
            .iter()
            .flat_map(|user| {
                user.issues.iter().map(|issue| JsonIssue {
                    user: &user.user,
                    line: issue.line(),
                    message: issue.to_string(),
                })
            })
            .collect(),
    };

    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

fn skipped_note<W: Write>(writer: &mut W, users: &[UserSessions]) -> Result<()> {
    let records: usize = users.iter().map(|u| u.issues.len()).sum();
    if records == 0 {
        return Ok(());
    }
    let files = users.iter().filter(|u| !u.issues.is_empty()).count();

    writeln!(writer)?;
    writeln!(
        writer,
        "Skipped {records} corrupt record{} in {files} log file{}; see warnings.",
        if records == 1 { "" } else { "s" },
        if files == 1 { "" } else { "s" },
    )?;
    Ok(())
}
