//! Clock-in/clock-out events and their one-line log encoding.
//!
//! Each line of a user's log is one event:
//!
//! ```text
//! <project> clockin MM-DD-YYYY HH:MM:SS
//! clockout MM-DD-YYYY HH:MM:SS
//! ```
//!
//! Timestamps are local wall-clock times with second resolution.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp layout used in log files.
pub const FILE_DATE_FORMAT: &str = "%m-%d-%Y %H:%M:%S";

/// Separator between the project name and the timestamp on a clock-in line.
pub const CLOCKIN_SEPARATOR: &str = " clockin ";

const CLOCKOUT_PREFIX: &str = "clockout ";

/// Characters that are replaced with `_` in user-supplied names.
///
/// `U+FFFD` marks a log line that was not valid UTF-8, so names never carry it.
const PATH_HOSTILE: [char; 5] = ['/', '\\', ':', '\n', char::REPLACEMENT_CHARACTER];

/// Errors produced while parsing a single log line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line matches neither the clock-in nor the clock-out grammar.
    #[error("unrecognized record: {line:?}")]
    Unrecognized { line: String },

    /// The line was not valid UTF-8 when read from disk.
    #[error("record is not valid UTF-8: {line:?}")]
    InvalidEncoding { line: String },

    /// The timestamp portion could not be parsed.
    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Validation errors for user-supplied names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The name was empty after sanitizing.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The name contains or ends with the clock-in separator and could not
    /// be read back.
    #[error("{field} cannot contain \" clockin \" or end with \" clockin\"")]
    ReservedSeparator { field: &'static str },
}

/// A single record in a user's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Started working on `project` at `at`.
    ClockIn { project: String, at: NaiveDateTime },
    /// Stopped working on whatever was open at `at`.
    ClockOut { at: NaiveDateTime },
}

impl Event {
    /// Creates a clock-in event, dropping sub-second precision.
    pub fn clock_in(project: impl Into<String>, at: NaiveDateTime) -> Self {
        Self::ClockIn {
            project: project.into(),
            at: truncate_to_seconds(at),
        }
    }

    /// Creates a clock-out event, dropping sub-second precision.
    pub fn clock_out(at: NaiveDateTime) -> Self {
        Self::ClockOut {
            at: truncate_to_seconds(at),
        }
    }

    /// When the event happened.
    pub const fn at(&self) -> NaiveDateTime {
        match self {
            Self::ClockIn { at, .. } | Self::ClockOut { at } => *at,
        }
    }

    /// Parses one log line.
    ///
    /// Clock-in lines are split on the first `" clockin "`; anything up to the
    /// first `"clockout "` is ignored on clock-out lines. Surrounding
    /// whitespace (including the trailing newline) is ignored.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();

        if line.contains(char::REPLACEMENT_CHARACTER) {
            return Err(ParseError::InvalidEncoding {
                line: line.to_string(),
            });
        }

        if let Some((project, stamp)) = line.split_once(CLOCKIN_SEPARATOR) {
            return Ok(Self::ClockIn {
                project: project.to_string(),
                at: parse_file_timestamp(stamp)?,
            });
        }

        if let Some((_, stamp)) = line.split_once(CLOCKOUT_PREFIX) {
            return Ok(Self::ClockOut {
                at: parse_file_timestamp(stamp)?,
            });
        }

        Err(ParseError::Unrecognized {
            line: line.to_string(),
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockIn { project, at } => {
                write!(f, "{project}{CLOCKIN_SEPARATOR}{}", at.format(FILE_DATE_FORMAT))
            }
            Self::ClockOut { at } => write!(f, "{CLOCKOUT_PREFIX}{}", at.format(FILE_DATE_FORMAT)),
        }
    }
}

/// Parses a timestamp in [`FILE_DATE_FORMAT`].
pub fn parse_file_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, FILE_DATE_FORMAT).map_err(|source| {
        ParseError::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Drops the fractional-second part of a timestamp.
pub fn truncate_to_seconds(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Replaces path-hostile characters with `_` and trims surrounding whitespace.
pub fn sanitize(name: &str) -> String {
    name.trim().replace(PATH_HOSTILE, "_")
}

/// Sanitizes a project name and checks that it survives a log round trip.
pub fn project_name(raw: &str) -> Result<String, ValidationError> {
    let name = sanitize(raw);
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "project" });
    }
    // "<name> clockin <ts>" is split at the first separator, so a trailing
    // " clockin" would be read back as part of the timestamp.
    if name.contains(CLOCKIN_SEPARATOR) || name.ends_with(CLOCKIN_SEPARATOR.trim_end()) {
        return Err(ValidationError::ReservedSeparator { field: "project" });
    }
    Ok(name)
}
