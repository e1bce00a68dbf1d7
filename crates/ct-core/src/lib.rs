//! Core domain logic for the ct time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: the one-line clockin/clockout log records
//! - Sessions: pairing events into intervals, and the current clock state
//! - Windows: clipping sessions to a query range and project filter
//! - Aggregation: per-project totals and day/week/month buckets
//! - Clock commands: deciding what clockin/clockout/toggle append
//!
//! Nothing here reads the clock. Every function that needs the current time
//! takes `now` as an argument.

pub mod aggregate;
pub mod clock;
pub mod date;
pub mod event;
pub mod session;
pub mod window;

pub use aggregate::{DayTotal, MonthTotal, Summary, WeekBreakdown, WeekTotal, format_duration};
pub use clock::{ClockError, ClockPlan};
pub use date::{DateParseError, parse_user_date};
pub use event::{Event, ParseError, ValidationError};
pub use session::{ClockState, Reconstruction, RecordIssue, Session, SessionEnd, reconstruct};
pub use window::{ProjectFilter, TimeWindow};
