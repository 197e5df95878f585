//! Clock collaborator and the fixed timestamp text format.
//!
//! # Invariants
//! - Every stored timestamp is UTC in `DATETIME_FORMAT`.
//! - `MAX_DATETIME` uses the same format, so plain text comparison in SQL
//!   orders it after every real instant.

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Text format of every persisted timestamp.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sentinel soft-delete timestamp meaning "not deleted".
pub const MAX_DATETIME: &str = "9999-12-31 23:59:59";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> NaiveDateTime;

    /// Current UTC instant rendered in `DATETIME_FORMAT`.
    fn now_string(&self) -> String {
        format_datetime(self.now())
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock pinned to one instant; used for deterministic timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: NaiveDateTime,
}

impl FixedClock {
    pub fn new(instant: NaiveDateTime) -> Self {
        Self { instant }
    }

    /// Builds a fixed clock from text in `DATETIME_FORMAT`.
    pub fn parse(value: &str) -> Option<Self> {
        parse_datetime(value).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }
}

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parses text in `DATETIME_FORMAT`; `None` for empty or malformed input.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT).ok()
}

/// Sentinel as a typed value.
pub fn max_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .unwrap_or(NaiveDateTime::MAX)
}
