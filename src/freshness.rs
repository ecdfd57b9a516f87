//! Per-request timestamp capture.
//!
//! # Responsibilities
//! - Capture exactly one instant at pipeline start
//! - Derive every date-bearing injection from that single instant
//!
//! # Design Decisions
//! - One `Freshness` value is threaded through the pipeline instead of
//!   re-reading the clock per injected field, so the updated-time meta,
//!   `<time>` stamps and structured-data dates can never disagree
//! - All rendering is UTC with hand-rolled English month names, keeping
//!   the output independent of process locale

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A single captured instant with its derived representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    instant: DateTime<Utc>,
}

impl Freshness {
    /// Capture the current instant. Called once per request.
    pub fn capture() -> Self {
        Self {
            instant: Utc::now(),
        }
    }

    /// Build from a known instant. Used by tests and by the build-metadata
    /// path of the finalizer.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Full instant, RFC 3339 with millisecond precision and `Z` suffix,
    /// e.g. `2024-01-01T00:00:00.000Z`.
    pub fn iso_instant(&self) -> String {
        self.instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Date-only prefix of [`iso_instant`](Self::iso_instant), always ten
    /// characters (`YYYY-MM-DD`).
    pub fn iso_date(&self) -> String {
        let mut s = self.iso_instant();
        s.truncate(10);
        s
    }

    /// Human-readable `Month D, Year` rendering, e.g. `January 1, 2024`.
    pub fn human_date(&self) -> String {
        format!(
            "{} {}, {}",
            MONTHS[self.instant.month0() as usize],
            self.instant.day(),
            self.instant.year()
        )
    }

    /// RFC 7231 IMF-fixdate rendering for `Last-Modified`.
    pub fn http_date(&self) -> String {
        self.instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}
