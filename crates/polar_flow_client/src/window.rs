//! Date windows for the activity calendar query.

use chrono::{Duration, Local, NaiveDateTime};

/// Length of the window used when no start bound is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Resolved bounds of an activity listing.
///
/// No ordering is enforced between the bounds; an inverted window is sent to
/// the service as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Resolve optional bounds against the local wall clock.
    ///
    /// `end` defaults to now, `start` to [`DEFAULT_WINDOW_DAYS`] before `end`,
    /// clamped to the earliest representable timestamp.
    pub fn resolve(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self::resolve_at(start, end, Local::now().naive_local())
    }

    pub fn resolve_at(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        let end = end.unwrap_or(now);
        let start = start.unwrap_or_else(|| {
            end.checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
                .unwrap_or(NaiveDateTime::MIN)
        });
        Self { start, end }
    }

    /// `start`/`end` query pairs in the calendar endpoint's date format.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start", format_flow_date(&self.start)),
            ("end", format_flow_date(&self.end)),
        ]
    }
}

/// Format a timestamp as `dd.mm.yyyy`, the only form the calendar endpoint accepts.
pub fn format_flow_date(dt: &NaiveDateTime) -> String {
    dt.format("%d.%m.%Y").to_string()
}
