//! Date windows: filter boundaries resolved to epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use gptk_model::{DateType, Filter, IntervalType, MediaItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub lower: i64,
    pub upper: i64,
    pub interval: IntervalType,
}

impl DateWindow {
    pub fn unbounded() -> Self {
        Self {
            lower: i64::MIN,
            upper: i64::MAX,
            interval: IntervalType::Include,
        }
    }

    /// Resolves the filter's date bounds. Missing or unparseable bounds stay
    /// open on that side.
    pub fn from_filter(filter: &Filter) -> Self {
        Self {
            lower: parse_boundary(filter.lower_boundary_date.as_deref(), Edge::Lower)
                .unwrap_or(i64::MIN),
            upper: parse_boundary(filter.higher_boundary_date.as_deref(), Edge::Upper)
                .unwrap_or(i64::MAX),
            interval: filter.interval_type,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower == i64::MIN && self.upper == i64::MAX
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.lower <= ts && ts <= self.upper
    }

    /// Whether an item stamped `ts` survives this window. An unknown stamp is
    /// never inside the window.
    pub fn keeps(&self, ts: Option<i64>) -> bool {
        let inside = ts.is_some_and(|ts| self.contains(ts));
        match self.interval {
            IntervalType::Include => inside,
            IntervalType::Exclude => !inside,
        }
    }
}

/// Which side of a window a boundary closes. A bare date closes the upper side
/// at the last millisecond of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Lower,
    Upper,
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and `YYYY-MM-DD`.
pub fn parse_boundary(raw: Option<&str>, edge: Edge) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = match edge {
        Edge::Lower => NaiveTime::MIN,
        Edge::Upper => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?,
    };
    Some(date.and_time(time).and_utc().timestamp_millis())
}

/// The timestamp a filter's date criteria look at.
pub fn item_date(item: &MediaItem, date_type: DateType) -> Option<i64> {
    match date_type {
        DateType::Taken => item.timestamp,
        DateType::Uploaded => item.creation_timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_cover_the_whole_day() {
        let lower = parse_boundary(Some("2024-03-01"), Edge::Lower).unwrap();
        let upper = parse_boundary(Some("2024-03-01"), Edge::Upper).unwrap();
        assert_eq!(upper - lower, 24 * 60 * 60 * 1_000 - 1);
    }

    #[test]
    fn invalid_bounds_are_open() {
        let filter = Filter {
            lower_boundary_date: Some("not a date".into()),
            higher_boundary_date: Some("2024-01-01T00:00:00Z".into()),
            ..Filter::default()
        };
        let window = DateWindow::from_filter(&filter);
        assert_eq!(window.lower, i64::MIN);
        assert_eq!(window.upper, 1_704_067_200_000);
    }

    #[test]
    fn unknown_timestamps_are_never_inside() {
        let include = DateWindow {
            lower: 0,
            upper: 10,
            interval: IntervalType::Include,
        };
        let exclude = DateWindow {
            interval: IntervalType::Exclude,
            ..include
        };
        assert!(include.keeps(Some(10)));
        assert!(!include.keeps(None));
        assert!(!exclude.keeps(Some(0)));
        assert!(exclude.keeps(Some(11)));
        assert!(exclude.keeps(None));
    }
}
