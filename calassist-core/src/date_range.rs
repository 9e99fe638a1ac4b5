//! Date range for filtering events.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};

use crate::error::{CalAssistResult, ValidationError};
use crate::time::{CanonicalTime, EventTime, Normalizer};

/// Date range for filtering events.
/// None values mean unbounded in that direction. Both bounds are inclusive:
/// `from` applies to an event's start, `to` to its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        DateRange { from, to }
    }

    pub fn unbounded() -> Self {
        DateRange::default()
    }

    /// Parse user-supplied bounds.
    /// - `from`: "start" for unbounded, `YYYY-MM-DD` (start of that day), or a timestamp
    /// - `to`: `YYYY-MM-DD` (end of that day) or a timestamp
    ///
    /// Zone-less input is anchored by `normalizer`.
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        normalizer: &Normalizer,
    ) -> CalAssistResult<Self> {
        let from_dt = match from {
            None | Some("start") => None,
            Some(s) => Some(parse_bound(s, normalizer, Bound::Start)?),
        };

        let to_dt = match to {
            None => None,
            Some(s) => Some(parse_bound(s, normalizer, Bound::End)?),
        };

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// The whole of `date`.
    pub fn day(date: NaiveDate, normalizer: &Normalizer) -> Self {
        Self::days(date, date, normalizer)
    }

    /// Monday through Sunday of the week containing `date`. Weeks cut off by
    /// the calendar limits are clamped to them.
    pub fn week(date: NaiveDate, normalizer: &Normalizer) -> Self {
        let since_monday = u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_days(Days::new(since_monday)).unwrap_or(NaiveDate::MIN);
        let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        Self::days(monday, sunday, normalizer)
    }

    /// First through last day of the month containing `date`.
    pub fn month(date: NaiveDate, normalizer: &Normalizer) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(date);
        Self::days(first, last, normalizer)
    }

    /// `days` either side of `now`. A side that runs past the calendar
    /// limits is left unbounded.
    pub fn around(now: DateTime<Utc>, days: i64) -> Self {
        let span = days.checked_abs().and_then(Duration::try_days);
        DateRange {
            from: span.and_then(|s| now.checked_sub_signed(s)),
            to: span.and_then(|s| now.checked_add_signed(s)),
        }
    }

    fn days(first: NaiveDate, last: NaiveDate, normalizer: &Normalizer) -> Self {
        DateRange {
            from: normalizer.start_of_day(first).instant(),
            to: normalizer.end_of_day(last).instant(),
        }
    }

    pub fn admits_start(&self, start: CanonicalTime) -> bool {
        match self.from {
            Some(from) => start >= CanonicalTime::At(from),
            None => true,
        }
    }

    pub fn admits_end(&self, end: CanonicalTime) -> bool {
        match (self.to, end) {
            (None, _) => true,
            (Some(_), CanonicalTime::Unknown) => false,
            (Some(to), end) => end <= CanonicalTime::At(to),
        }
    }

    /// Get `from` as RFC3339 string, using a very old date if unbounded.
    pub fn from_rfc3339(&self) -> String {
        self.from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH).to_rfc3339()
    }

    /// Get `to` as RFC3339 string, using a far future date if unbounded.
    pub fn to_rfc3339(&self) -> String {
        self.to
            .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH + Duration::days(365 * 130))
            .to_rfc3339()
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(s: &str, normalizer: &Normalizer, bound: Bound) -> CalAssistResult<DateTime<Utc>> {
    let time = EventTime::parse_strict(s)?;
    let canonical = match (&time, bound) {
        (EventTime::Date(d), Bound::Start) => normalizer.start_of_day(*d),
        (EventTime::Date(d), Bound::End) => normalizer.end_of_day(*d),
        _ => normalizer.normalize(&time),
    };
    canonical
        .instant()
        .ok_or_else(|| ValidationError::InvalidTimestamp(s.to_string()).into())
}
