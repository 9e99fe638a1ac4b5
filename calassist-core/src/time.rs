//! Timestamp representations and normalization.
//!
//! Events arrive with timestamps in several shapes: UTC (`...Z`), explicit
//! offsets (`...+02:00`), zone-less date-times and bare dates. [`EventTime`]
//! keeps the shape it was given so it can be written back unchanged, and
//! [`Normalizer`] turns any of them into a [`CanonicalTime`] that compares
//! by instant.
//!
//! Zone-less values are always anchored in the normalizer's configured zone.
//! There is no other anchoring rule anywhere in the crate.

use std::fmt;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalAssistError, CalAssistResult, ValidationError};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest DST gap we step across when anchoring a nonexistent local time.
const MAX_GAP_MINUTES: i64 = 180;

/// A timestamp as it was ingested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTime {
    /// ISO-8601 with a `Z` marker.
    Utc(DateTime<Utc>),
    /// ISO-8601 with an explicit numeric offset.
    Offset(DateTime<FixedOffset>),
    /// Date and time without any zone information.
    Floating(NaiveDateTime),
    /// Bare `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Text that could not be read as a timestamp. Kept verbatim.
    Invalid(String),
}

impl EventTime {
    /// Parse text into an `EventTime`. Never fails: unreadable input becomes
    /// [`EventTime::Invalid`].
    pub fn parse(input: &str) -> Self {
        let s = input.trim();

        if let Some(naive) = s.strip_suffix(['Z', 'z']) {
            return match parse_naive(naive) {
                Some(dt) => EventTime::Utc(dt.and_utc()),
                None => EventTime::Invalid(input.to_string()),
            };
        }

        if let Some(dt) = parse_with_offset(s) {
            return EventTime::Offset(dt);
        }

        if let Some(dt) = parse_naive(s) {
            return EventTime::Floating(dt);
        }

        if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return EventTime::Date(d);
        }

        EventTime::Invalid(input.to_string())
    }

    /// Parse text, rejecting anything that is not a timestamp.
    pub fn parse_strict(input: &str) -> Result<Self, ValidationError> {
        match Self::parse(input) {
            EventTime::Invalid(raw) => Err(ValidationError::InvalidTimestamp(raw)),
            t => Ok(t),
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, EventTime::Invalid(_))
    }

    /// Shift by a duration, keeping the representation. `None` when the
    /// result falls outside the representable range.
    ///
    /// Dates stay dates when shifted by whole days; otherwise they become
    /// floating date-times at midnight plus the duration.
    pub fn shifted(&self, by: Duration) -> Option<Self> {
        Some(match self {
            EventTime::Utc(dt) => EventTime::Utc(dt.checked_add_signed(by)?),
            EventTime::Offset(dt) => EventTime::Offset(dt.checked_add_signed(by)?),
            EventTime::Floating(dt) => EventTime::Floating(dt.checked_add_signed(by)?),
            EventTime::Date(d) => {
                if by.num_seconds() % 86_400 == 0 && by.subsec_nanos() == 0 {
                    EventTime::Date(d.checked_add_signed(by)?)
                } else {
                    EventTime::Floating(d.and_time(NaiveTime::MIN).checked_add_signed(by)?)
                }
            }
            EventTime::Invalid(raw) => EventTime::Invalid(raw.clone()),
        })
    }

    /// [`EventTime::shifted`], reporting an out-of-range result as an
    /// invalid timestamp.
    pub fn try_shifted(&self, by: Duration) -> Result<Self, ValidationError> {
        self.shifted(by)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("{self} + {by}")))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Utc(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            EventTime::Offset(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            EventTime::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            EventTime::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            EventTime::Invalid(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EventTime::parse(&raw))
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(dt: DateTime<Utc>) -> Self {
        EventTime::Utc(dt)
    }
}

impl From<DateTime<FixedOffset>> for EventTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        EventTime::Offset(dt)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(dt: NaiveDateTime) -> Self {
        EventTime::Floating(dt)
    }
}

impl From<NaiveDate> for EventTime {
    fn from(d: NaiveDate) -> Self {
        EventTime::Date(d)
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        DateTime::parse_from_str(s, &format!("{fmt}%:z"))
            .or_else(|_| DateTime::parse_from_str(s, &format!("{fmt}%z")))
            .ok()
    })
}

/// The comparable form of a timestamp.
///
/// `Unknown` orders before every instant so that sorting stays total when a
/// record carries an unreadable timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalTime {
    Unknown,
    At(DateTime<Utc>),
}

impl CanonicalTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            CanonicalTime::Unknown => None,
            CanonicalTime::At(dt) => Some(*dt),
        }
    }
}

/// Resolves [`EventTime`] values to instants, anchoring zone-less values in
/// one configured zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    zone: Tz,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::utc()
    }
}

impl Normalizer {
    pub fn new(zone: Tz) -> Self {
        Normalizer { zone }
    }

    pub fn utc() -> Self {
        Normalizer { zone: Tz::UTC }
    }

    /// Build from a zone name: an IANA name, `UTC`, or `local` for the host zone.
    pub fn from_name(name: &str) -> CalAssistResult<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("utc") {
            return Ok(Normalizer::utc());
        }

        let resolved = if name.eq_ignore_ascii_case("local") {
            iana_time_zone::get_timezone()
                .map_err(|e| CalAssistError::Config(format!("Could not detect local timezone: {e}")))?
        } else {
            name.to_string()
        };

        let zone: Tz = resolved
            .parse()
            .map_err(|_| CalAssistError::Config(format!("Unknown timezone '{}'", resolved)))?;
        Ok(Normalizer { zone })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn normalize(&self, time: &EventTime) -> CanonicalTime {
        match time {
            EventTime::Utc(dt) => CanonicalTime::At(*dt),
            EventTime::Offset(dt) => CanonicalTime::At(dt.with_timezone(&Utc)),
            EventTime::Floating(dt) => self.anchor(*dt),
            EventTime::Date(d) => self.anchor(d.and_time(NaiveTime::MIN)),
            EventTime::Invalid(_) => CanonicalTime::Unknown,
        }
    }

    pub fn normalize_str(&self, input: &str) -> CanonicalTime {
        self.normalize(&EventTime::parse(input))
    }

    /// Midnight at the start of `date` in the configured zone.
    pub fn start_of_day(&self, date: NaiveDate) -> CanonicalTime {
        self.anchor(date.and_time(NaiveTime::MIN))
    }

    /// Midnight at the start of the day after `date`.
    pub fn end_of_day(&self, date: NaiveDate) -> CanonicalTime {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next),
            None => CanonicalTime::Unknown,
        }
    }

    /// Calendar date of an instant as seen in the configured zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.zone).date_naive()
    }

    fn anchor(&self, naive: NaiveDateTime) -> CanonicalTime {
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => CanonicalTime::At(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _) => CanonicalTime::At(earlier.with_timezone(&Utc)),
            // Nonexistent wall time: take the first valid minute after the gap.
            LocalResult::None => (1..=MAX_GAP_MINUTES)
                .find_map(|m| {
                    let shifted = naive.checked_add_signed(Duration::minutes(m))?;
                    self.zone.from_local_datetime(&shifted).earliest()
                })
                .map(|dt| CanonicalTime::At(dt.with_timezone(&Utc)))
                .unwrap_or(CanonicalTime::Unknown),
        }
    }
}
