//! Filtering and windowing over event lists.
//!
//! Everything here works on plain slices so the same projections apply to
//! the local store and to merged local+remote listings.

use chrono::{DateTime, NaiveDate, Utc};

use crate::date_range::DateRange;
use crate::event::CalendarEvent;
use crate::time::Normalizer;

/// Text and date filters. All supplied filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    /// Case-insensitive substring of the title or description.
    pub text: Option<String>,
    pub range: DateRange,
}

impl EventQuery {
    pub fn text(text: impl Into<String>) -> Self {
        EventQuery {
            text: Some(text.into()),
            range: DateRange::unbounded(),
        }
    }

    pub fn in_range(range: DateRange) -> Self {
        EventQuery { text: None, range }
    }

    pub fn matches(&self, event: &CalendarEvent, normalizer: &Normalizer) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let in_title = event.title.to_lowercase().contains(&needle);
            let in_description = event
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }

        self.range.admits_start(event.start(normalizer))
            && self.range.admits_end(event.end(normalizer))
    }
}

/// Day/week/month windows and upcoming projections over event lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    normalizer: Normalizer,
}

impl QueryEngine {
    pub fn new(normalizer: Normalizer) -> Self {
        QueryEngine { normalizer }
    }

    /// Events matching `query`, ascending by start. Ties keep input order.
    pub fn filter<'e>(&self, events: &'e [CalendarEvent], query: &EventQuery) -> Vec<&'e CalendarEvent> {
        let mut matched: Vec<&CalendarEvent> = events
            .iter()
            .filter(|e| query.matches(e, &self.normalizer))
            .collect();
        self.sort(&mut matched);
        matched
    }

    pub fn search<'e>(
        &self,
        events: &'e [CalendarEvent],
        text: &str,
        range: DateRange,
    ) -> Vec<&'e CalendarEvent> {
        self.filter(
            events,
            &EventQuery {
                text: Some(text.to_string()),
                range,
            },
        )
    }

    pub fn day<'e>(&self, events: &'e [CalendarEvent], date: NaiveDate) -> Vec<&'e CalendarEvent> {
        self.filter(events, &EventQuery::in_range(DateRange::day(date, &self.normalizer)))
    }

    pub fn week<'e>(&self, events: &'e [CalendarEvent], date: NaiveDate) -> Vec<&'e CalendarEvent> {
        self.filter(events, &EventQuery::in_range(DateRange::week(date, &self.normalizer)))
    }

    pub fn month<'e>(&self, events: &'e [CalendarEvent], date: NaiveDate) -> Vec<&'e CalendarEvent> {
        self.filter(events, &EventQuery::in_range(DateRange::month(date, &self.normalizer)))
    }

    /// The first `limit` events starting at or after `now`.
    pub fn upcoming<'e>(
        &self,
        events: &'e [CalendarEvent],
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<&'e CalendarEvent> {
        let mut upcoming = self.filter(events, &EventQuery::in_range(DateRange::new(Some(now), None)));
        upcoming.truncate(limit);
        upcoming
    }

    /// Today's date in the configured zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.normalizer.local_date(now)
    }

    /// Stable sort by normalized start.
    pub fn sort(&self, events: &mut [&CalendarEvent]) {
        events.sort_by_key(|e| e.start(&self.normalizer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use crate::time::EventTime;
    use chrono::TimeZone;

    fn event(title: &str, start: &str, end: &str) -> CalendarEvent {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        CalendarEvent::create(
            NewEvent::new(title, EventTime::parse(start), EventTime::parse(end)),
            &Normalizer::utc(),
            now,
        )
        .unwrap()
    }

    fn titles(events: &[&CalendarEvent]) -> Vec<String> {
        events.iter().map(|e| e.title.clone()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<CalendarEvent> {
        vec![
            event("Review", "2025-06-02T14:00:00", "2025-06-02T15:00:00"),
            event("Standup", "2025-06-02T09:00:00", "2025-06-02T09:15:00"),
            event("Offsite", "2025-06-04T09:00:00", "2025-06-04T17:00:00"),
            event("Late call", "2025-06-02T23:30:00", "2025-06-03T00:30:00"),
            event("Retro", "2025-06-09T10:00:00", "2025-06-09T11:00:00"),
        ]
    }

    #[test]
    fn test_day_window_sorted() {
        let engine = QueryEngine::default();
        let events = sample();
        let day = engine.day(&events, date(2025, 6, 2));
        // "Late call" ends after the day and is excluded by the end filter.
        assert_eq!(titles(&day), vec!["Standup", "Review"]);
    }

    #[test]
    fn test_week_window() {
        let engine = QueryEngine::default();
        let events = sample();
        let week = engine.week(&events, date(2025, 6, 4));
        assert_eq!(titles(&week), vec!["Standup", "Review", "Late call", "Offsite"]);
    }

    #[test]
    fn test_month_window() {
        let engine = QueryEngine::default();
        let events = sample();
        assert_eq!(engine.month(&events, date(2025, 6, 30)).len(), 5);
        assert!(engine.month(&events, date(2025, 7, 1)).is_empty());
    }

    #[test]
    fn test_text_matches_title_or_description() {
        let engine = QueryEngine::default();
        let mut events = sample();
        events[2].description = Some("Planning the Q3 ROADMAP".into());

        let hits = engine.filter(&events, &EventQuery::text("roadmap"));
        assert_eq!(titles(&hits), vec!["Offsite"]);

        let hits = engine.filter(&events, &EventQuery::text("STAND"));
        assert_eq!(titles(&hits), vec!["Standup"]);
    }

    #[test]
    fn test_filters_are_anded() {
        let engine = QueryEngine::default();
        let events = sample();
        let n = Normalizer::utc();
        let hits = engine.search(
            &events,
            "re",
            DateRange::from_args(Some("2025-06-03"), None, &n).unwrap(),
        );
        assert_eq!(titles(&hits), vec!["Retro"]);
    }

    #[test]
    fn test_upcoming_limits_and_orders() {
        let engine = QueryEngine::default();
        let events = sample();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        // Standup starts exactly now and counts as upcoming.
        let next = engine.upcoming(&events, now, 2);
        assert_eq!(titles(&next), vec!["Standup", "Review"]);
        assert!(engine.upcoming(&events, now, 0).is_empty());
    }

    #[test]
    fn test_unreadable_end_is_outside_bounded_ranges() {
        let engine = QueryEngine::default();
        let mut events = sample();
        events[1].end_time = EventTime::Invalid("half past never".into());

        let day = engine.day(&events, date(2025, 6, 2));
        assert_eq!(titles(&day), vec!["Review"]);

        let all = engine.filter(&events, &EventQuery::text("standup"));
        assert_eq!(titles(&all), vec!["Standup"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let engine = QueryEngine::default();
        let events = vec![
            event("First", "2025-06-02T09:00:00", "2025-06-02T10:00:00"),
            event("Second", "2025-06-02T09:00:00Z", "2025-06-02T09:30:00Z"),
        ];
        let all = engine.filter(&events, &EventQuery::default());
        assert_eq!(titles(&all), vec!["First", "Second"]);
    }
}
