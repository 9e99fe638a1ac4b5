//! Merging event lists from two sources into one deduplicated listing.
//!
//! Two events are the same event when their trimmed, case-folded titles match
//! and their starts normalize to the same instant. The first list wins; the
//! inputs are never modified.

use std::collections::HashSet;

use crate::event::CalendarEvent;
use crate::time::{CanonicalTime, Normalizer};

/// Dedup key: folded title plus normalized start.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub title: String,
    pub start: CanonicalTime,
}

impl EventKey {
    pub fn of(event: &CalendarEvent, normalizer: &Normalizer) -> Self {
        EventKey {
            title: fold_title(&event.title),
            start: event.start(normalizer),
        }
    }
}

fn fold_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Merge `primary` and `secondary` into one list sorted by start.
///
/// - events with a blank title are dropped
/// - for each key only the first occurrence is kept, scanning `primary` first
/// - ties on start keep input order
pub fn merge(
    primary: &[CalendarEvent],
    secondary: &[CalendarEvent],
    normalizer: &Normalizer,
) -> Vec<CalendarEvent> {
    let mut seen: HashSet<EventKey> = HashSet::new();
    let mut merged: Vec<(CanonicalTime, CalendarEvent)> = Vec::new();

    for event in primary.iter().chain(secondary) {
        if event.title.trim().is_empty() {
            continue;
        }
        let key = EventKey::of(event, normalizer);
        let start = key.start;
        if seen.insert(key) {
            merged.push((start, event.clone()));
        }
    }

    merged.sort_by_key(|(start, _)| *start);
    merged.into_iter().map(|(_, e)| e).collect()
}
