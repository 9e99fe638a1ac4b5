//! Overlap detection between a candidate time range and existing events.
//!
//! Ranges are half-open: an event ending at 10:00 does not conflict with one
//! starting at 10:00. Detection only reports; it never blocks a write.

use crate::event::CalendarEvent;
use crate::time::{CanonicalTime, EventTime, Normalizer};

#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    normalizer: &'a Normalizer,
    exclude_id: Option<&'a str>,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        ConflictDetector {
            normalizer,
            exclude_id: None,
        }
    }

    /// Skip the event with this id (an event never conflicts with its own
    /// stored copy when it is being rescheduled).
    pub fn excluding(mut self, id: &'a str) -> Self {
        self.exclude_id = Some(id);
        self
    }

    /// Existing events overlapping `[start, end)`, in their original order.
    pub fn find_conflicts<'e>(
        &self,
        start: &EventTime,
        end: &EventTime,
        existing: &'e [CalendarEvent],
    ) -> Vec<&'e CalendarEvent> {
        let candidate = (
            self.normalizer.normalize(start),
            self.normalizer.normalize(end),
        );

        existing
            .iter()
            .filter(|e| self.exclude_id != Some(e.id.as_str()))
            .filter(|e| {
                overlaps(
                    (e.start(self.normalizer), e.end(self.normalizer)),
                    candidate,
                )
            })
            .collect()
    }
}

/// `a.start < b.end && a.end > b.start`. Ranges with an unknown bound never
/// overlap anything.
pub fn overlaps(a: (CanonicalTime, CanonicalTime), b: (CanonicalTime, CanonicalTime)) -> bool {
    match (a, b) {
        (
            (CanonicalTime::At(a_start), CanonicalTime::At(a_end)),
            (CanonicalTime::At(b_start), CanonicalTime::At(b_end)),
        ) => a_start < b_end && a_end > b_start,
        _ => false,
    }
}
