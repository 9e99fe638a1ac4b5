//! Mirroring between the local store and a remote calendar.
//!
//! The local store is always the source of truth for local events. Remote
//! failures degrade: listings fall back to local-only and push keeps going
//! past events it could not send.

use crate::date_range::DateRange;
use crate::error::CalAssistResult;
use crate::event::CalendarEvent;
use crate::merge::merge;
use crate::query::{EventQuery, QueryEngine};
use crate::remote::RemoteCalendar;
use crate::store::EventStore;

/// Outcome of a [`push`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushReport {
    /// Events created remotely and linked.
    pub pushed: usize,
    /// Events that already had a remote copy.
    pub already_linked: usize,
    /// `(event id, error)` for events that could not be sent.
    pub failed: Vec<(String, String)>,
}

impl PushReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create every unlinked local event on the remote and record the remote id.
///
/// Remote errors are per event and end up in the report. A failure to
/// persist a link is returned as an error.
pub async fn push<R: RemoteCalendar + ?Sized>(
    store: &mut EventStore,
    remote: &R,
) -> CalAssistResult<PushReport> {
    let mut report = PushReport::default();

    let pending: Vec<CalendarEvent> = store
        .events()
        .iter()
        .filter(|e| !e.is_remote())
        .filter(|e| {
            let linked = e.remote_id.is_some();
            if linked {
                report.already_linked += 1;
            }
            !linked
        })
        .cloned()
        .collect();

    for event in pending {
        match remote.create_event(&event).await {
            Ok(created) => {
                let remote_id = created.remote_id.unwrap_or(created.id);
                store.link_remote(&event.id, &remote_id)?;
                tracing::info!(id = %event.id, remote_id = %remote_id, "pushed event");
                report.pushed += 1;
            }
            Err(e) => {
                tracing::warn!(id = %event.id, error = %e, "failed to push event");
                report.failed.push((event.id, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Remote events in `range`.
pub async fn pull<R: RemoteCalendar + ?Sized>(
    remote: &R,
    range: &DateRange,
) -> CalAssistResult<Vec<CalendarEvent>> {
    let events = remote.list_events(range).await?;
    tracing::debug!(count = events.len(), "pulled remote events");
    Ok(events)
}

/// Local events in `range` merged with the remote's, local first.
///
/// Without a remote, or when the remote cannot be reached, this is the local
/// listing alone.
pub async fn merged_listing<R: RemoteCalendar + ?Sized>(
    store: &EventStore,
    remote: Option<&R>,
    range: DateRange,
) -> Vec<CalendarEvent> {
    let query = EventQuery::in_range(range);
    let local = store.query(&query);

    let Some(remote) = remote else {
        return local;
    };

    match pull(remote, &range).await {
        Ok(pulled) => {
            let in_range: Vec<CalendarEvent> = QueryEngine::new(*store.normalizer())
                .filter(&pulled, &query)
                .into_iter()
                .cloned()
                .collect();
            merge(&local, &in_range, store.normalizer())
        }
        Err(e) => {
            tracing::warn!(error = %e, "remote unavailable, showing local events only");
            local
        }
    }
}

/// Send the current state of a linked event to the remote.
///
/// Returns `None` when the event has no remote copy.
pub async fn mirror_update<R: RemoteCalendar + ?Sized>(
    remote: &R,
    event: &CalendarEvent,
) -> CalAssistResult<Option<CalendarEvent>> {
    let Some(remote_id) = event.remote_id.as_deref() else {
        return Ok(None);
    };
    let updated = remote.update_event(remote_id, event).await?;
    tracing::info!(id = %event.id, remote_id = %remote_id, "mirrored update");
    Ok(Some(updated))
}

/// Delete the remote copy of an event that was deleted locally.
///
/// Returns whether a remote copy was removed.
pub async fn mirror_delete<R: RemoteCalendar + ?Sized>(
    remote: &R,
    event: &CalendarEvent,
) -> CalAssistResult<bool> {
    let Some(remote_id) = event.remote_id.as_deref() else {
        return Ok(false);
    };
    let removed = remote.delete_event(remote_id).await?;
    tracing::info!(id = %event.id, remote_id = %remote_id, removed, "mirrored delete");
    Ok(removed)
}
