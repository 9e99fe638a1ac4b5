//! Remote calendar mirrored through a provider binary.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::CalAssistResult;
use crate::event::CalendarEvent;
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents, RemoteEvent, UpdateEvent};
use crate::remote::provider::Provider;

/// Operations sync needs from a remote calendar.
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    /// Events in `range`, tagged as remote.
    async fn list_events(&self, range: &DateRange) -> CalAssistResult<Vec<CalendarEvent>>;

    /// Create a copy of `event` remotely and return it as the remote sees it.
    async fn create_event(&self, event: &CalendarEvent) -> CalAssistResult<CalendarEvent>;

    async fn update_event(
        &self,
        remote_id: &str,
        event: &CalendarEvent,
    ) -> CalAssistResult<CalendarEvent>;

    /// Returns whether the remote had the event.
    async fn delete_event(&self, remote_id: &str) -> CalAssistResult<bool>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// The `[remote]` table: which provider to use plus whatever parameters it
/// needs (e.g. `calendar_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

#[async_trait]
impl RemoteCalendar for Remote {
    async fn list_events(&self, range: &DateRange) -> CalAssistResult<Vec<CalendarEvent>> {
        let events = self
            .provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                from: range.from_rfc3339(),
                to: range.to_rfc3339(),
            })
            .await?;

        let fetched_at = Utc::now();
        Ok(events.into_iter().map(|e| e.into_event(fetched_at)).collect())
    }

    async fn create_event(&self, event: &CalendarEvent) -> CalAssistResult<CalendarEvent> {
        let created = self
            .provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: RemoteEvent::from_local(event),
            })
            .await?;
        Ok(created.into_event(Utc::now()))
    }

    async fn update_event(
        &self,
        remote_id: &str,
        event: &CalendarEvent,
    ) -> CalAssistResult<CalendarEvent> {
        let updated = self
            .provider
            .call(UpdateEvent {
                remote_config: self.remote_config(),
                remote_id: remote_id.to_string(),
                event: RemoteEvent::from_local(event),
            })
            .await?;
        Ok(updated.into_event(Utc::now()))
    }

    async fn delete_event(&self, remote_id: &str) -> CalAssistResult<bool> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                remote_id: remote_id.to_string(),
            })
            .await
    }
}
