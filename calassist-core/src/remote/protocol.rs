//! JSON protocol spoken between calassist and provider binaries over
//! stdin/stdout.
//!
//! One request line goes in, one response document comes out:
//!
//! ```text
//! {"command":"list_events","params":{"calendar_id":"primary","from":"…","to":"…"}}
//! {"status":"success","data":[…]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CalendarEvent, EventSource};
use crate::time::EventTime;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

/// Request sent to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response read back from the provider.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// An event as exchanged with a provider. `id` is the provider's own id and
/// is empty on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub start_time: EventTime,
    pub end_time: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
}

impl RemoteEvent {
    pub fn from_local(event: &CalendarEvent) -> Self {
        RemoteEvent {
            id: event.remote_id.clone().unwrap_or_default(),
            title: event.title.clone(),
            start_time: event.start_time.clone(),
            end_time: event.end_time.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            attendees: event.attendees.clone(),
        }
    }

    /// Tag as a remote event. The provider id doubles as the record id.
    pub fn into_event(self, fetched_at: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: self.id.clone(),
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description,
            location: self.location,
            attendees: self.attendees,
            created_at: fetched_at,
            updated_at: None,
            source: EventSource::Remote,
            remote_id: Some(self.id),
        }
    }
}

/// List events within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific config (e.g. calendar_id)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RemoteEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: RemoteEvent,
}

impl ProviderCommand for CreateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Replace the remote copy of an event.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub remote_id: String,
    pub event: RemoteEvent,
}

impl ProviderCommand for UpdateEvent {
    type Response = RemoteEvent;
    fn command() -> Command {
        Command::UpdateEvent
    }
}

/// Delete an event. The provider answers whether anything was removed.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub remote_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = bool;
    fn command() -> Command {
        Command::DeleteEvent
    }
}
