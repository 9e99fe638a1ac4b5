//! Tool-call boundary for assistants.
//!
//! A call arrives as JSON `{"action": "...", "params": {...}}` with primitive
//! arguments (strings, numbers, booleans) and always produces a
//! [`ToolOutcome`], never a panic or a bare error.
//!
//! When a remote calendar is attached, edits and deletes of linked events
//! are mirrored to it. A remote failure never undoes the local change; it is
//! noted in the outcome message.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::date_range::DateRange;
use crate::error::{CalAssistError, ValidationError};
use crate::event::{CalendarEvent, EventPatch, NewEvent};
use crate::query::{EventQuery, QueryEngine};
use crate::remote::RemoteCalendar;
use crate::store::EventStore;
use crate::sync;
use crate::time::EventTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateEvent,
    GetEvent,
    UpdateEvent,
    DeleteEvent,
    QueryEvents,
    TodayEvents,
    WeekEvents,
    MonthEvents,
    UpcomingEvents,
    CheckConflicts,
}

/// Wire form of a call. `params` may be omitted for actions without
/// required arguments.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToolRequest {
    pub action: Action,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateEventArgs {
    #[serde(default)]
    pub title: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Comma separated.
    pub attendees: Option<String>,
    #[serde(default)]
    pub allow_conflicts: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateEventArgs {
    pub id: String,
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryArgs {
    pub query: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DateArgs {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpcomingArgs {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConflictArgs {
    pub start_time: String,
    pub end_time: String,
    pub exclude_id: Option<String>,
}

/// A parsed tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    CreateEvent(CreateEventArgs),
    GetEvent(IdArgs),
    UpdateEvent(UpdateEventArgs),
    DeleteEvent(IdArgs),
    QueryEvents(QueryArgs),
    TodayEvents,
    WeekEvents(DateArgs),
    MonthEvents(DateArgs),
    UpcomingEvents(UpcomingArgs),
    CheckConflicts(ConflictArgs),
}

impl ToolCall {
    pub fn parse(json: &str) -> Result<Self, ToolOutcome> {
        let request: ToolRequest = serde_json::from_str(json)
            .map_err(|e| ToolOutcome::invalid_arguments(format!("Malformed tool call: {e}")))?;
        Self::from_request(request)
    }

    pub fn from_request(request: ToolRequest) -> Result<Self, ToolOutcome> {
        let ToolRequest { action, params } = request;
        Ok(match action {
            Action::CreateEvent => ToolCall::CreateEvent(args(params)?),
            Action::GetEvent => ToolCall::GetEvent(args(params)?),
            Action::UpdateEvent => ToolCall::UpdateEvent(args(params)?),
            Action::DeleteEvent => ToolCall::DeleteEvent(args(params)?),
            Action::QueryEvents => ToolCall::QueryEvents(args(params)?),
            Action::TodayEvents => ToolCall::TodayEvents,
            Action::WeekEvents => ToolCall::WeekEvents(args(params)?),
            Action::MonthEvents => ToolCall::MonthEvents(args(params)?),
            Action::UpcomingEvents => ToolCall::UpcomingEvents(args(params)?),
            Action::CheckConflicts => ToolCall::CheckConflicts(args(params)?),
        })
    }
}

fn args<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, ToolOutcome> {
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ToolOutcome::invalid_arguments(e.to_string()))
}

/// Payload of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolData {
    Event(CalendarEvent),
    Events(Vec<CalendarEvent>),
    Deleted(CalendarEvent),
    Conflicts(Vec<CalendarEvent>),
}

/// Result of a tool call, serialized as JSON tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok {
        message: String,
        #[serde(flatten)]
        data: ToolData,
    },
    /// `create_event` found overlaps and did not create anything.
    Conflicts {
        message: String,
        conflicts: Vec<CalendarEvent>,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl ToolOutcome {
    fn ok(message: impl Into<String>, data: ToolData) -> Self {
        ToolOutcome::Ok {
            message: message.into(),
            data,
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ToolOutcome::Error {
            kind: "invalid_arguments".to_string(),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ToolOutcome::Ok { .. })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            serde_json::json!({"status": "error", "kind": "io", "message": e.to_string()})
                .to_string()
        })
    }
}

impl From<CalAssistError> for ToolOutcome {
    fn from(e: CalAssistError) -> Self {
        let kind = match &e {
            CalAssistError::Config(_) => "invalid_arguments",
            CalAssistError::Serialization(_) => "io",
            other => other.kind(),
        };
        ToolOutcome::Error {
            kind: kind.to_string(),
            message: e.to_string(),
        }
    }
}

impl From<ValidationError> for ToolOutcome {
    fn from(e: ValidationError) -> Self {
        CalAssistError::from(e).into()
    }
}

/// Executes tool calls against a store.
pub struct Toolbox<'a> {
    store: &'a mut EventStore,
    remote: Option<&'a dyn RemoteCalendar>,
    default_duration: Duration,
    upcoming_limit: usize,
}

impl<'a> Toolbox<'a> {
    pub fn new(store: &'a mut EventStore, config: &Config) -> Self {
        Toolbox {
            store,
            remote: None,
            default_duration: config.default_duration,
            upcoming_limit: config.upcoming_limit,
        }
    }

    /// Mirror edits and deletes of linked events to `remote`.
    pub fn with_remote(mut self, remote: &'a dyn RemoteCalendar) -> Self {
        self.remote = Some(remote);
        self
    }

    pub async fn handle(&mut self, call: ToolCall) -> ToolOutcome {
        self.handle_at(call, Utc::now()).await
    }

    /// Run `call` with `now` as the current instant.
    pub async fn handle_at(&mut self, call: ToolCall, now: DateTime<Utc>) -> ToolOutcome {
        tracing::debug!(?call, "tool call");
        let outcome = match call {
            ToolCall::CreateEvent(args) => self.create(args),
            ToolCall::GetEvent(IdArgs { id }) => self
                .store
                .get(&id)
                .map(|e| ToolOutcome::ok(format!("Found '{}'", e.title), ToolData::Event(e.clone())))
                .map_err(ToolOutcome::from),
            ToolCall::UpdateEvent(args) => self.update(args).await,
            ToolCall::DeleteEvent(IdArgs { id }) => self.delete(&id).await,
            ToolCall::QueryEvents(args) => self.query(args),
            ToolCall::TodayEvents => {
                let engine = self.engine();
                let events = engine.day(self.store.events(), engine.today(now));
                Ok(listing("today", events))
            }
            ToolCall::WeekEvents(DateArgs { date }) => self.window(date, now, "this week", |e, ev, d| e.week(ev, d)),
            ToolCall::MonthEvents(DateArgs { date }) => self.window(date, now, "this month", |e, ev, d| e.month(ev, d)),
            ToolCall::UpcomingEvents(UpcomingArgs { limit }) => {
                let events = self.engine().upcoming(
                    self.store.events(),
                    now,
                    limit.unwrap_or(self.upcoming_limit),
                );
                Ok(listing("upcoming", events))
            }
            ToolCall::CheckConflicts(args) => self.check_conflicts(args),
        };

        outcome.unwrap_or_else(|e| e)
    }

    fn engine(&self) -> QueryEngine {
        QueryEngine::new(*self.store.normalizer())
    }

    fn create(&mut self, args: CreateEventArgs) -> Result<ToolOutcome, ToolOutcome> {
        if args.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle.into());
        }

        let start = EventTime::parse_strict(&args.start_time)?;
        let end = match args.end_time.as_deref() {
            Some(end) => EventTime::parse_strict(end)?,
            None => start.try_shifted(self.default_duration)?,
        };

        let mut fields = NewEvent::new(args.title, start, end);
        fields.description = args.description;
        fields.location = args.location;
        fields.attendees = split_attendees(args.attendees.as_deref());

        // Only a well-formed candidate is checked for overlaps.
        fields.validate(self.store.normalizer())?;

        if !args.allow_conflicts {
            let conflicts: Vec<CalendarEvent> = self
                .store
                .conflicts(&fields.start_time, &fields.end_time, None)
                .into_iter()
                .cloned()
                .collect();
            if !conflicts.is_empty() {
                return Ok(ToolOutcome::Conflicts {
                    message: format!(
                        "'{}' overlaps {} existing event(s); set allow_conflicts to create it anyway",
                        fields.title.trim(),
                        conflicts.len()
                    ),
                    conflicts,
                });
            }
        }

        let event = self.store.create(fields)?;
        Ok(ToolOutcome::ok(
            format!("Created '{}'", event.title),
            ToolData::Event(event),
        ))
    }

    async fn update(&mut self, args: UpdateEventArgs) -> Result<ToolOutcome, ToolOutcome> {
        let patch = EventPatch {
            title: args.title,
            start_time: args.start_time.as_deref().map(EventTime::parse_strict).transpose()?,
            end_time: args.end_time.as_deref().map(EventTime::parse_strict).transpose()?,
            description: args.description,
            location: args.location,
            attendees: args.attendees.as_deref().map(|a| split_attendees(Some(a))),
        };

        if patch.is_empty() {
            return Err(ToolOutcome::invalid_arguments("Nothing to update"));
        }

        let event = self.store.update(&args.id, &patch)?;
        let mut message = format!("Updated '{}'", event.title);
        if let Some(remote) = self.remote {
            if let Err(e) = sync::mirror_update(remote, &event).await {
                tracing::warn!(id = %event.id, error = %e, "remote copy not updated");
                message.push_str(&format!("; remote copy not updated: {e}"));
            }
        }
        Ok(ToolOutcome::ok(message, ToolData::Event(event)))
    }

    async fn delete(&mut self, id: &str) -> Result<ToolOutcome, ToolOutcome> {
        let removed = self.store.delete(id)?;
        let mut message = format!("Deleted '{}'", removed.title);
        if let Some(remote) = self.remote {
            if let Err(e) = sync::mirror_delete(remote, &removed).await {
                tracing::warn!(id = %removed.id, error = %e, "remote copy not deleted");
                message.push_str(&format!("; remote copy not deleted: {e}"));
            }
        }
        Ok(ToolOutcome::ok(message, ToolData::Deleted(removed)))
    }

    fn query(&self, args: QueryArgs) -> Result<ToolOutcome, ToolOutcome> {
        let range = DateRange::from_args(
            args.start_date.as_deref(),
            args.end_date.as_deref(),
            self.store.normalizer(),
        )?;
        let events = self.store.query(&EventQuery {
            text: args.query,
            range,
        });
        Ok(ToolOutcome::ok(
            format!("{} matching event(s)", events.len()),
            ToolData::Events(events),
        ))
    }

    fn window(
        &self,
        date: Option<String>,
        now: DateTime<Utc>,
        label: &str,
        pick: impl for<'e> Fn(&QueryEngine, &'e [CalendarEvent], NaiveDate) -> Vec<&'e CalendarEvent>,
    ) -> Result<ToolOutcome, ToolOutcome> {
        let engine = self.engine();
        let date = match date.as_deref() {
            Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| {
                ToolOutcome::invalid_arguments(format!("Expected a YYYY-MM-DD date, got '{d}'"))
            })?,
            None => engine.today(now),
        };
        Ok(listing(label, pick(&engine, self.store.events(), date)))
    }

    fn check_conflicts(&self, args: ConflictArgs) -> Result<ToolOutcome, ToolOutcome> {
        let start = EventTime::parse_strict(&args.start_time)?;
        let end = EventTime::parse_strict(&args.end_time)?;
        let conflicts: Vec<CalendarEvent> = self
            .store
            .conflicts(&start, &end, args.exclude_id.as_deref())
            .into_iter()
            .cloned()
            .collect();
        Ok(ToolOutcome::ok(
            format!("{} conflicting event(s)", conflicts.len()),
            ToolData::Conflicts(conflicts),
        ))
    }
}

fn listing(label: &str, events: Vec<&CalendarEvent>) -> ToolOutcome {
    ToolOutcome::ok(
        format!("{} event(s) {label}", events.len()),
        ToolData::Events(events.into_iter().cloned().collect()),
    )
}

fn split_attendees(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Normalizer;
    use chrono::TimeZone;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open_at(dir.path().join("events.json"), Normalizer::utc());
        (dir, store)
    }

    async fn call(toolbox: &mut Toolbox<'_>, json: serde_json::Value) -> ToolOutcome {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        match ToolCall::parse(&json.to_string()) {
            Ok(call) => toolbox.handle_at(call, now).await,
            Err(outcome) => outcome,
        }
    }

    fn kind(outcome: &ToolOutcome) -> &str {
        match outcome {
            ToolOutcome::Error { kind, .. } => kind,
            ToolOutcome::Ok { .. } => "ok",
            ToolOutcome::Conflicts { .. } => "conflicts",
        }
    }

    fn events(outcome: &ToolOutcome) -> Vec<&str> {
        match outcome {
            ToolOutcome::Ok {
                data: ToolData::Events(events) | ToolData::Conflicts(events),
                ..
            } => events.iter().map(|e| e.title.as_str()).collect(),
            other => panic!("expected a listing, got {other:?}"),
        }
    }

    fn created_id(outcome: &ToolOutcome) -> String {
        match outcome {
            ToolOutcome::Ok {
                data: ToolData::Event(e),
                ..
            } => e.id.clone(),
            other => panic!("expected an event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_end_and_splits_attendees() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        let outcome = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "Coffee",
                "start_time": "2025-06-02T10:00:00",
                "attendees": "ann@example.com, bob@example.com,,"
            }}),
        ).await;
        let ToolOutcome::Ok {
            data: ToolData::Event(event),
            ..
        } = outcome
        else {
            panic!("expected created event, got {outcome:?}");
        };
        assert_eq!(event.end_time, EventTime::parse("2025-06-02T11:00:00"));
        assert_eq!(event.attendees, vec!["ann@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn test_create_blocked_by_conflict_unless_allowed() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "Standup", "start_time": "2025-06-02T09:00:00", "end_time": "2025-06-02T09:15:00"
            }}),
        ).await;

        let review = json!({"action": "create_event", "params": {
            "title": "Review", "start_time": "2025-06-02T09:10:00", "end_time": "2025-06-02T09:30:00"
        }});
        let blocked = call(&mut toolbox, review.clone()).await;
        let ToolOutcome::Conflicts { conflicts, .. } = &blocked else {
            panic!("expected conflicts, got {blocked:?}");
        };
        assert_eq!(conflicts[0].title, "Standup");

        let mut allowed = review;
        allowed["params"]["allow_conflicts"] = json!(true);
        assert!(call(&mut toolbox, allowed).await.is_ok());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reversed_range_inside_busy_block_is_time_order_error() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        let block = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "All day block", "start_time": "2025-06-02T08:00:00", "end_time": "2025-06-02T18:00:00"
            }}),
        )
        .await;
        assert!(block.is_ok());

        let reversed = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "Bad", "start_time": "2025-06-02T12:00:00", "end_time": "2025-06-02T11:00:00"
            }}),
        )
        .await;
        assert_eq!(kind(&reversed), "invalid_time_order");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_default_end_past_max_year_is_timestamp_error() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        let far = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "Far", "start_time": "+262142-12-31T23:30:00"
            }}),
        )
        .await;
        assert_eq!(kind(&far), "invalid_timestamp");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_error_kinds() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        let missing_title = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {"title": " ", "start_time": "2025-06-02T09:00:00"}}),
        ).await;
        assert_eq!(kind(&missing_title), "missing_title");

        let bad_order = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "X", "start_time": "2025-06-02T10:00:00", "end_time": "2025-06-02T09:00:00"
            }}),
        ).await;
        assert_eq!(kind(&bad_order), "invalid_time_order");

        let bad_time = call(
            &mut toolbox,
            json!({"action": "create_event", "params": {"title": "X", "start_time": "tomorrow-ish"}}),
        ).await;
        assert_eq!(kind(&bad_time), "invalid_timestamp");

        let not_found = call(&mut toolbox, json!({"action": "delete_event", "params": {"id": "nope"}})).await;
        assert_eq!(kind(&not_found), "not_found");

        let no_start = call(&mut toolbox, json!({"action": "create_event", "params": {"title": "X"}})).await;
        assert_eq!(kind(&no_start), "invalid_arguments");

        let unknown = call(&mut toolbox, json!({"action": "teleport"})).await;
        assert_eq!(kind(&unknown), "invalid_arguments");

        let bad_date = call(&mut toolbox, json!({"action": "week_events", "params": {"date": "06/02"}})).await;
        assert_eq!(kind(&bad_date), "invalid_arguments");
    }

    #[tokio::test]
    async fn test_update_get_and_delete_flow() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        let id = created_id(&call(
            &mut toolbox,
            json!({"action": "create_event", "params": {
                "title": "A", "start_time": "2025-06-02T10:00:00", "end_time": "2025-06-02T11:00:00"
            }}),
        ).await);

        let invalid = call(
            &mut toolbox,
            json!({"action": "update_event", "params": {
                "id": id, "start_time": "2025-06-02T12:00:00", "end_time": "2025-06-02T11:30:00"
            }}),
        ).await;
        assert_eq!(kind(&invalid), "invalid_time_order");

        let empty = call(&mut toolbox, json!({"action": "update_event", "params": {"id": id}})).await;
        assert_eq!(kind(&empty), "invalid_arguments");

        let renamed = call(
            &mut toolbox,
            json!({"action": "update_event", "params": {"id": id, "title": "A2"}}),
        ).await;
        assert!(renamed.is_ok());

        let fetched = call(&mut toolbox, json!({"action": "get_event", "params": {"id": id}})).await;
        let ToolOutcome::Ok {
            data: ToolData::Event(event),
            ..
        } = fetched
        else {
            panic!("expected event");
        };
        assert_eq!(event.title, "A2");
        assert_eq!(event.start_time, EventTime::parse("2025-06-02T10:00:00"));

        let deleted = call(&mut toolbox, json!({"action": "delete_event", "params": {"id": id}})).await;
        assert!(matches!(deleted, ToolOutcome::Ok { data: ToolData::Deleted(_), .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_listings() {
        let (_dir, mut store) = temp_store();
        let config = Config::default();
        let mut toolbox = Toolbox::new(&mut store, &config);

        for (title, start, end) in [
            ("Monday late", "2025-06-02T18:00:00", "2025-06-02T19:00:00"),
            ("Monday early", "2025-06-02T09:00:00", "2025-06-02T09:30:00"),
            ("Friday", "2025-06-06T09:00:00", "2025-06-06T10:00:00"),
            ("Next month", "2025-07-01T09:00:00", "2025-07-01T10:00:00"),
        ] {
            let outcome = call(
                &mut toolbox,
                json!({"action": "create_event", "params": {
                    "title": title, "start_time": start, "end_time": end
                }}),
            ).await;
            assert!(outcome.is_ok(), "{outcome:?}");
        }

        let today = call(&mut toolbox, json!({"action": "today_events"})).await;
        assert_eq!(events(&today), vec!["Monday early", "Monday late"]);

        let week = call(&mut toolbox, json!({"action": "week_events", "params": {}})).await;
        assert_eq!(events(&week), vec!["Monday early", "Monday late", "Friday"]);

        let month = call(&mut toolbox, json!({"action": "month_events", "params": {"date": "2025-07-15"}})).await;
        assert_eq!(events(&month), vec!["Next month"]);

        let upcoming = call(&mut toolbox, json!({"action": "upcoming_events", "params": {"limit": 2}})).await;
        assert_eq!(events(&upcoming), vec!["Monday early", "Monday late"]);

        let queried = call(
            &mut toolbox,
            json!({"action": "query_events", "params": {"query": "monday", "start_date": "2025-06-02", "end_date": "2025-06-02"}}),
        ).await;
        assert_eq!(events(&queried), vec!["Monday early", "Monday late"]);

        let conflicts = call(
            &mut toolbox,
            json!({"action": "check_conflicts", "params": {
                "start_time": "2025-06-02T09:15:00Z", "end_time": "2025-06-02T18:30:00Z"
            }}),
        ).await;
        assert_eq!(events(&conflicts), vec!["Monday late", "Monday early"]);
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ToolOutcome::invalid_arguments("bad");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "error", "kind": "invalid_arguments", "message": "bad"})
        );

        let quoted = ToolOutcome::invalid_arguments(r#"bad "quote" and \ slash"#);
        let parsed: serde_json::Value = serde_json::from_str(&quoted.to_json()).unwrap();
        assert_eq!(parsed["message"], r#"bad "quote" and \ slash"#);

        let listing = ToolOutcome::ok("0 event(s) today", ToolData::Events(vec![]));
        assert_eq!(
            serde_json::to_value(&listing).unwrap(),
            json!({"status": "ok", "message": "0 event(s) today", "events": []})
        );
    }
}
