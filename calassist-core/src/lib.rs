//! Core of the calassist calendar assistant.
//!
//! - `event`, `time`: the event record, its validation and timestamp handling
//! - `store`: the JSON-file backed local event store
//! - `conflict`, `merge`, `query`: overlap detection, deduplicating merges and listings
//! - `remote`, `sync`: mirroring to a remote calendar through provider binaries
//! - `tools`: the JSON tool-call boundary used by assistants

pub mod config;
pub mod conflict;
pub mod date_range;
pub mod error;
pub mod event;
pub mod merge;
pub mod query;
pub mod remote;
pub mod store;
pub mod sync;
pub mod time;
pub mod tools;

pub use self::config::Config;
pub use self::error::{CalAssistError, CalAssistResult, StoreIoError, ValidationError};
pub use self::event::{CalendarEvent, EventPatch, EventSource, NewEvent};
pub use self::store::EventStore;
pub use self::time::{CanonicalTime, EventTime, Normalizer};
