//! Record abstraction
//!
//! A record is plain data: it knows its id and its timestamps, and nothing
//! about how it is loaded or saved. The store works with any type that
//! implements [`Record`]; two implementations ship with the crate:
//!
//! - [`ClientRecord`](crate::ClientRecord): the typed client entity
//! - [`Document`]: an untyped JSON object with a required integer `id`
//!
//! ## Ids
//!
//! Ids are time-derived with a random suffix (`millis * 1000 + rand(0..1000)`).
//! The result stays below 2^53 so it survives a round trip through any JSON
//! consumer that stores numbers as doubles. An id is never reassigned once a
//! record has one.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Record identifier
pub type RecordId = i64;

/// Field name of the record id
pub const ID_FIELD: &str = "id";
/// Field name of the creation timestamp
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Field name of the last-modified timestamp
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Behaviour the store needs from a persisted record
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Assigned id, `None` before the record has been created
    fn id(&self) -> Option<RecordId>;

    /// Assign the id. Called once, by the store, on create.
    fn set_id(&mut self, id: RecordId);

    /// Creation time, if recorded
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Set both timestamps to `now` (create)
    fn stamp_created(&mut self, now: DateTime<Utc>);

    /// Refresh the modification timestamp (update)
    fn stamp_updated(&mut self, now: DateTime<Utc>);

    /// JSON object view of the record used by filters and sorting
    ///
    /// A record that fails to serialize views as `null` and matches nothing.
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            warn!(
                target: "clientdb::store",
                id = ?self.id(),
                error = %e,
                "Record could not be viewed as JSON"
            );
            Value::Null
        })
    }
}

/// Clamp `now` so that an update never moves `updatedAt` before `createdAt`
pub fn monotonic_now(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match created_at {
        Some(created) if created > now => created,
        _ => now,
    }
}

/// Generate a fresh id that `is_taken` rejects
pub fn generate_id(is_taken: impl Fn(RecordId) -> bool) -> RecordId {
    let mut rng = rand::thread_rng();
    let base = Utc::now().timestamp_millis().max(0) * 1000;
    loop {
        let candidate = base + rng.gen_range(0..1000);
        if !is_taken(candidate) {
            return candidate;
        }
    }
}

/// Current time at the millisecond precision collection files store
///
/// Stamping with this keeps a record equal to itself after a save and reload.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way collection files store it (`...T..:..:...sssZ`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a calendar date from either `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

// =============================================================================
// Document - untyped record
// =============================================================================

/// Untyped record: a JSON object whose `id` (when present) is an integer
///
/// Used for the `messages`, `sessions` and `logs` collections, whose shape
/// belongs to the collaborators writing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Get a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Remove a field
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Underlying JSON map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON map
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

impl Record for Document {
    fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(Value::as_i64)
    }

    fn set_id(&mut self, id: RecordId) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .get(CREATED_AT_FIELD)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        let ts = Value::from(format_timestamp(now));
        self.0.insert(CREATED_AT_FIELD.to_string(), ts.clone());
        self.0.insert(UPDATED_AT_FIELD.to_string(), ts);
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        let at = monotonic_now(self.created_at(), now);
        self.0
            .insert(UPDATED_AT_FIELD.to_string(), Value::from(format_timestamp(at)));
    }

    fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
