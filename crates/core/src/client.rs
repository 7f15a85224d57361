//! Client record
//!
//! The subscription client is the one typed entity the store persists.
//! Field names on disk are camelCase to match the files the admin panel
//! already reads and writes. Fields the panel adds that this type does not
//! model are kept in `extra` and written back untouched.
//!
//! `status` is stored, not derived: nothing in the store recomputes it from
//! `expiry`. Keeping the two consistent is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::record::{monotonic_now, Record, RecordId};

/// Default subscription plan
pub const DEFAULT_PLAN: &str = "Standard";

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// Subscription is current
    #[default]
    Active,
    /// Subscription ends soon
    Expiring,
    /// Subscription has ended
    Expired,
    /// Service paused by an operator
    Suspended,
}

impl ClientStatus {
    /// Status as stored on disk
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Expiring => "expiring",
            ClientStatus::Expired => "expired",
            ClientStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscription client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Store-assigned id; `None` until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Display name
    pub name: String,
    /// Messaging phone number (not enforced unique)
    #[serde(default)]
    pub phone: String,
    /// Subscribed product
    #[serde(default)]
    pub service: String,
    /// Plan name
    #[serde(default = "default_plan")]
    pub plan: String,
    /// Subscription end date (ISO 8601 date string)
    #[serde(default)]
    pub expiry: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: ClientStatus,
    /// Date of the last payment
    #[serde(default)]
    pub last_payment: Option<String>,
    /// Creation time
    #[serde(default, with = "opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(default, with = "opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Why the client was suspended
    #[serde(default)]
    pub suspension_reason: Option<String>,
    /// When the client was suspended
    #[serde(default)]
    pub suspended_at: Option<String>,
    /// When the client was last reactivated
    #[serde(default)]
    pub reactivated_at: Option<String>,
    /// Free text
    #[serde(default)]
    pub notes: String,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_plan() -> String {
    DEFAULT_PLAN.to_string()
}

impl ClientRecord {
    /// Create a new, not yet persisted client with default plan and status
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        service: impl Into<String>,
        expiry: impl Into<String>,
    ) -> Self {
        ClientRecord {
            id: None,
            name: name.into(),
            phone: phone.into(),
            service: service.into(),
            plan: default_plan(),
            expiry: expiry.into(),
            status: ClientStatus::Active,
            last_payment: None,
            created_at: None,
            updated_at: None,
            suspension_reason: None,
            suspended_at: None,
            reactivated_at: None,
            notes: String::new(),
            extra: Map::new(),
        }
    }

    /// Set the plan
    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = plan.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the last payment date
    pub fn with_last_payment(mut self, date: impl Into<String>) -> Self {
        self.last_payment = Some(date.into());
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// True if the client is suspended
    pub fn is_suspended(&self) -> bool {
        self.status == ClientStatus::Suspended
    }
}

impl Record for ClientRecord {
    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(monotonic_now(self.created_at, now));
    }
}

/// Millisecond RFC 3339 (de)serialization for optional timestamps
mod opt_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::record::{format_timestamp, parse_timestamp};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&format_timestamp(*at)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
        }
    }
}
