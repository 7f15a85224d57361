//! Client-specific operations on top of [`DocumentStore`]

use chrono::Utc;
use clientdb_core::{format_timestamp, ClientRecord, ClientStatus, RecordId, Result};
use serde_json::{json, Value};
use tracing::info;

use super::document::DocumentStore;

/// Store handle for the `clients` collection
pub type ClientStore = DocumentStore<ClientRecord>;

impl DocumentStore<ClientRecord> {
    /// Client with the given phone number
    pub fn find_by_phone(&self, phone: &str) -> Option<ClientRecord> {
        self.find_by_field("phone", phone)
    }

    /// Suspend a client, recording why and when
    pub fn suspend(&self, id: RecordId, reason: &str) -> Result<ClientRecord> {
        let patch = json!({
            "status": ClientStatus::Suspended,
            "suspensionReason": reason,
            "suspendedAt": format_timestamp(Utc::now()),
        });
        let client = self.update(id, &patch)?;
        info!(target: "clientdb::store", id, reason, "Client suspended");
        Ok(client)
    }

    /// Lift a suspension
    pub fn reactivate(&self, id: RecordId) -> Result<ClientRecord> {
        let patch = json!({
            "status": ClientStatus::Active,
            "suspensionReason": Value::Null,
            "reactivatedAt": format_timestamp(Utc::now()),
        });
        let client = self.update(id, &patch)?;
        info!(target: "clientdb::store", id, "Client reactivated");
        Ok(client)
    }
}
