//! Collection enumeration
//!
//! Every entity kind the store knows about is persisted as one JSON file in
//! the data directory. The set is closed: adding a collection means adding a
//! variant here.
//!
//! | Collection | File | Shape |
//! |------------|------|-------|
//! | Clients | `clients.json` | array of records |
//! | Messages | `messages.json` | array of records |
//! | Sessions | `sessions.json` | array of records |
//! | Logs | `logs.json` | array of records |
//! | Settings | `settings.json` | single object |

use serde::{Deserialize, Serialize};
use std::fmt;

/// The recognized collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Client / subscription records
    Clients,
    /// Outbound and inbound message log
    Messages,
    /// Messaging session state
    Sessions,
    /// Application log entries
    Logs,
    /// Application settings (single object)
    Settings,
}

/// On-disk JSON shape of a collection file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// Top-level JSON array of objects
    Array,
    /// Top-level JSON object
    Object,
}

impl Collection {
    /// All collections (for iteration)
    pub const ALL: [Collection; 5] = [
        Collection::Clients,
        Collection::Messages,
        Collection::Sessions,
        Collection::Logs,
        Collection::Settings,
    ];

    /// Get all collections as a slice
    pub fn all() -> &'static [Collection] {
        &Self::ALL
    }

    /// Collection name as used in file names and logs
    pub const fn name(&self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Messages => "messages",
            Collection::Sessions => "sessions",
            Collection::Logs => "logs",
            Collection::Settings => "settings",
        }
    }

    /// File name inside the data directory
    pub const fn file_name(&self) -> &'static str {
        match self {
            Collection::Clients => "clients.json",
            Collection::Messages => "messages.json",
            Collection::Sessions => "sessions.json",
            Collection::Logs => "logs.json",
            Collection::Settings => "settings.json",
        }
    }

    /// Expected top-level JSON shape
    pub const fn shape(&self) -> CollectionShape {
        match self {
            Collection::Settings => CollectionShape::Object,
            _ => CollectionShape::Array,
        }
    }

    /// Parse from collection name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clients" => Some(Collection::Clients),
            "messages" => Some(Collection::Messages),
            "sessions" => Some(Collection::Sessions),
            "logs" => Some(Collection::Logs),
            "settings" => Some(Collection::Settings),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
