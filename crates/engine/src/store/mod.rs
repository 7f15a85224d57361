//! Collection stores
//!
//! - [`DocumentStore`]: record collections (`clients`, `messages`,
//!   `sessions`, `logs`)
//! - [`SettingsStore`]: the `settings` object
//! - [`ClientStore`]: `DocumentStore<ClientRecord>` plus phone lookup and
//!   suspension helpers

pub mod clients;
pub mod document;
pub mod seed;
pub mod settings;

pub use clients::ClientStore;
pub use document::{DocumentStore, EXPIRY_FIELD, STATUS_FIELD, SUSPENDED_STATUS};
pub use seed::{sample_clients, sample_clients_on};
pub use settings::SettingsStore;
