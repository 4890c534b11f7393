//! Sync layer: REST access to the object store that owns case records.

pub mod config;
pub use config::{ConfigError, ObjectStoreConfig};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ListParams, ObjectStoreClient, Page, SyncError, external_reference_code};
