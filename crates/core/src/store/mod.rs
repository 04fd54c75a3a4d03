//! Durable release record storage.
//!
//! The pipeline only depends on the upsert-by-code contract defined here;
//! [`SqliteRecordStore`] is the bundled implementation.

mod sqlite;

pub use sqlite::SqliteRecordStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::record::{EnrichedRecord, InvalidRecord};

/// A persisted record with its storage envelope.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: EnrichedRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-wide statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total: u64,
    pub uncensored: u64,
    pub censored: u64,
}

/// Errors for record storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// The record failed the persistence preconditions.
    #[error("Invalid record: {0}")]
    Invalid(#[from] InvalidRecord),
}

/// Trait for release record storage.
pub trait RecordStore: Send + Sync {
    /// Insert or merge a record, keyed by catalog code.
    ///
    /// On conflict only the fields present and non-empty in the incoming
    /// record overwrite stored values; list fields are replaced wholesale
    /// when non-empty. Records without a code or without magnets are
    /// rejected.
    fn upsert(&self, record: &EnrichedRecord) -> Result<StoredRecord, StoreError>;

    /// Fetch a record by its exact catalog code.
    fn get_by_code(&self, code: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Keyword search over code, titles and localized cast.
    fn search(&self, keyword: &str, limit: u32) -> Result<Vec<StoredRecord>, StoreError>;

    /// Most recently updated records.
    fn recent(&self, limit: u32) -> Result<Vec<StoredRecord>, StoreError>;

    /// Store-wide statistics.
    fn stats(&self) -> Result<StoreStats, StoreError>;
}
