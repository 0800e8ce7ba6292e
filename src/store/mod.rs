//! Resource store: uniform CRUD over the tracked tables.
//!
//! Rows travel as JSON maps keyed by column name, which keeps the store
//! table-generic; typed models decode from a [`Record`] at the call site.
//! Served rows carry the table's full registered column set, absent values as
//! `Null`. The credential flows only ever touch `usuario`, everything else is
//! served to the rest of the backend through the same five verbs.

mod memory;
mod sqlite;
pub mod tables;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One table row, keyed by column name.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("invalid column name: {0}")]
    InvalidColumn(String),
    /// Unique constraint violated; the payload names the table.
    #[error("unique constraint violated on {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) fn resolve(table: &str) -> Result<&'static tables::TableSpec, StoreError> {
    tables::spec(table).ok_or_else(|| StoreError::UnknownTable(table.to_string()))
}

pub(crate) fn check_columns(spec: &tables::TableSpec, record: &Record) -> Result<(), StoreError> {
    for name in record.keys() {
        if !spec.has_column(name) {
            return Err(StoreError::InvalidColumn(name.clone()));
        }
    }
    Ok(())
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn find_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, StoreError>;

    /// First row whose `field` equals `value`, matched as stored. For `usuario`
    /// emails that means case-sensitive.
    async fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>, StoreError>;

    /// Insert a record and return its generated id.
    async fn insert(&self, table: &str, record: &Record) -> Result<i64, StoreError>;

    /// Overwrite the named columns of one row. Returns the affected row count,
    /// zero when the id does not exist.
    async fn update(&self, table: &str, id: i64, changes: &Record) -> Result<u64, StoreError>;

    /// Returns the affected row count, zero when the id does not exist.
    async fn delete(&self, table: &str, id: i64) -> Result<u64, StoreError>;
}
