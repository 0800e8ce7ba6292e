//! In-memory store. Backs the test suites and ephemeral runs; behaves like the
//! SQLite store table for table, unique columns and row shape included.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::tables;
use super::{check_columns, resolve, Record, ResourceStore, StoreError};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut map = HashMap::new();
        for spec in tables::TABLES {
            map.insert(
                spec.name,
                Table {
                    next_id: 1,
                    rows: BTreeMap::new(),
                },
            );
        }
        Self {
            tables: RwLock::new(map),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn find_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, StoreError> {
        let spec = resolve(table)?;
        let guard = self.tables.read().await;
        let entry = guard
            .get(spec.name)
            .ok_or_else(|| StoreError::UnknownTable(spec.name.to_string()))?;
        Ok(entry.rows.get(&id).cloned())
    }

    async fn find_by_field(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>, StoreError> {
        let spec = resolve(table)?;
        if !spec.has_column(field) {
            return Err(StoreError::InvalidColumn(field.to_string()));
        }
        // SQL `=` never matches NULL; rows carry explicit nulls, so mirror that.
        if value.is_null() {
            return Ok(None);
        }
        let guard = self.tables.read().await;
        let entry = guard
            .get(spec.name)
            .ok_or_else(|| StoreError::UnknownTable(spec.name.to_string()))?;
        Ok(entry
            .rows
            .values()
            .find(|row| row.get(field) == Some(value))
            .cloned())
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<i64, StoreError> {
        let spec = resolve(table)?;
        check_columns(spec, record)?;
        if record.is_empty() {
            return Err(StoreError::InvalidColumn("(empty record)".to_string()));
        }

        let mut guard = self.tables.write().await;
        let entry = guard
            .get_mut(spec.name)
            .ok_or_else(|| StoreError::UnknownTable(spec.name.to_string()))?;

        for column in spec.unique_columns {
            match record.get(*column) {
                // Multiple NULLs are allowed, as in SQL.
                None | Some(Value::Null) => {}
                Some(value) => {
                    if entry.rows.values().any(|row| row.get(*column) == Some(value)) {
                        return Err(StoreError::Conflict(spec.name.to_string()));
                    }
                }
            }
        }

        let id = match record.get(spec.id_column).and_then(Value::as_i64) {
            Some(explicit) => {
                if entry.rows.contains_key(&explicit) {
                    return Err(StoreError::Conflict(spec.name.to_string()));
                }
                explicit
            }
            None => entry.next_id,
        };
        entry.next_id = entry.next_id.max(id + 1);

        // Materialize the full column set so reads look like a `SELECT *`.
        let mut row = Record::new();
        for column in spec.columns {
            row.insert((*column).to_string(), Value::Null);
        }
        for (name, value) in record {
            row.insert(name.clone(), value.clone());
        }
        row.insert(spec.id_column.to_string(), Value::from(id));
        entry.rows.insert(id, row);
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, changes: &Record) -> Result<u64, StoreError> {
        let spec = resolve(table)?;
        check_columns(spec, changes)?;
        if changes.is_empty() {
            return Ok(0);
        }

        let mut guard = self.tables.write().await;
        let entry = guard
            .get_mut(spec.name)
            .ok_or_else(|| StoreError::UnknownTable(spec.name.to_string()))?;

        for column in spec.unique_columns {
            match changes.get(*column) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    let clash = entry
                        .rows
                        .iter()
                        .any(|(row_id, row)| *row_id != id && row.get(*column) == Some(value));
                    if clash {
                        return Err(StoreError::Conflict(spec.name.to_string()));
                    }
                }
            }
        }

        match entry.rows.get_mut(&id) {
            Some(row) => {
                for (name, value) in changes {
                    row.insert(name.clone(), value.clone());
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, table: &str, id: i64) -> Result<u64, StoreError> {
        let spec = resolve(table)?;
        let mut guard = self.tables.write().await;
        let entry = guard
            .get_mut(spec.name)
            .ok_or_else(|| StoreError::UnknownTable(spec.name.to_string()))?;
        Ok(entry.rows.remove(&id).map(|_| 1).unwrap_or(0))
    }
}
