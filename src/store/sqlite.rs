//! sqlx-backed store over SQLite.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Column, QueryBuilder, Row, Sqlite};

use super::tables::TableSpec;
use super::{check_columns, resolve, Record, ResourceStore, StoreError};

/// Schema bootstrap, applied idempotently at startup. Only `usuario` matters to
/// the credential flows; the rest carry what the tracking frontend feeds them.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS u_tipo (
    id_tipo     INTEGER PRIMARY KEY AUTOINCREMENT,
    descripcion TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS vehiculo (
    id_vehiculo INTEGER PRIMARY KEY AUTOINCREMENT,
    placa       TEXT,
    modelo      TEXT,
    capacidad   INTEGER
);
CREATE TABLE IF NOT EXISTS usuario (
    id_u                INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre              TEXT NOT NULL,
    ap_pat              TEXT,
    ap_mat              TEXT,
    email               TEXT NOT NULL UNIQUE,
    password            TEXT NOT NULL,
    n_tel               TEXT,
    id_tipo             INTEGER NOT NULL,
    id_vehiculo         INTEGER,
    password_changed_at INTEGER
);
CREATE TABLE IF NOT EXISTS ruta (
    id_ruta INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre  TEXT NOT NULL,
    activa  INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS punto_ruta (
    id_punto INTEGER PRIMARY KEY AUTOINCREMENT,
    id_ruta  INTEGER,
    lat      REAL,
    lng      REAL,
    orden    INTEGER
);
CREATE TABLE IF NOT EXISTS rastreo (
    id_rastreo    INTEGER PRIMARY KEY AUTOINCREMENT,
    id_vehiculo   INTEGER,
    lat           REAL,
    lng           REAL,
    registrado_en TEXT
);
"#;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create any missing tables.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn bind_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            builder.push_bind(None::<String>);
        }
        Value::Bool(flag) => {
            builder.push_bind(*flag);
        }
        Value::Number(n) if n.is_i64() => {
            builder.push_bind(n.as_i64().unwrap_or_default());
        }
        Value::Number(n) => {
            builder.push_bind(n.as_f64().unwrap_or_default());
        }
        Value::String(s) => {
            builder.push_bind(s.clone());
        }
        // Arrays and objects are stored as their JSON text.
        other => {
            builder.push_bind(other.to_string());
        }
    }
}

fn row_to_record(row: &SqliteRow) -> Record {
    let mut record = Record::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        record.insert(column.name().to_string(), value);
    }
    record
}

fn map_db_err(spec: &TableSpec, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(spec.name.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ResourceStore for SqliteStore {
    async fn find_by_id(&self, table: &str, id: i64) -> Result<Option<Record>, StoreError> {
        let spec = resolve(table)?;
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT * FROM {} WHERE {} = ",
            spec.name, spec.id_column
        ));
        builder.push_bind(id);
        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_record(&r)))
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
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {} WHERE {} = ", spec.name, field));
        bind_value(&mut builder, value);
        let row = builder.build().fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_record(&r)))
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<i64, StoreError> {
        let spec = resolve(table)?;
        check_columns(spec, record)?;
        if record.is_empty() {
            return Err(StoreError::InvalidColumn("(empty record)".to_string()));
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {} (", spec.name));
        for (i, name) in record.keys().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(name.as_str());
        }
        builder.push(") VALUES (");
        for (i, value) in record.values().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            bind_value(&mut builder, value);
        }
        builder.push(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(spec, e))?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, table: &str, id: i64, changes: &Record) -> Result<u64, StoreError> {
        let spec = resolve(table)?;
        check_columns(spec, changes)?;
        if changes.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", spec.name));
        for (i, (name, value)) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(name.as_str());
            builder.push(" = ");
            bind_value(&mut builder, value);
        }
        builder.push(format!(" WHERE {} = ", spec.id_column));
        builder.push_bind(id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(spec, e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, table: &str, id: i64) -> Result<u64, StoreError> {
        let spec = resolve(table)?;
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "DELETE FROM {} WHERE {} = ",
            spec.name, spec.id_column
        ));
        builder.push_bind(id);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
