use anyhow::Result;
use libsql::{Builder, Connection, Row, Value};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::constants::DATABASE_FILE;
use crate::error::AppError;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT    UNIQUE NOT NULL,
    email          TEXT    NOT NULL DEFAULT '',
    password_hash  TEXT    NOT NULL,
    date_joined    INTEGER NOT NULL
);
"#;

const CREATE_PROGRAMMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS programmes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT    NOT NULL,
    description  TEXT,
    start_time   TEXT    NOT NULL,
    end_time     TEXT,
    location     TEXT,
    host         TEXT,
    created_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS financial_transactions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    date          TEXT    NOT NULL,
    type          TEXT    NOT NULL,
    category      TEXT    NOT NULL,
    amount_cents  INTEGER NOT NULL,
    description   TEXT,
    recorded_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);
"#;

const CREATE_TODO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todo_items (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    task         TEXT    NOT NULL,
    description  TEXT,
    due_date     TEXT,
    priority     TEXT    NOT NULL DEFAULT 'medium',
    completed    INTEGER NOT NULL DEFAULT 0,
    created_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const CREATE_COMMERCIALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS commercials (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT    NOT NULL,
    advertiser        TEXT    NOT NULL,
    duration_seconds  INTEGER NOT NULL,
    start_date        TEXT,
    end_date          TEXT,
    cost_cents        INTEGER,
    notes             TEXT,
    created_by        INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at        INTEGER NOT NULL,
    updated_at        INTEGER NOT NULL
);
"#;

const SCHEMA: [&str; 5] = [
    CREATE_USERS_TABLE,
    CREATE_PROGRAMMES_TABLE,
    CREATE_TRANSACTIONS_TABLE,
    CREATE_TODO_TABLE,
    CREATE_COMMERCIALS_TABLE,
];

pub type Db = Arc<RwLock<Connection>>;

/// Opens (creating if needed) the station database under `data_dir`.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    // SET NULL on account removal depends on this, and it is per connection.
    conn.execute("PRAGMA foreign_keys = ON", ()).await?;
    for statement in SCHEMA {
        conn.execute(statement, ()).await?;
    }
    Ok(Arc::new(RwLock::new(conn)))
}

pub fn now_timestamp() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn column(row: &Row, idx: i32) -> Result<Value, AppError> {
    Ok(row.get_value(idx)?)
}

pub fn get_i64(row: &Row, idx: i32) -> Result<i64, AppError> {
    match column(row, idx)? {
        Value::Integer(v) => Ok(v),
        other => Err(AppError::Corrupt(format!(
            "column {} expected integer, got {:?}",
            idx, other
        ))),
    }
}

pub fn get_opt_i64(row: &Row, idx: i32) -> Result<Option<i64>, AppError> {
    match column(row, idx)? {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        other => Err(AppError::Corrupt(format!(
            "column {} expected integer or null, got {:?}",
            idx, other
        ))),
    }
}

pub fn get_text(row: &Row, idx: i32) -> Result<String, AppError> {
    match column(row, idx)? {
        Value::Text(v) => Ok(v),
        other => Err(AppError::Corrupt(format!(
            "column {} expected text, got {:?}",
            idx, other
        ))),
    }
}

pub fn get_opt_text(row: &Row, idx: i32) -> Result<Option<String>, AppError> {
    match column(row, idx)? {
        Value::Null => Ok(None),
        Value::Text(v) => Ok(Some(v)),
        other => Err(AppError::Corrupt(format!(
            "column {} expected text or null, got {:?}",
            idx, other
        ))),
    }
}

pub fn text_value(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn opt_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text_value)
}

pub fn opt_i64_value(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}
