//! SQLite implementation of the [`Driver`] capability.
//!
//! [`SqliteDriver`] owns a single [`rusqlite::Connection`]. There is no
//! shared or lazily created global connection: the caller opens a driver,
//! passes it by `&mut` to whatever needs it, and closes it when done.
//!
//! # Example
//!
//! ```no_run
//! use sqlmigrate_core::{Driver, Value};
//! use sqlmigrate_sqlite::SqliteDriver;
//!
//! let mut driver = SqliteDriver::open("app.db").unwrap();
//! driver.exec("CREATE TABLE IF NOT EXISTS kv (k TEXT PRIMARY KEY, v TEXT)").unwrap();
//! let result = driver
//!     .run("INSERT INTO kv (k, v) VALUES (?1, ?2)", &["a".into(), "1".into()])
//!     .unwrap();
//! assert_eq!(result.changes, 1);
//! let rows = driver.query("SELECT v FROM kv WHERE k = ?1", &[Value::from("a")]).unwrap();
//! assert_eq!(rows[0].get_str("v"), Some("1"));
//! driver.close().unwrap();
//! ```

use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode, ffi, params_from_iter};
use sqlmigrate_core::{Driver, DriverError, DriverErrorKind, Row, RunResult, Value};

use crate::error::Result;

/// A caller-owned SQLite connection implementing [`Driver`].
pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Wraps an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the driver and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        Ok(())
    }

    /// Lists the column names of `table` in declaration order.
    ///
    /// Returns an empty list if the table does not exist.
    pub fn column_names(&mut self, table: &str) -> std::result::Result<Vec<String>, DriverError> {
        let rows = self.query(
            "SELECT name FROM pragma_table_info(?1) ORDER BY cid",
            &[Value::from(table)],
        )?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_str("name").map(String::from))
            .collect())
    }
}

impl Driver for SqliteDriver {
    fn exec(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        self.conn.execute_batch(sql).map_err(driver_error)
    }

    fn run(&mut self, sql: &str, params: &[Value]) -> std::result::Result<RunResult, DriverError> {
        let changes = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sql_value)))
            .map_err(driver_error)?;
        Ok(RunResult {
            changes: changes as u64,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> std::result::Result<Vec<Row>, DriverError> {
        let mut stmt = self.conn.prepare(sql).map_err(driver_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql_value)))
            .map_err(driver_error)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(driver_error)? {
            let values = (0..column_count)
                .map(|i| row.get_ref(i).map(from_value_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(driver_error)?;
            out.push(Row::new(columns.clone(), values));
        }
        Ok(out)
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Classifies a rusqlite error and keeps it as the source.
///
/// Unique and primary key failures are told apart from other constraints by
/// the extended result code.
fn driver_error(err: rusqlite::Error) -> DriverError {
    let kind = match err.sqlite_error() {
        Some(e)
            if matches!(
                e.extended_code,
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
            ) =>
        {
            DriverErrorKind::Unique
        }
        Some(e) => match e.code {
            ErrorCode::ConstraintViolation => DriverErrorKind::Constraint,
            ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt => {
                DriverErrorKind::Connection
            }
            _ => DriverErrorKind::Sql,
        },
        None => DriverErrorKind::Sql,
    };
    DriverError::new(kind, err.to_string()).with_source(err)
}
