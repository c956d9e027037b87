//! The database driver capability consumed by the reconciler.
//!
//! The core never talks to a storage engine directly. Everything it needs
//! goes through [`Driver`]: raw batch execution, parameterized statements,
//! and row queries. Transaction boundaries are plain `BEGIN`, `COMMIT` and
//! `ROLLBACK` statements sent through [`Driver::exec`]; see
//! [`transaction`](crate::transaction) for the scoped guard built on top.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dynamically typed SQL value, used for parameters and result columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row: column names paired with values, in select order.
///
/// # Examples
///
/// ```
/// use sqlmigrate_core::{Row, Value};
///
/// let row = Row::new(
///     vec!["id".into(), "name".into()],
///     vec![Value::Integer(1), Value::Text("init".into())],
/// );
/// assert_eq!(row.get_i64("id"), Some(1));
/// assert_eq!(row.get_str("name"), Some("init"));
/// assert_eq!(row.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Builds a row. Extra columns or values beyond the shorter list are dropped.
    pub fn new(mut columns: Vec<String>, mut values: Vec<Value>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Looks up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

/// Result of a [`Driver::run`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunResult {
    /// Rows inserted, updated or deleted by the statement.
    pub changes: u64,
    /// Row id of the most recent successful insert on the connection.
    pub last_insert_id: i64,
}

/// Broad classification of a [`DriverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Malformed SQL or any other statement failure.
    Sql,
    /// A primary key or unique constraint rejected a duplicate value.
    Unique,
    /// Any other constraint (not null, check, foreign key) was violated.
    Constraint,
    /// The connection itself is unusable.
    Connection,
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverErrorKind::Sql => f.write_str("sql"),
            DriverErrorKind::Unique => f.write_str("unique constraint"),
            DriverErrorKind::Constraint => f.write_str("constraint"),
            DriverErrorKind::Connection => f.write_str("connection"),
        }
    }
}

/// A failure reported by a [`Driver`].
///
/// Carries the engine's own message unchanged so callers see the exact
/// underlying SQL error.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct DriverError {
    kind: DriverErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the engine error this one was built from.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> DriverErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for every constraint failure, including unique violations.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind, DriverErrorKind::Constraint | DriverErrorKind::Unique)
    }

    pub fn is_unique_violation(&self) -> bool {
        self.kind == DriverErrorKind::Unique
    }
}

/// Synchronous SQL execution capability.
///
/// Implementations own a single connection. Every method blocks until the
/// engine has finished with the statement. The `&mut self` receivers mean a
/// driver can only be driven by one caller at a time.
pub trait Driver {
    /// Executes one or more statements without parameters or results.
    fn exec(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Executes a single parameterized statement.
    fn run(&mut self, sql: &str, params: &[Value]) -> Result<RunResult, DriverError>;

    /// Executes a single parameterized query and collects every row.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DriverError>;
}
