//! Wire DTOs for the query service.
//!
//! # Design
//! These types mirror the mock server's schema but are defined independently;
//! integration tests catch drift between the two crates.
//!
//! Rows come back from SQLite, which has no boolean type and may hand out
//! integer primary keys, so `Todo` decodes leniently: ids accept strings or
//! numbers and `completed` accepts a bool or `0`/`1`. Encoding is always the
//! canonical string/bool form.

use serde::{Deserialize, Deserializer, Serialize};

/// A single todo row as returned in a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(deserialize_with = "bool_or_int")]
    pub completed: bool,
}

/// A positional statement parameter. Serialized as the bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Integer(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

/// Request payload for `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Successful `POST /query` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResult {
    pub result: Vec<Todo>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientId::deserialize(deserializer)? {
        LenientId::Text(s) => s,
        LenientId::Integer(n) => n.to_string(),
        LenientId::Float(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientBool {
    Bool(bool),
    Integer(i64),
}

fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match LenientBool::deserialize(deserializer)? {
        LenientBool::Bool(b) => Ok(b),
        LenientBool::Integer(0) => Ok(false),
        LenientBool::Integer(1) => Ok(true),
        LenientBool::Integer(n) => Err(serde::de::Error::custom(format!(
            "invalid completed flag {n}, expected 0 or 1"
        ))),
    }
}
