//! Stateless request builder and response parser for the query service.
//!
//! # Design
//! `QueryClient` holds only a `base_url` and carries no mutable state between
//! calls. Every operation is a `POST {base_url}/query` carrying a SQL
//! statement and positional parameters; `build_*` methods produce the
//! `HttpRequest` and `parse_*` methods consume the `HttpResponse`. The host
//! executes the round-trip in between.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{QueryRequest, QueryResult, SqlParam, Todo};

/// Statement used to reload the list after a successful insert.
pub const SELECT_ALL_SQL: &str = "SELECT * FROM todos;";

/// Initial value of the applied query.
pub const DEFAULT_APPLIED_SQL: &str = r#"SELECT * FROM "main"."todos";"#;

/// Initial value of the query edit buffer.
pub const DEFAULT_QUERY_DRAFT: &str = SELECT_ALL_SQL;

/// Insert bound to the caller's identity on the server side.
pub const INSERT_SQL: &str = "INSERT INTO todos (user_id, text) VALUES (context.id(), ?)";

pub const SET_COMPLETED_SQL: &str = "UPDATE todos SET completed = ? WHERE id = ?";

pub const DELETE_SQL: &str = "DELETE FROM todos WHERE id = ?";

/// Synchronous, stateless client for the query endpoint.
#[derive(Debug, Clone)]
pub struct QueryClient {
    base_url: String,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `POST /query` for an arbitrary statement.
    pub fn build_query(&self, token: &str, query: &QueryRequest) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(query).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            url: format!("{}/query", self.base_url),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {token}")),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    /// Run `sql` verbatim with no parameters.
    pub fn build_select(&self, token: &str, sql: &str) -> Result<HttpRequest, ApiError> {
        self.build_query(token, &QueryRequest::new(sql, Vec::new()))
    }

    pub fn build_insert(&self, token: &str, text: &str) -> Result<HttpRequest, ApiError> {
        self.build_query(token, &QueryRequest::new(INSERT_SQL, vec![text.into()]))
    }

    pub fn build_set_completed(
        &self,
        token: &str,
        id: &str,
        completed: bool,
    ) -> Result<HttpRequest, ApiError> {
        let flag = SqlParam::Integer(i64::from(completed));
        self.build_query(
            token,
            &QueryRequest::new(SET_COMPLETED_SQL, vec![flag, id.into()]),
        )
    }

    pub fn build_delete(&self, token: &str, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_query(token, &QueryRequest::new(DELETE_SQL, vec![id.into()]))
    }

    /// Parse a result set of todo rows.
    pub fn parse_rows(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response)?;
        let parsed: QueryResult = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(parsed.result)
    }

    /// Parse a mutation acknowledgment. Only the status matters; the body of a
    /// successful mutation is ignored.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Map non-2xx responses to `Server` or `UnparsableError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let status = response.status;
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(body) => {
            let message = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            Err(ApiError::Server { status, message })
        }
        Err(_) => Err(ApiError::UnparsableError { status }),
    }
}
