//! In-memory stand-in for the remote SQL query service.
//!
//! Serves `POST /query` with the same request and response shapes as the real
//! service. The bearer token is taken as the caller's user id and rows are
//! scoped to it, which is enough to exercise the client's per-user flows.

pub mod statement;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::statement::Statement;

/// A stored row. `completed` is an integer, as SQLite returns it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub completed: i64,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

pub type Db = Arc<RwLock<Vec<Todo>>>;

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Build the router over an existing store, so tests can seed or inspect it.
pub fn app_with_db(db: Db) -> Router {
    Router::new().route("/query", post(query)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_db(listener, Db::default()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

async fn query(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<QueryRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = bearer(&headers).ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    let statement =
        statement::parse(&input.sql).map_err(|msg| fail(StatusCode::BAD_REQUEST, &msg))?;
    if input.params.len() != statement.arity() {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            &format!(
                "expected {} parameters, got {}",
                statement.arity(),
                input.params.len()
            ),
        ));
    }
    debug!(user_id, ?statement, "executing");

    match statement {
        Statement::Select { completed } => {
            let todos = db.read().await;
            let rows: Vec<&Todo> = todos
                .iter()
                .filter(|t| t.user_id == user_id)
                .filter(|t| completed.is_none_or(|c| (t.completed == 1) == c))
                .collect();
            Ok(Json(json!({ "result": rows })))
        }
        Statement::Insert => {
            let text = input.params[0]
                .as_str()
                .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "text must be a string"))?;
            db.write().await.push(Todo {
                id: Uuid::new_v4().to_string(),
                text: text.to_string(),
                user_id: user_id.to_string(),
                completed: 0,
            });
            Ok(Json(json!({ "result": [] })))
        }
        Statement::SetCompleted => {
            let flag = flag_param(&input.params[0])?;
            let id = id_param(&input.params[1])?;
            let mut todos = db.write().await;
            if let Some(todo) = todos
                .iter_mut()
                .find(|t| t.id == id && t.user_id == user_id)
            {
                todo.completed = flag;
            }
            Ok(Json(json!({ "result": [] })))
        }
        Statement::Delete => {
            let id = id_param(&input.params[0])?;
            db.write()
                .await
                .retain(|t| !(t.id == id && t.user_id == user_id));
            Ok(Json(json!({ "result": [] })))
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn flag_param(value: &Value) -> Result<i64, ApiError> {
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(v @ (0 | 1)) => Ok(v),
            _ => Err(fail(StatusCode::BAD_REQUEST, "completed must be 0 or 1")),
        },
        _ => Err(fail(StatusCode::BAD_REQUEST, "completed must be 0 or 1")),
    }
}

fn id_param(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(fail(StatusCode::BAD_REQUEST, "id must be a string or number")),
    }
}

fn fail(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_completed_as_integer() {
        let todo = Todo {
            id: "a".to_string(),
            text: "Test".to_string(),
            user_id: "u".to_string(),
            completed: 1,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["completed"], 1);
        assert_eq!(json["user_id"], "u");
    }

    #[test]
    fn query_request_params_default_to_empty() {
        let input: QueryRequest = serde_json::from_str(r#"{"sql":"SELECT 1"}"#).unwrap();
        assert!(input.params.is_empty());
    }

    #[test]
    fn query_request_rejects_missing_sql() {
        let result: Result<QueryRequest, _> = serde_json::from_str(r#"{"params":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bearer_requires_non_empty_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer user_1".parse().unwrap());
        assert_eq!(bearer(&headers), Some("user_1"));
    }

    #[test]
    fn flag_param_accepts_bool_and_int() {
        assert_eq!(flag_param(&json!(true)).unwrap(), 1);
        assert_eq!(flag_param(&json!(0)).unwrap(), 0);
        assert!(flag_param(&json!(2)).is_err());
        assert!(flag_param(&json!("1")).is_err());
    }
}
