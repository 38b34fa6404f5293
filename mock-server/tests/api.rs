use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_query_server::{app, app_with_db, Db, Todo};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn query_request(token: Option<&str>, body: Value) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/query")
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn seeded(rows: Vec<Todo>) -> Db {
    Db::new(tokio::sync::RwLock::new(rows))
}

fn row(id: &str, user_id: &str, completed: i64) -> Todo {
    Todo {
        id: id.to_string(),
        text: format!("todo {id}"),
        user_id: user_id.to_string(),
        completed,
    }
}

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401() {
    let resp = app()
        .oneshot(query_request(None, json!({"sql": "SELECT * FROM todos;", "params": []})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({"error": "Unauthorized"}));
}

// --- select ---

#[tokio::test]
async fn select_empty() {
    let resp = app()
        .oneshot(query_request(
            Some("user_1"),
            json!({"sql": r#"SELECT * FROM "main"."todos";"#, "params": []}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"result": []}));
}

#[tokio::test]
async fn select_is_scoped_to_caller() {
    let db = seeded(vec![row("a", "user_1", 0), row("b", "user_2", 0)]);
    let resp = app_with_db(db)
        .oneshot(query_request(
            Some("user_2"),
            json!({"sql": "SELECT * FROM todos;", "params": []}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let rows = body["result"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "b");
}

#[tokio::test]
async fn select_filters_on_completed() {
    let db = seeded(vec![row("a", "user_1", 0), row("b", "user_1", 1)]);
    let resp = app_with_db(db)
        .oneshot(query_request(
            Some("user_1"),
            json!({"sql": "SELECT * FROM todos WHERE completed = 1", "params": []}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["result"], json!([{"id": "b", "text": "todo b", "user_id": "user_1", "completed": 1}]));
}

// --- errors ---

#[tokio::test]
async fn unknown_statement_returns_400_with_error() {
    let resp = app()
        .oneshot(query_request(
            Some("user_1"),
            json!({"sql": "DROP TABLE todos", "params": []}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "unsupported statement: DROP TABLE todos"})
    );
}

#[tokio::test]
async fn wrong_param_count_returns_400() {
    let resp = app()
        .oneshot(query_request(
            Some("user_1"),
            json!({"sql": "DELETE FROM todos WHERE id = ?", "params": []}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "expected 1 parameters, got 0"})
    );
}

#[tokio::test]
async fn malformed_body_is_not_json() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/query")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::AUTHORIZATION, "Bearer user_1")
                .body(r#"{"not_sql":1}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&body).is_err());
}

// --- mutations on other users' rows ---

#[tokio::test]
async fn delete_does_not_touch_other_users_rows() {
    let db = seeded(vec![row("a", "user_1", 0)]);
    let resp = app_with_db(db.clone())
        .oneshot(query_request(
            Some("user_2"),
            json!({"sql": "DELETE FROM todos WHERE id = ?", "params": ["a"]}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.len(), 1);
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // insert
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({
                "sql": "INSERT INTO todos (user_id, text) VALUES (context.id(), ?)",
                "params": ["Walk dog"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // select — should contain the one todo
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({"sql": "SELECT * FROM todos;", "params": []}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let rows = body["result"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["text"], "Walk dog");
    assert_eq!(rows[0]["user_id"], "user_1");
    assert_eq!(rows[0]["completed"], 0);
    let id = rows[0]["id"].as_str().unwrap().to_string();

    // update completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({"sql": "UPDATE todos SET completed = ? WHERE id = ?", "params": [1, id]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({"sql": "SELECT * FROM todos WHERE completed = 1;", "params": []}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"][0]["id"], id.as_str());

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({"sql": "DELETE FROM todos WHERE id = ?", "params": [id]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // select after delete — empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(query_request(
            Some("user_1"),
            json!({"sql": "SELECT * FROM todos;", "params": []}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!({"result": []}));
}
