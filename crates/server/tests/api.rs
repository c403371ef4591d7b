//! End-to-end tests against the assembled router: cookie contract, route
//! guarding, and the task/board flows as a client sees them.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    server::app(DBService::new_in_memory().await.unwrap())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `session=<token>` pair from a Set-Cookie header, for replay on requests.
fn cookie_pair(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn signup(app: &Router, email: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": email, "password": "password123", "name": name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    cookie_pair(&response)
}

#[tokio::test]
async fn test_signup_sets_hardened_session_cookie() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": "alice@example.com", "password": "password123", "name": "Alice" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    let token = set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches("session=")
        .to_string();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(!body.to_string().contains("password"));
}

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let app = test_app().await;
    for uri in ["/api/tasks", "/api/board", "/api/users", "/api/stats/team", "/api/auth/me"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "not authenticated");
    }
}

#[tokio::test]
async fn test_me_logout_roundtrip() {
    let app = test_app().await;
    let cookie = signup(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Alice");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let clearing = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(clearing.starts_with("session="));
    assert!(clearing.contains("Max-Age=0"));

    // The row is gone, so the old cookie no longer authenticates.
    let response = app
        .clone()
        .oneshot(get("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out again without a live session still succeeds.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_signup_and_bad_logins_are_generic() {
    let app = test_app().await;
    signup(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({ "email": "alice@example.com", "password": "other", "name": "Imposter" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "user already exists");

    let mut messages = Vec::new();
    for (email, password) in [
        ("alice@example.com", "wrong-password"),
        ("nobody@example.com", "whatever"),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        messages.push(body_json(response).await["message"].clone());
    }
    assert_eq!(messages[0], messages[1]);
}

#[tokio::test]
async fn test_create_task_with_form_style_fields() {
    let app = test_app().await;
    let cookie = signup(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            json!({
                "title": "Write spec",
                "description": "first draft",
                "priority": "high",
                "status": "todo",
                "dueDate": "",
                "assigneeId": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Write spec");
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["due_date"], Value::Null);
    assert_eq!(body["data"]["assignee_id"], Value::Null);
    assert_eq!(body["data"]["creator_name"], "Alice");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            json!({ "title": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "task name is required");

    // Out-of-range enum values are rejected at the boundary, not stored.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            json!({ "title": "x", "status": "archived" }),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_board_move_persists_across_reads() {
    let app = test_app().await;
    let cookie = signup(&app, "alice@example.com", "Alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            Some(&cookie),
            json!({ "title": "Write spec", "status": "todo" }),
        ))
        .await
        .unwrap();
    let task_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/board/move",
            Some(&cookie),
            json!({
                "taskId": task_id,
                "source": { "status": "todo", "index": 0 },
                "destination": { "status": "in_progress", "index": 0 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["outcome"]["moved"]["to"], "in_progress");

    let response = app
        .clone()
        .oneshot(get("/api/tasks", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["status"], "in_progress");

    let response = app
        .clone()
        .oneshot(get("/api/board", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    let columns = body["data"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[1]["status"], "in_progress");
    assert_eq!(columns[1]["tasks"][0]["id"].as_i64(), Some(task_id));
    assert!(columns[0]["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_team_stats_shape() {
    let app = test_app().await;
    let cookie = signup(&app, "alice@example.com", "Alice").await;

    for status in ["todo", "done"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tasks",
                Some(&cookie),
                json!({ "title": "t", "status": status }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/stats/team", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_members"], 1);
    assert_eq!(body["data"]["open_tasks"], 1);
    assert_eq!(body["data"]["tasks_completed"], 1);
    // No task is assigned, so nobody tops the leaderboard.
    assert_eq!(body["data"]["top_performer"], Value::Null);
}
