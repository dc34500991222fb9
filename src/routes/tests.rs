//! Router-level tests: the assembled app driven through `oneshot`.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    AppState, build_app,
    config::{DatabaseConfig, LmsConfig, SqliteConfig},
    middleware::REQUEST_ID_HEADER,
};

const BOUNDARY: &str = "lms-test-boundary";

/// App over a SQLite file and upload root inside one temp dir. The dir must
/// outlive the router.
async fn test_app() -> (Router, TempDir) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let dir = TempDir::new().unwrap();
    let mut config = LmsConfig::default();
    config.database = DatabaseConfig::Sqlite(SqliteConfig {
        path: dir.path().join("lms.db").to_string_lossy().into_owned(),
        wal_mode: false,
        max_connections: 2,
        ..Default::default()
    });
    config.auth.jwt_secret = Some("router-test-secret-0123456789".to_string());
    config.auth.seed_default_accounts = true;
    config.storage.uploads_dir = dir.path().join("uploads");

    let state = AppState::new(config.clone())
        .await
        .expect("Failed to create AppState");
    (build_app(&config, state), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Encode text fields and at most one file as `multipart/form-data`.
fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn register_student(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "secret-pass",
                "full_name": "Test Student",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, username, "secret-pass").await
}

#[tokio::test]
async fn test_liveness_is_static() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(&app, get("/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "LMS API is running!");
}

#[tokio::test]
async fn test_readiness_checks_database() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(&app, get("/api/health/ready", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/materials", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "missing_credentials");
    assert_eq!(body["error"]["request_id"], request_id.as_str());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(&app, get("/api/auth/verify", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_token");
}

#[tokio::test]
async fn test_client_request_id_is_echoed() {
    let (app, _dir) = test_app().await;

    let request = Request::builder()
        .uri("/api/health")
        .header(REQUEST_ID_HEADER, "trace-abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "trace-abc-123"
    );
}

#[tokio::test]
async fn test_register_login_verify_flow() {
    let (app, _dir) = test_app().await;
    let token = register_student(&app, "siti").await;

    let (status, body) = send(&app, get("/api/auth/verify", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["username"], "siti");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_student_cannot_list_users() {
    let (app, _dir) = test_app().await;
    let token = register_student(&app, "budi").await;

    let (status, body) = send(&app, get("/api/users", Some(&token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn test_admin_sees_stats() {
    let (app, _dir) = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    register_student(&app, "rina").await;

    let (status, body) = send(&app, get("/api/users/stats", Some(&admin))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"]["admin"], 1);
    assert_eq!(body["users"]["teacher"], 1);
    assert_eq!(body["users"]["student"], 1);
    assert_eq!(body["users"]["total"], 3);
}

#[tokio::test]
async fn test_unknown_material_is_not_found() {
    let (app, _dir) = test_app().await;
    let token = register_student(&app, "andi").await;

    let uri = format!("/api/materials/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, get(&uri, Some(&token))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_teacher_uploads_material_and_file_is_served() {
    let (app, _dir) = test_app().await;
    let teacher = login(&app, "teacher1", "teacher123").await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/materials",
            &teacher,
            &[("title", "Week 1"), ("description", "Intro")],
            Some(("file", "intro.pdf", "application/pdf", b"%PDF-1.4 intro")),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["material"]["title"], "Week 1");
    assert_eq!(body["material"]["file_type"], "application/pdf");
    let file_path = body["material"]["file_path"].as_str().unwrap().to_string();
    assert!(file_path.starts_with("/uploads/"));

    let response = app
        .clone()
        .oneshot(get(&file_path, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 intro");
}

#[tokio::test]
async fn test_material_create_requires_title() {
    let (app, _dir) = test_app().await;
    let teacher = login(&app, "teacher1", "teacher123").await;

    let (status, body) = send(
        &app,
        multipart_request("/api/materials", &teacher, &[("description", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_attach_video_requires_a_source() {
    let (app, _dir) = test_app().await;
    let teacher = login(&app, "teacher1", "teacher123").await;

    let (status, body) = send(
        &app,
        multipart_request("/api/materials", &teacher, &[("title", "Week 2")], None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["material"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        multipart_request(&format!("/api/materials/{id}/video"), &teacher, &[], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        multipart_request(
            &format!("/api/materials/{id}/video"),
            &teacher,
            &[("youtube_url", "https://youtu.be/dQw4w9WgXcQ")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["material"]["video_type"], "external-link");
}

#[tokio::test]
async fn test_feedback_status_filter_rejects_unknown_status() {
    let (app, _dir) = test_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let (status, _) = send(&app, get("/api/feedback/status/open", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/feedback/status/pending", Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_submit_then_grade_over_http() {
    let (app, _dir) = test_app().await;
    let student = register_student(&app, "dewi").await;
    let teacher = login(&app, "teacher1", "teacher123").await;

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/assignments",
            &student,
            &[("title", "Essay")],
            Some(("file", "essay.pdf", "application/pdf", b"%PDF-1.4 essay")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["assignment"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/api/assignments/pending", Some(&teacher))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/assignments/{id}/grade"),
            Some(&teacher),
            json!({"score": 88, "comment": "Good work"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["assignment"]["status"], "graded");
    assert_eq!(body["assignment"]["score"], 88);

    let (status, body) = send(&app, get("/api/assignments/graded", Some(&teacher))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_grade_rejects_bad_bodies_as_validation_errors() {
    let (app, _dir) = test_app().await;
    let teacher = login(&app, "teacher1", "teacher123").await;
    let uri = format!("/api/assignments/{}/grade", uuid::Uuid::new_v4());

    for body in [json!({"score": 101}), json!({"comment": "no score"})] {
        let (status, json) = send(
            &app,
            json_request("PUT", &uri, Some(&teacher), body.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["error"]["code"], "validation_error", "{body}");
        assert!(json["error"]["request_id"].is_string(), "{body}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let (app, _dir) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_non_uuid_path_is_a_validation_error() {
    let (app, _dir) = test_app().await;
    let token = register_student(&app, "rina").await;

    let (status, body) = send(&app, get("/api/materials/not-a-uuid", Some(&token))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["request_id"].is_string());
}
