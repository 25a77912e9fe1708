//! HTTP tests that stop at authentication, authorization or request
//! validation and never reach the database.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{offline_app, request, send, send_json, token, JWT_SECRET};
use serde_json::json;
use teamtrack_shared::auth::jwt::{create_token, Claims};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = offline_app();

    for (method, uri) in [
        ("GET", "/v1/tasks"),
        ("GET", "/v1/auth/me"),
        ("GET", "/v1/users"),
        ("GET", "/v1/qa/review"),
        ("GET", "/v1/metrics/global"),
    ] {
        let (status, body) = send_json(&app, request(method, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_non_bearer_header_is_bad_request() {
    let app = offline_app();

    let req = axum::http::Request::builder()
        .uri("/v1/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, _) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_and_forged_tokens_are_rejected() {
    let app = offline_app();

    let expired = create_token(
        &Claims::new(1, "Admin", None, Duration::seconds(-60)),
        JWT_SECRET,
    )
    .unwrap();
    let (status, _) = send_json(&app, request("GET", "/v1/users", Some(&expired), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = create_token(
        &Claims::new(1, "Admin", None, Duration::hours(1)),
        "some-other-secret-that-is-long-enough",
    )
    .unwrap();
    let (status, _) = send_json(&app, request("GET", "/v1/users", Some(&forged), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_is_denied_admin_operations() {
    let app = offline_app();
    let staff = token(7, "Staff", Some("Engineering"));

    let denied = [
        request("GET", "/v1/users", Some(&staff), None),
        request("GET", "/v1/roles", Some(&staff), None),
        request("DELETE", "/v1/departments/1", Some(&staff), None),
        request("GET", "/v1/metrics/global", Some(&staff), None),
        request("GET", "/v1/metrics/8", Some(&staff), None),
        request("GET", "/v1/qa/review", Some(&staff), None),
        request("GET", "/v1/qa/reviews/1", Some(&staff), None),
        request(
            "POST",
            "/v1/tasks",
            Some(&staff),
            Some(json!({ "title": "Sneaky", "type": "individual", "assigned_to": [7] })),
        ),
        request(
            "POST",
            "/v1/qa/review/1",
            Some(&staff),
            Some(json!({ "status": "Approved" })),
        ),
    ];

    for req in denied {
        let label = format!("{} {}", req.method(), req.uri());
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", label);
        assert_eq!(body["message"], "access denied", "{}", label);
    }
}

#[tokio::test]
async fn test_qa_role_outside_qa_department_cannot_review() {
    let app = offline_app();
    let reviewer = token(9, "QA", None);

    let (status, _) =
        send_json(&app, request("GET", "/v1/qa/review", Some(&reviewer), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_review_decision_is_bad_request() {
    let app = offline_app();
    let reviewer = token(9, "QA", Some("QA"));

    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/v1/qa/review/1",
            Some(&reviewer),
            Some(json!({ "status": "Maybe" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status must be Approved or Rejected");
}

#[tokio::test]
async fn test_short_new_password_is_rejected() {
    let app = offline_app();
    let staff = token(7, "Staff", None);

    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/v1/auth/change-password",
            Some(&staff),
            Some(json!({ "current_password": "1234567", "new_password": "short" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "new_password");
}

#[tokio::test]
async fn test_empty_login_is_rejected() {
    let app = offline_app();

    let (status, _) = send_json(
        &app,
        request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": "", "password": "" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health_reports_disconnected_database() {
    let app = offline_app();

    let (status, body) = send_json(&app, request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = offline_app();

    let response = send(&app, request("GET", "/v1/tasks", None, None)).await;
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["cache-control"], "no-store");
    assert!(headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_staff_is_denied_before_request_validation() {
    let app = offline_app();
    let staff = token(7, "Staff", None);

    let requests = [
        request(
            "POST",
            "/v1/tasks",
            Some(&staff),
            Some(json!({ "title": "", "type": "individual" })),
        ),
        request(
            "PUT",
            "/v1/tasks/1",
            Some(&staff),
            Some(json!({ "status": "Done" })),
        ),
        request(
            "POST",
            "/v1/users",
            Some(&staff),
            Some(json!({ "username": "", "full_name": "", "email": "nope", "role_id": 1 })),
        ),
    ];

    for req in requests {
        let label = format!("{} {}", req.method(), req.uri());
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", label);
        assert_eq!(body["message"], "access denied", "{}", label);
    }
}

#[tokio::test]
async fn test_status_update_by_admin_is_denied_without_lookup() {
    let app = offline_app();
    let admin = token(1, "Admin", None);

    let (status, _) = send_json(
        &app,
        request(
            "PUT",
            "/v1/tasks/987654321/status",
            Some(&admin),
            Some(json!({ "status": "In Progress" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
