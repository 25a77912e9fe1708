//! End-to-end workflow against a real PostgreSQL database
//!
//! Run with:
//!
//! ```bash
//! TEST_DATABASE_URL=postgres://localhost/teamtrack_test cargo test -p teamtrack-api -- --ignored
//! ```

mod common;

use axum::http::StatusCode;
use common::{database, request, send_json, token, unique};
use serde_json::{json, Value};
use teamtrack_shared::auth::identity::{ADMIN_ROLE, QA_DEPARTMENT, QA_ROLE, STAFF_ROLE};
use teamtrack_shared::auth::password::hash_password;
use teamtrack_shared::models::department::DepartmentRecord;
use teamtrack_shared::models::role::RoleRecord;
use teamtrack_shared::models::user::{CreateUser, User};

async fn role_id(db: &sqlx::PgPool, name: &str) -> i64 {
    RoleRecord::find_by_name(db, name)
        .await
        .unwrap()
        .expect("seeded role")
        .role_id
}

async fn qa_department_id(db: &sqlx::PgPool) -> i64 {
    DepartmentRecord::list(db)
        .await
        .unwrap()
        .into_iter()
        .find(|d| d.department_name == QA_DEPARTMENT)
        .expect("seeded QA department")
        .department_id
}

fn has_task(tasks: &Value, task_id: i64) -> bool {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["task_id"] == task_id)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_task_goes_from_pending_to_completed() {
    let (db, app) = database().await.unwrap();

    let admin_name = unique("admin");
    let admin = User::create(
        &db,
        CreateUser {
            username: admin_name.clone(),
            password_hash: hash_password("admin-password").unwrap(),
            full_name: "Test Admin".to_string(),
            email: format!("{}@example.com", admin_name),
            role_id: role_id(&db, ADMIN_ROLE).await,
            department_id: None,
        },
    )
    .await
    .unwrap();
    let admin_token = token(admin.user_id, ADMIN_ROLE, None);

    // Admin creates a staff member and a QA reviewer
    let staff_name = unique("staff");
    let (status, staff) = send_json(
        &app,
        request(
            "POST",
            "/v1/users",
            Some(&admin_token),
            Some(json!({
                "username": staff_name,
                "full_name": "Test Staff",
                "email": format!("{}@example.com", staff_name),
                "role_id": role_id(&db, STAFF_ROLE).await,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", staff);
    let staff_id = staff["user_id"].as_i64().unwrap();

    let qa_name = unique("qa");
    let (status, qa) = send_json(
        &app,
        request(
            "POST",
            "/v1/users",
            Some(&admin_token),
            Some(json!({
                "username": qa_name,
                "full_name": "Test Reviewer",
                "email": format!("{}@example.com", qa_name),
                "role_id": role_id(&db, QA_ROLE).await,
                "department_id": qa_department_id(&db).await,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", qa);
    let qa_id = qa["user_id"].as_i64().unwrap();
    let qa_token = token(qa_id, QA_ROLE, Some(QA_DEPARTMENT));

    // New accounts log in with the default password
    let (status, login) = send_json(
        &app,
        request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": staff_name, "password": "1234567" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], STAFF_ROLE);
    let staff_token = login["token"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": staff_name, "password": "wrong" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An individual task takes exactly one assignee
    let (status, _) = send_json(
        &app,
        request(
            "POST",
            "/v1/tasks",
            Some(&admin_token),
            Some(json!({
                "title": "Two people",
                "type": "individual",
                "assigned_to": [staff_id, qa_id],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, task) = send_json(
        &app,
        request(
            "POST",
            "/v1/tasks",
            Some(&admin_token),
            Some(json!({
                "title": "Write release notes",
                "type": "individual",
                "assigned_to": [staff_id],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", task);
    assert_eq!(task["status"], "Pending");
    let task_id = task["task_id"].as_i64().unwrap();
    let status_uri = format!("/v1/tasks/{}/status", task_id);

    // Staff cannot skip ahead or complete work themselves
    let (status, _) = send_json(
        &app,
        request("PUT", &status_uri, Some(&staff_token), Some(json!({ "status": "Completed" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["In Progress", "Ready for QA"] {
        let (status, body) = send_json(
            &app,
            request("PUT", &status_uri, Some(&staff_token), Some(json!({ "status": next }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["status"], next);
    }

    let (status, queue) =
        send_json(&app, request("GET", "/v1/qa/review", Some(&qa_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(has_task(&queue, task_id));

    let (status, outcome) = send_json(
        &app,
        request(
            "POST",
            &format!("/v1/qa/review/{}", task_id),
            Some(&qa_token),
            Some(json!({ "status": "Approved", "comments": "Looks good" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", outcome);
    assert_eq!(outcome["task"]["status"], "Completed");
    assert_eq!(outcome["review"]["decision"], "Approved");

    // A second decision on a completed task conflicts
    let (status, _) = send_json(
        &app,
        request(
            "POST",
            &format!("/v1/qa/review/{}", task_id),
            Some(&qa_token),
            Some(json!({ "status": "Rejected" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, staff_tasks) =
        send_json(&app, request("GET", "/v1/tasks", Some(&staff_token), None)).await;
    let completed = staff_tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["task_id"] == task_id)
        .expect("assignee still sees the task");
    assert_eq!(completed["status"], "Completed");

    let (_, qa_tasks) = send_json(&app, request("GET", "/v1/tasks", Some(&qa_token), None)).await;
    assert!(!has_task(&qa_tasks, task_id));

    let (status, metrics) = send_json(
        &app,
        request("GET", &format!("/v1/metrics/{}", staff_id), Some(&staff_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["approved"], 1);
    assert_eq!(metrics["total"], 1);

    let (status, history) = send_json(
        &app,
        request("GET", &format!("/v1/qa/reviews/{}", task_id), Some(&admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    // Cleanup
    for uri in [
        format!("/v1/tasks/{}", task_id),
        format!("/v1/users/{}", staff_id),
        format!("/v1/users/{}", qa_id),
    ] {
        let (status, _) = send_json(&app, request("DELETE", &uri, Some(&admin_token), None)).await;
        assert_eq!(status, StatusCode::OK, "DELETE {}", uri);
    }
    User::delete(&db, admin.user_id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_protected_directory_entries() {
    let (db, app) = database().await.unwrap();

    let admin_name = unique("admin");
    let admin = User::create(
        &db,
        CreateUser {
            username: admin_name.clone(),
            password_hash: hash_password("admin-password").unwrap(),
            full_name: "Test Admin".to_string(),
            email: format!("{}@example.com", admin_name),
            role_id: role_id(&db, ADMIN_ROLE).await,
            department_id: None,
        },
    )
    .await
    .unwrap();
    let admin_token = token(admin.user_id, ADMIN_ROLE, None);

    let cases = [
        format!("/v1/users/{}", admin.user_id),
        format!("/v1/roles/{}", role_id(&db, ADMIN_ROLE).await),
        format!("/v1/departments/{}", qa_department_id(&db).await),
    ];
    for uri in cases {
        let (status, _) = send_json(&app, request("DELETE", &uri, Some(&admin_token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "DELETE {}", uri);
    }

    let (status, _) = send_json(
        &app,
        request(
            "PUT",
            &format!("/v1/roles/{}", role_id(&db, ADMIN_ROLE).await),
            Some(&admin_token),
            Some(json!({ "role_name": "Superuser" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        request("DELETE", "/v1/roles/999999999", Some(&admin_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Duplicate department names conflict
    let (status, _) = send_json(
        &app,
        request(
            "POST",
            "/v1/departments",
            Some(&admin_token),
            Some(json!({ "department_name": QA_DEPARTMENT })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    User::delete(&db, admin.user_id).await.unwrap();
}
