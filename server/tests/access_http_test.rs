//! HTTP tests for authentication, capability gates and visibility.
//!
//! The offline tests never reach the database. The rest are ignored and need
//! PostgreSQL: `cargo test --test access_http_test -- --ignored`

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use helpers::{login_as, unique_slug, TestApp};
use palace_server::db::{record_view, ViewCounted};
use palace_server::permissions::Role;
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Offline
// ============================================================================

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let app = TestApp::offline();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], false);
}

#[tokio::test]
async fn test_anonymous_staff_routes_are_unauthenticated() {
    let app = TestApp::offline();
    let id = Uuid::new_v4();

    for (method, uri) in [
        (Method::GET, "/api/admin/messages".to_string()),
        (Method::GET, "/api/admin/feedback".to_string()),
        (Method::GET, "/api/admin/stats".to_string()),
        (Method::GET, "/api/admin/newsletter".to_string()),
        (Method::DELETE, format!("/api/admin/announcements/{id}")),
        (Method::POST, format!("/api/admin/feedback/{id}/approve")),
        (Method::POST, format!("/api/admin/messages/{id}/archive")),
    ] {
        let (status, body) = app.send(method.clone(), &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "UNAUTHENTICATED", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let app = TestApp::offline();
    let (status, _) = app.get("/api/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_rejected() {
    let app = TestApp::offline();
    let request = TestApp::request(Method::GET, "/api/announcements")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .expect("request builds");

    let response = app.oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_with_wrong_signature_is_rejected() {
    let app = TestApp::offline();
    let forged = palace_server::auth::jwt::generate_access_token(Uuid::new_v4(), "other-secret", 900)
        .expect("token")
        .token;

    let (status, _) = app.get("/api/announcements", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_contact_validation_runs_before_storage() {
    let app = TestApp::offline();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({
                "full_name": "",
                "email": "not-an-email",
                "subject": "Land",
                "message": "Please advise"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["full_name"].is_array());
}

#[tokio::test]
async fn test_feedback_length_limit() {
    let app = TestApp::offline();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/feedback",
            None,
            Some(json!({ "author_name": "Elder", "content": "x".repeat(1001) })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["content"].is_array());
}

#[tokio::test]
async fn test_whitespace_only_submissions_are_rejected() {
    let app = TestApp::offline();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/feedback",
            None,
            Some(json!({ "author_name": "   ", "content": "    " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["fields"]["author_name"].is_array());
    assert!(body["fields"]["content"].is_array());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/contact",
            None,
            Some(json!({
                "full_name": "  ",
                "email": "ene@example.com",
                "subject": " ",
                "message": "  "
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["full_name", "subject", "message"] {
        assert!(body["fields"][field].is_array(), "{field}");
    }
}

#[tokio::test]
async fn test_unsubscribe_rejects_malformed_email() {
    let app = TestApp::offline();
    let (status, _) = app
        .send(
            Method::POST,
            "/api/newsletter/unsubscribe",
            None,
            Some(json!({ "email": "nobody" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Database
// ============================================================================

async fn insert_announcement(app: &TestApp, published: bool) -> (Uuid, String) {
    let slug = unique_slug("notice");
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO announcements (title, slug, content, is_published, publish_date)
         VALUES ('Palace notice', $1, 'The council meets on Friday.', $2,
                 CASE WHEN $2 THEN NOW() ELSE NULL END)
         RETURNING id",
    )
    .bind(&slug)
    .bind(published)
    .fetch_one(&app.pool)
    .await
    .expect("insert announcement");
    (id, slug)
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_member_is_forbidden_from_staff_routes() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::Member).await;

    for uri in ["/api/admin/messages", "/api/admin/feedback", "/api/admin/stats"] {
        let (status, body) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "FORBIDDEN");
    }
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_chief_can_triage_but_not_manage_content() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::Chief).await;

    let (status, _) = app.get("/api/admin/messages", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/admin/feedback", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_deactivated_account_token_is_rejected() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (id, token) = login_as(&app, &mut guard, Role::PalaceAdmin).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&app.pool)
        .await
        .expect("deactivate");

    let (status, body) = app.get("/api/admin/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_unpublished_announcement_hidden_from_public() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (id, slug) = insert_announcement(&app, false).await;
    guard.delete_row("announcements", id);
    let (_, member) = login_as(&app, &mut guard, Role::Member).await;
    let (_, admin) = login_as(&app, &mut guard, Role::PalaceAdmin).await;

    let uri = format!("/api/announcements/{slug}");
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&uri, Some(&member)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["announcement"]["is_published"], false);

    // A hidden item is not counted when a visitor asks for it
    let views: i32 = sqlx::query_scalar("SELECT view_count FROM announcements WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .expect("view count");
    assert_eq!(views, 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_unpublished_announcement_excluded_from_public_list() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (id, slug) = insert_announcement(&app, false).await;
    guard.delete_row("announcements", id);

    let uri = format!("/api/announcements?search={slug}");
    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_two_views_count_exactly_twice() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (id, slug) = insert_announcement(&app, true).await;
    guard.delete_row("announcements", id);

    let uri = format!("/api/announcements/{slug}");
    let (first, second) = tokio::join!(app.get(&uri, None), app.get(&uri, None));
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let views: i32 = sqlx::query_scalar("SELECT view_count FROM announcements WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .expect("view count");
    assert_eq!(views, 2);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_view_of_deleted_row_counts_nothing() {
    let app = TestApp::new().await;
    let (id, _) = insert_announcement(&app, true).await;
    sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(&app.pool)
        .await
        .expect("delete");

    let views = record_view(&app.pool, ViewCounted::Announcements, id)
        .await
        .expect("query runs");
    assert_eq!(views, None);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_manager_creates_announcement_with_publish_date() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (manager_id, token) = login_as(&app, &mut guard, Role::PalaceAdmin).await;
    let title = format!("Durbar {}", Uuid::new_v4().simple());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/announcements",
            Some(&token),
            Some(json!({
                "title": title,
                "content": "Horsemen gather at dawn.",
                "is_published": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let created = &body["data"];
    let id: Uuid = created["id"].as_str().expect("id").parse().expect("uuid");
    guard.delete_row("announcements", id);

    assert_eq!(created["author_id"], manager_id.to_string());
    assert!(created["publish_date"].is_string());
    assert!(created["slug"].as_str().is_some_and(|s| s.starts_with("durbar-")));
}
