//! Contact triage and feedback approval against a real database.
//!
//! Run with: `cargo test --test moderation_test -- --ignored`

mod helpers;

use axum::http::{Method, StatusCode};
use helpers::{create_user_with_role, login_as, shared_pool, CleanupGuard, TestApp};
use palace_server::community::queries::{insert_contact_message, insert_feedback, NewContactMessage, NewFeedback};
use palace_server::moderation::queries;
use palace_server::moderation::{ContactMessage, ContactMessageType, Triage, TriageState};
use palace_server::permissions::Role;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

async fn new_message(pool: &PgPool) -> Uuid {
    insert_contact_message(
        pool,
        &NewContactMessage {
            full_name: "Ene Ocheja",
            email: "ene@example.com",
            phone: "",
            village: "Ankpa",
            address: "",
            subject: "Boundary dispute",
            message_type: ContactMessageType::Complaint,
            message: "Please intervene.",
        },
    )
    .await
    .expect("insert contact message")
    .id
}

async fn new_feedback(pool: &PgPool) -> Uuid {
    insert_feedback(
        pool,
        &NewFeedback {
            author_name: "Elder Abu",
            author_title: "Elder",
            author_location: "Enjema",
            content: "The palace has served us well.",
            user_id: None,
        },
    )
    .await
    .expect("insert feedback")
    .id
}

fn feedback_ids(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|f| f["id"].as_str().map(str::to_owned))
        .collect()
}

// ============================================================================
// Contact messages
// ============================================================================

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_open_then_respond_then_archive() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (moderator_id, token) = login_as(&app, &mut guard, Role::Chief).await;
    let id = new_message(&app.pool).await;
    guard.delete_row("contact_messages", id);

    let uri = format!("/api/admin/messages/{id}");
    let (status, body) = app.get(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triage"]["state"], "read");

    let (status, body) = app
        .send(
            Method::POST,
            &format!("{uri}/respond"),
            Some(&token),
            Some(json!({ "response": "  The council will visit on Friday.  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let triage = &body["data"]["triage"];
    assert_eq!(triage["state"], "responded");
    assert_eq!(triage["text"], "The council will visit on Friday.");
    assert_eq!(triage["by"], moderator_id.to_string());
    assert!(triage["at"].is_string());

    // Opening again does not move it back to read
    let (_, body) = app.get(&uri, Some(&token)).await;
    assert_eq!(body["triage"]["state"], "responded");

    let (status, body) = app
        .send(Method::POST, &format!("{uri}/archive"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["archive_state"], "archived");
    assert_eq!(body["data"]["triage"]["state"], "responded");

    let (_, inbox) = app
        .get("/api/admin/messages?status=archived", Some(&token))
        .await;
    let ids: Vec<&str> = inbox["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|m| m["id"].as_str())
        .collect();
    assert!(ids.contains(&id.to_string().as_str()));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_triage_only_moves_forward() {
    let pool = shared_pool().await;
    let mut guard = CleanupGuard::new(pool.clone());
    let moderator = create_user_with_role(pool, Role::Chief).await;
    guard.delete_user(moderator);
    let id = new_message(pool).await;
    guard.delete_row("contact_messages", id);

    let opened = queries::mark_read(pool, id).await.expect("mark read").expect("row");
    assert_eq!(opened.triage_state, TriageState::Read);
    let again = queries::mark_read(pool, id).await.expect("mark read").expect("row");
    assert_eq!(again.triage_state, TriageState::Read);

    let first = queries::respond(pool, id, "We will visit.", moderator)
        .await
        .expect("respond")
        .expect("row");
    assert_eq!(first.triage_state, TriageState::Responded);

    // Opening a responded message leaves the response in place
    let reopened = queries::mark_read(pool, id).await.expect("mark read").expect("row");
    let message = ContactMessage::try_from(reopened).expect("consistent row");
    assert_eq!(message.status, "responded");
    let Triage::Responded(record) = message.triage else {
        panic!("expected a responded message");
    };
    assert_eq!(record.text, "We will visit.");
    assert_eq!(record.by, moderator);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_second_response_replaces_the_first() {
    let pool = shared_pool().await;
    let mut guard = CleanupGuard::new(pool.clone());
    let first_moderator = create_user_with_role(pool, Role::Chief).await;
    let second_moderator = create_user_with_role(pool, Role::PalaceAdmin).await;
    guard.delete_user(first_moderator);
    guard.delete_user(second_moderator);
    let id = new_message(pool).await;
    guard.delete_row("contact_messages", id);

    queries::respond(pool, id, "First answer", first_moderator)
        .await
        .expect("respond")
        .expect("row");
    let row = queries::respond(pool, id, "Corrected answer", second_moderator)
        .await
        .expect("respond")
        .expect("row");

    assert_eq!(row.triage_state, TriageState::Responded);
    assert_eq!(row.response.as_deref(), Some("Corrected answer"));
    assert_eq!(row.responded_by, Some(second_moderator));
    assert!(row.responded_at.is_some());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_blank_response_is_rejected_and_nothing_changes() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::Chief).await;
    let id = new_message(&app.pool).await;
    guard.delete_row("contact_messages", id);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/messages/{id}/respond"),
            Some(&token),
            Some(json!({ "response": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/messages/{id}/respond"),
            Some(&token),
            Some(json!({ "response": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["response"].is_array());

    let row = queries::find_contact_message(&app.pool, id)
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.triage_state, TriageState::New);
    assert!(row.response.is_none());
    assert!(row.responded_by.is_none());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_partial_response_rejected_by_table_check() {
    let pool = shared_pool().await;
    let id = new_message(pool).await;

    let result = sqlx::query(
        "UPDATE contact_messages SET response = 'half', triage_state = 'responded' WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await;

    let err = result.expect_err("CHECK must refuse a response without responder");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("contact_response_complete"));

    sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .expect("cleanup");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_respond_to_missing_message_is_not_found() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::Chief).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/admin/messages/{}/respond", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "response": "Hello" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_unknown_inbox_filter_yields_empty_page() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::Chief).await;

    let (status, body) = app
        .get("/api/admin/messages?type=telegram", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"], json!([]));
}

// ============================================================================
// Feedback
// ============================================================================

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_approve_is_idempotent_and_keeps_first_approver() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let id = new_feedback(&app.pool).await;
    guard.delete_row("public_feedback", id);
    let (first_id, first) = login_as(&app, &mut guard, Role::PalaceAdmin).await;
    let (_, second) = login_as(&app, &mut guard, Role::Ruler).await;

    // Pending feedback is not public
    let (_, public) = app.get("/api/feedback", None).await;
    assert!(!feedback_ids(&public).contains(&id.to_string()));

    let uri = format!("/api/admin/feedback/{id}/approve");
    let (status, body) = app.send(Method::POST, &uri, Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    let approved_at = body["data"]["approval"]["at"].clone();

    let (status, body) = app.send(Method::POST, &uri, Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approval"]["by"], first_id.to_string());
    assert_eq!(body["data"]["approval"]["at"], approved_at);

    // Approved feedback is public and can no longer be rejected
    let (_, public) = app.get("/api/feedback", None).await;
    assert!(feedback_ids(&public).contains(&id.to_string()));

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/feedback/{id}/reject"),
            Some(&first),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_public_feedback_lists_newest_first() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (_, token) = login_as(&app, &mut guard, Role::PalaceAdmin).await;
    let older = new_feedback(&app.pool).await;
    guard.delete_row("public_feedback", older);
    let newer = new_feedback(&app.pool).await;
    guard.delete_row("public_feedback", newer);

    sqlx::query("UPDATE public_feedback SET created_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(older)
        .execute(&app.pool)
        .await
        .expect("backdate");

    // Approve the newer one first so approval order cannot explain the result
    for id in [newer, older] {
        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/admin/feedback/{id}/approve"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, public) = app.get("/api/feedback", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids = feedback_ids(&public);
    let position = |id: Uuid| ids.iter().position(|i| *i == id.to_string());
    let (Some(newer_at), Some(older_at)) = (position(newer), position(older)) else {
        panic!("both approved items should be on the first page: {ids:?}");
    };
    assert!(newer_at < older_at);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_reject_deletes_pending_feedback() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let id = new_feedback(&app.pool).await;
    guard.delete_row("public_feedback", id);
    let (_, token) = login_as(&app, &mut guard, Role::PalaceAdmin).await;

    let uri = format!("/api/admin/feedback/{id}/reject");
    let (status, body) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], id.to_string());

    assert!(queries::find_feedback(&app.pool, id)
        .await
        .expect("query")
        .is_none());

    let (status, _) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_pending_feedback_cannot_be_featured() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let id = new_feedback(&app.pool).await;
    guard.delete_row("public_feedback", id);
    let (_, token) = login_as(&app, &mut guard, Role::PalaceAdmin).await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/admin/feedback/{id}/feature"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_signed_in_submitter_is_linked() {
    let app = TestApp::new().await;
    let mut guard = app.cleanup_guard();
    let (member_id, token) = login_as(&app, &mut guard, Role::Member).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/feedback",
            Some(&token),
            Some(json!({ "author_name": "Adah", "content": "Thank you for the water project." })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id: Uuid = body["data"]["id"]
        .as_str()
        .expect("id")
        .parse()
        .expect("uuid");
    guard.delete_row("public_feedback", id);

    let row = queries::find_feedback(&app.pool, id)
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.user_id, Some(member_id));
}
