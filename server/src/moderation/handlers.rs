//! Moderation HTTP handlers.
//!
//! Contact triage needs [`Moderator`]; feedback approval needs
//! [`ContentManager`].

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::contact::{ArchiveState, ContactMessage, ContactMessageType, ContactPriority, InboxStatus};
use super::feedback::{parse_queue_status, Feedback, RejectOutcome};
use super::queries::{self, InboxFilter};
use crate::api::AppState;
use crate::error::{Ack, ApiError, ApiResult};
use crate::listing::{pagination::ADMIN_PER_PAGE, Advisory, ListParams, Paginated};
use crate::permissions::{ContentManager, Moderator};
use crate::util::not_blank;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RespondRequest {
    #[validate(
        length(min = 1, max = 10000, message = "Response text is required"),
        custom(function = "not_blank")
    )]
    pub response: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    pub priority: Option<ContactPriority>,
    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
}

// ============================================================================
// Contact Messages
// ============================================================================

fn decode_page(
    rows: Vec<super::contact::ContactRow>,
    total: i64,
    page: crate::listing::PageRequest,
) -> ApiResult<Paginated<ContactMessage>> {
    let items = rows
        .into_iter()
        .map(ContactMessage::try_from)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Paginated::new(items, total, page))
}

/// List the contact inbox.
///
/// `GET /api/admin/messages?status=&type=&priority=&page=`
#[tracing::instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    Moderator(_moderator): Moderator,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<ContactMessage>>> {
    let page = params.page_request(ADMIN_PER_PAGE);

    let status = InboxStatus::parse(params.status.as_deref());
    let message_type = Advisory::<ContactMessageType>::parse_enum(params.kind.as_deref());
    let priority = Advisory::<ContactPriority>::parse_enum(params.priority.as_deref());

    let (Some(Some(status)), Some(message_type), Some(priority)) = (
        status.into_bind(),
        message_type.into_bind(),
        priority.into_bind(),
    ) else {
        return Ok(Json(Paginated::empty(page)));
    };

    let (triage, archive) = status.binds();
    let filter = InboxFilter {
        triage,
        archive,
        message_type,
        priority,
    };

    let (rows, total) = queries::list_inbox(&state.db, filter, page).await?;
    Ok(Json(decode_page(rows, total, page)?))
}

/// Open a message. A `new` message becomes `read`.
///
/// `GET /api/admin/messages/{id}`
#[tracing::instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    Moderator(_moderator): Moderator,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ContactMessage>> {
    let row = queries::mark_read(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;

    Ok(Json(ContactMessage::try_from(row)?))
}

/// Record a response.
///
/// `POST /api/admin/messages/{id}/respond`
#[tracing::instrument(skip(state, body))]
pub async fn respond_to_message(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> ApiResult<Ack<ContactMessage>> {
    body.validate()?;

    let row = queries::respond(&state.db, id, body.response.trim(), moderator.id)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;

    tracing::info!(message_id = %id, actor_id = %moderator.id, "Contact message responded");

    Ok(Ack::new("Response recorded", ContactMessage::try_from(row)?))
}

async fn set_archive(
    state: &AppState,
    id: Uuid,
    actor: Uuid,
    archive: ArchiveState,
) -> ApiResult<ContactMessage> {
    let row = queries::set_archive_state(&state.db, id, archive)
        .await?
        .ok_or(ApiError::NotFound("Message"))?;

    tracing::info!(message_id = %id, actor_id = %actor, archive = ?archive, "Contact message archive state changed");

    ContactMessage::try_from(row)
}

/// `POST /api/admin/messages/{id}/archive`
#[tracing::instrument(skip(state))]
pub async fn archive_message(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<ContactMessage>> {
    let message = set_archive(&state, id, moderator.id, ArchiveState::Archived).await?;
    Ok(Ack::new("Message archived", message))
}

/// `POST /api/admin/messages/{id}/unarchive`
#[tracing::instrument(skip(state))]
pub async fn unarchive_message(
    State(state): State<AppState>,
    Moderator(moderator): Moderator,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<ContactMessage>> {
    let message = set_archive(&state, id, moderator.id, ArchiveState::Active).await?;
    Ok(Ack::new("Message restored", message))
}

/// Edit priority or internal notes.
///
/// `PATCH /api/admin/messages/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_message(
    State(state): State<AppState>,
    Moderator(_moderator): Moderator,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMessageRequest>,
) -> ApiResult<Ack<ContactMessage>> {
    body.validate()?;

    let row = queries::update_contact_details(&state.db, id, body.priority, body.admin_notes.as_deref())
        .await?
        .ok_or(ApiError::NotFound("Message"))?;

    Ok(Ack::new("Message updated", ContactMessage::try_from(row)?))
}

// ============================================================================
// Feedback
// ============================================================================

/// Feedback queue, pending and approved.
///
/// `GET /api/admin/feedback?status=&page=`
#[tracing::instrument(skip(state))]
pub async fn list_feedback_queue(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<Feedback>>> {
    let page = params.page_request(ADMIN_PER_PAGE);
    let Some(status) = parse_queue_status(params.status.as_deref()).into_bind() else {
        return Ok(Json(Paginated::empty(page)));
    };

    let (rows, total) = queries::list_feedback_queue(&state.db, status, page).await?;
    let items = rows
        .into_iter()
        .map(Feedback::try_from)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(Paginated::new(items, total, page)))
}

/// `POST /api/admin/feedback/{id}/approve`
#[tracing::instrument(skip(state))]
pub async fn approve_feedback(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Feedback>> {
    let (row, newly_approved) = queries::approve_feedback(&state.db, id, manager.id)
        .await?
        .ok_or(ApiError::NotFound("Feedback"))?;

    if newly_approved {
        tracing::info!(feedback_id = %id, actor_id = %manager.id, "Feedback approved");
    }

    Ok(Ack::new("Feedback approved", Feedback::try_from(row)?))
}

/// Delete a pending item.
///
/// `POST /api/admin/feedback/{id}/reject`
#[tracing::instrument(skip(state))]
pub async fn reject_feedback(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    match queries::reject_feedback(&state.db, id).await? {
        RejectOutcome::Deleted => {
            tracing::info!(feedback_id = %id, actor_id = %manager.id, "Feedback rejected and deleted");
            Ok(Ack::new("Feedback rejected", id))
        }
        RejectOutcome::AlreadyApproved => Err(ApiError::Conflict(
            "Approved feedback cannot be rejected".to_string(),
        )),
        RejectOutcome::NotFound => Err(ApiError::NotFound("Feedback")),
    }
}

async fn set_featured(state: &AppState, id: Uuid, featured: bool) -> ApiResult<Feedback> {
    if let Some(row) = queries::set_feedback_featured(&state.db, id, featured).await? {
        return Feedback::try_from(row);
    }

    match queries::find_feedback(&state.db, id).await? {
        Some(_) => Err(ApiError::Conflict(
            "Only approved feedback can be featured".to_string(),
        )),
        None => Err(ApiError::NotFound("Feedback")),
    }
}

/// `POST /api/admin/feedback/{id}/feature`
#[tracing::instrument(skip(state))]
pub async fn feature_feedback(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Feedback>> {
    Ok(Ack::new("Feedback featured", set_featured(&state, id, true).await?))
}

/// `POST /api/admin/feedback/{id}/unfeature`
#[tracing::instrument(skip(state))]
pub async fn unfeature_feedback(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Feedback>> {
    Ok(Ack::new("Feedback unfeatured", set_featured(&state, id, false).await?))
}
