//! Announcement and royal message HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::queries::{self, AnnouncementFilter};
use super::types::{
    resolve_publish_date, Announcement, AnnouncementCategory, AnnouncementDetail,
    AnnouncementInput, AnnouncementList, AnnouncementType, CategoryInput, RoyalMessage,
    RoyalMessageInput,
};
use crate::api::AppState;
use crate::auth::Viewer;
use crate::db::{record_view, ViewCounted};
use crate::error::{Ack, ApiError, ApiResult};
use crate::listing::pagination::{ADMIN_PER_PAGE, ANNOUNCEMENTS_PER_PAGE, ROYAL_MESSAGES_PER_PAGE};
use crate::listing::{Advisory, ListParams, Paginated};
use crate::permissions::{require_visible, sees_unpublished, ContentManager};
use crate::util::slug_or_title;

const PINNED_LIMIT: i64 = 3;
const RELATED_LIMIT: i64 = 3;

// ============================================================================
// Categories
// ============================================================================

/// `GET /api/announcements/categories`
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AnnouncementCategory>>> {
    Ok(Json(queries::list_categories(&state.db).await?))
}

/// `POST /api/admin/announcements/categories`
#[tracing::instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Json(body): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Ack<AnnouncementCategory>)> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = queries::create_category(&state.db, &body, &slug).await?;
    Ok((StatusCode::CREATED, Ack::new("Category created", category)))
}

/// `PUT /api/admin/announcements/categories/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryInput>,
) -> ApiResult<Ack<AnnouncementCategory>> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = queries::update_category(&state.db, id, &body, &slug)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(Ack::new("Category updated", category))
}

/// `DELETE /api/admin/announcements/categories/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_category(&state.db, id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(Ack::new("Category deleted", id))
}

// ============================================================================
// Announcements
// ============================================================================

/// `GET /api/announcements?category=&type=&search=&page=`
#[tracing::instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<AnnouncementList>> {
    let page = params.page_request(ANNOUNCEMENTS_PER_PAGE);
    let sees = sees_unpublished(&viewer);
    let pinned = queries::pinned_announcements(&state.db, sees, PINNED_LIMIT).await?;

    let announcement_type = Advisory::<AnnouncementType>::parse_enum(params.kind.as_deref());
    let (Some(category_slug), Some(announcement_type)) =
        (params.category().into_bind(), announcement_type.into_bind())
    else {
        return Ok(Json(AnnouncementList {
            page: Paginated::empty(page),
            pinned,
        }));
    };

    let filter = AnnouncementFilter {
        category_slug,
        announcement_type,
        search: params.search_pattern(),
    };
    let (items, total) = queries::list_announcements(&state.db, &filter, sees, page).await?;

    Ok(Json(AnnouncementList {
        page: Paginated::new(items, total, page),
        pinned,
    }))
}

/// `GET /api/announcements/{slug}`
#[tracing::instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<AnnouncementDetail>> {
    let mut announcement = require_visible(
        queries::find_by_slug(&state.db, &slug).await?,
        &viewer,
        "Announcement",
    )?;
    announcement.view_count = record_view(&state.db, ViewCounted::Announcements, announcement.id)
        .await?
        .ok_or(ApiError::NotFound("Announcement"))?;

    let related = queries::related_announcements(
        &state.db,
        &announcement,
        sees_unpublished(&viewer),
        RELATED_LIMIT,
    )
    .await?;

    Ok(Json(AnnouncementDetail {
        announcement,
        related,
    }))
}

/// Manage list: every announcement, newest first.
///
/// `GET /api/admin/announcements?page=`
#[tracing::instrument(skip(state))]
pub async fn manage_announcements(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<Announcement>>> {
    let page = params.page_request(ADMIN_PER_PAGE);
    let (items, total) = queries::list_all_announcements(&state.db, page).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

/// `POST /api/admin/announcements`
#[tracing::instrument(skip(state, body))]
pub async fn create_announcement(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<AnnouncementInput>,
) -> ApiResult<(StatusCode, Ack<Announcement>)> {
    body.validate()?;

    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    let publish_date = resolve_publish_date(body.is_published, body.publish_date, None, Utc::now());
    let id = queries::create_announcement(&state.db, &body, &slug, manager.id, publish_date).await?;
    let announcement = queries::find_announcement(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Announcement"))?;

    tracing::info!(announcement_id = %id, actor_id = %manager.id, published = body.is_published, "Announcement created");
    Ok((StatusCode::CREATED, Ack::new("Announcement created", announcement)))
}

/// `PUT /api/admin/announcements/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_announcement(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<AnnouncementInput>,
) -> ApiResult<Ack<Announcement>> {
    body.validate()?;

    let existing = queries::find_announcement(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Announcement"))?;

    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    let publish_date = resolve_publish_date(
        body.is_published,
        body.publish_date,
        existing.publish_date,
        Utc::now(),
    );
    if !queries::update_announcement(&state.db, id, &body, &slug, publish_date).await? {
        return Err(ApiError::NotFound("Announcement"));
    }
    let announcement = queries::find_announcement(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Announcement"))?;

    tracing::info!(announcement_id = %id, actor_id = %manager.id, "Announcement updated");
    Ok(Ack::new("Announcement updated", announcement))
}

/// `DELETE /api/admin/announcements/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_announcement(&state.db, id).await? {
        return Err(ApiError::NotFound("Announcement"));
    }
    tracing::info!(announcement_id = %id, actor_id = %manager.id, "Announcement deleted");
    Ok(Ack::new("Announcement deleted", id))
}

// ============================================================================
// Royal Messages
// ============================================================================

/// `GET /api/royal-messages?page=`
#[tracing::instrument(skip(state))]
pub async fn list_royal_messages(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<RoyalMessage>>> {
    let page = params.page_request(ROYAL_MESSAGES_PER_PAGE);
    let (items, total) =
        queries::list_royal_messages(&state.db, sees_unpublished(&viewer), page).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

/// `GET /api/royal-messages/{id}`
pub async fn get_royal_message(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoyalMessage>> {
    let message = require_visible(
        queries::find_royal_message(&state.db, id).await?,
        &viewer,
        "Royal message",
    )?;
    Ok(Json(message))
}

/// `POST /api/admin/royal-messages`
#[tracing::instrument(skip(state, body))]
pub async fn create_royal_message(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<RoyalMessageInput>,
) -> ApiResult<(StatusCode, Ack<RoyalMessage>)> {
    body.validate()?;
    let message = queries::create_royal_message(&state.db, &body).await?;
    tracing::info!(royal_message_id = %message.id, actor_id = %manager.id, "Royal message created");
    Ok((StatusCode::CREATED, Ack::new("Royal message created", message)))
}

/// `PUT /api/admin/royal-messages/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_royal_message(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<RoyalMessageInput>,
) -> ApiResult<Ack<RoyalMessage>> {
    body.validate()?;
    let message = queries::update_royal_message(&state.db, id, &body)
        .await?
        .ok_or(ApiError::NotFound("Royal message"))?;
    Ok(Ack::new("Royal message updated", message))
}

/// `DELETE /api/admin/royal-messages/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_royal_message(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_royal_message(&state.db, id).await? {
        return Err(ApiError::NotFound("Royal message"));
    }
    Ok(Ack::new("Royal message deleted", id))
}
