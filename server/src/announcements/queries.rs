//! Announcement, category and royal message queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{
    AnnouncementCategory, Announcement, AnnouncementInput, AnnouncementType, CategoryInput,
    RoyalMessage, RoyalMessageInput,
};
use crate::error::{conflict_on_unique, invalid_reference, ApiError};
use crate::listing::PageRequest;

const SLUG_CONFLICT: &str = "An announcement with this slug already exists";
const CATEGORY_SLUG_CONFLICT: &str = "A category with this slug already exists";

// ============================================================================
// Categories
// ============================================================================

const CATEGORY_COLUMNS: &str = "id, name, slug, description, color";

pub async fn list_categories(pool: &PgPool) -> sqlx::Result<Vec<AnnouncementCategory>> {
    sqlx::query_as::<_, AnnouncementCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM announcement_categories ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn create_category(
    pool: &PgPool,
    input: &CategoryInput,
    slug: &str,
) -> Result<AnnouncementCategory, ApiError> {
    sqlx::query_as::<_, AnnouncementCategory>(&format!(
        "INSERT INTO announcement_categories (name, slug, description, color)
         VALUES ($1, $2, $3, $4)
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.color)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, CATEGORY_SLUG_CONFLICT))
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    input: &CategoryInput,
    slug: &str,
) -> Result<Option<AnnouncementCategory>, ApiError> {
    sqlx::query_as::<_, AnnouncementCategory>(&format!(
        "UPDATE announcement_categories
         SET name = $2, slug = $3, description = $4, color = $5
         WHERE id = $1
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.color)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, CATEGORY_SLUG_CONFLICT))
}

/// Announcements in the category become uncategorised.
pub async fn delete_category(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM announcement_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Announcements
// ============================================================================

const ANNOUNCEMENT_SELECT: &str = "SELECT a.id, a.title, a.slug, a.excerpt, a.content,
        a.category_id, c.name AS category_name, c.slug AS category_slug,
        c.color AS category_color, a.announcement_type, a.priority, a.featured_image,
        a.attachment, a.author_id,
        NULLIF(TRIM(u.first_name || ' ' || u.last_name), '') AS author_name,
        a.is_published, a.is_featured, a.is_pinned, a.publish_date, a.view_count,
        a.created_at, a.updated_at
    FROM announcements a
    LEFT JOIN announcement_categories c ON c.id = a.category_id
    LEFT JOIN users u ON u.id = a.author_id";

const PUBLIC_ORDER: &str =
    "ORDER BY a.is_pinned DESC, a.publish_date DESC NULLS LAST, a.created_at DESC, a.id DESC";

const LIST_WHERE: &str = "WHERE (a.is_published OR $1)
       AND ($2::text IS NULL OR c.slug = $2)
       AND ($3::announcement_type IS NULL OR a.announcement_type = $3)
       AND ($4::text IS NULL OR a.title ILIKE $4 OR a.content ILIKE $4 OR a.excerpt ILIKE $4)";

/// Public listing filter binds. `None` fields are not filtered.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub category_slug: Option<String>,
    pub announcement_type: Option<AnnouncementType>,
    pub search: Option<String>,
}

pub async fn list_announcements(
    pool: &PgPool,
    filter: &AnnouncementFilter,
    sees_unpublished: bool,
    page: PageRequest,
) -> sqlx::Result<(Vec<Announcement>, i64)> {
    let rows = sqlx::query_as::<_, Announcement>(&format!(
        "{ANNOUNCEMENT_SELECT} {LIST_WHERE} {PUBLIC_ORDER} LIMIT $5 OFFSET $6"
    ))
    .bind(sees_unpublished)
    .bind(&filter.category_slug)
    .bind(filter.announcement_type)
    .bind(&filter.search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM announcements a
         LEFT JOIN announcement_categories c ON c.id = a.category_id
         {LIST_WHERE}"
    ))
    .bind(sees_unpublished)
    .bind(&filter.category_slug)
    .bind(filter.announcement_type)
    .bind(&filter.search)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Every announcement, newest first, for the manage screen.
pub async fn list_all_announcements(
    pool: &PgPool,
    page: PageRequest,
) -> sqlx::Result<(Vec<Announcement>, i64)> {
    let rows = sqlx::query_as::<_, Announcement>(&format!(
        "{ANNOUNCEMENT_SELECT} ORDER BY a.created_at DESC, a.id DESC LIMIT $1 OFFSET $2"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total = count_announcements(pool).await?;
    Ok((rows, total))
}

pub async fn pinned_announcements(
    pool: &PgPool,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Announcement>> {
    sqlx::query_as::<_, Announcement>(&format!(
        "{ANNOUNCEMENT_SELECT}
         WHERE (a.is_published OR $1) AND a.is_pinned
         {PUBLIC_ORDER}
         LIMIT $2"
    ))
    .bind(sees_unpublished)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Latest visible announcements for the home page.
pub async fn recent_announcements(
    pool: &PgPool,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Announcement>> {
    sqlx::query_as::<_, Announcement>(&format!(
        "{ANNOUNCEMENT_SELECT}
         WHERE (a.is_published OR $1)
         ORDER BY a.publish_date DESC NULLS LAST, a.created_at DESC, a.id DESC
         LIMIT $2"
    ))
    .bind(sees_unpublished)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Announcement>> {
    sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} WHERE a.slug = $1"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn find_announcement(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Announcement>> {
    sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Other visible announcements in the same category.
pub async fn related_announcements(
    pool: &PgPool,
    announcement: &Announcement,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Announcement>> {
    sqlx::query_as::<_, Announcement>(&format!(
        "{ANNOUNCEMENT_SELECT}
         WHERE (a.is_published OR $1)
           AND a.category_id IS NOT DISTINCT FROM $2
           AND a.id <> $3
         {PUBLIC_ORDER}
         LIMIT $4"
    ))
    .bind(sees_unpublished)
    .bind(announcement.category_id)
    .bind(announcement.id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Map insert/update failures: slug clash is `Conflict`, unknown category is `InvalidInput`.
fn write_error(err: sqlx::Error) -> ApiError {
    let bad_reference =
        matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    if bad_reference {
        invalid_reference(err, "Unknown category")
    } else {
        conflict_on_unique(err, SLUG_CONFLICT)
    }
}

pub async fn create_announcement(
    pool: &PgPool,
    input: &AnnouncementInput,
    slug: &str,
    author_id: Uuid,
    publish_date: Option<DateTime<Utc>>,
) -> Result<Uuid, ApiError> {
    sqlx::query_scalar(
        "INSERT INTO announcements (
            title, slug, excerpt, content, category_id, announcement_type, priority,
            featured_image, attachment, author_id, is_published, is_featured, is_pinned,
            publish_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         RETURNING id",
    )
    .bind(&input.title)
    .bind(slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(input.category_id)
    .bind(input.announcement_type)
    .bind(input.priority)
    .bind(&input.featured_image)
    .bind(&input.attachment)
    .bind(author_id)
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.is_pinned)
    .bind(publish_date)
    .fetch_one(pool)
    .await
    .map_err(write_error)
}

/// Replace every editable field. The author is kept.
pub async fn update_announcement(
    pool: &PgPool,
    id: Uuid,
    input: &AnnouncementInput,
    slug: &str,
    publish_date: Option<DateTime<Utc>>,
) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE announcements SET
            title = $2, slug = $3, excerpt = $4, content = $5, category_id = $6,
            announcement_type = $7, priority = $8, featured_image = $9, attachment = $10,
            is_published = $11, is_featured = $12, is_pinned = $13, publish_date = $14,
            updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(&input.title)
    .bind(slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(input.category_id)
    .bind(input.announcement_type)
    .bind(input.priority)
    .bind(&input.featured_image)
    .bind(&input.attachment)
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.is_pinned)
    .bind(publish_date)
    .execute(pool)
    .await
    .map_err(write_error)?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_announcement(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_announcements(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM announcements")
        .fetch_one(pool)
        .await
}

// ============================================================================
// Royal Messages
// ============================================================================

const MESSAGE_COLUMNS: &str = "id, title, message, signature_name, image, video_url, \
    is_published, is_featured, message_date, created_at, updated_at";

pub async fn list_royal_messages(
    pool: &PgPool,
    sees_unpublished: bool,
    page: PageRequest,
) -> sqlx::Result<(Vec<RoyalMessage>, i64)> {
    let rows = sqlx::query_as::<_, RoyalMessage>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM royal_messages
         WHERE is_published OR $1
         ORDER BY message_date DESC, created_at DESC, id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(sees_unpublished)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM royal_messages WHERE is_published OR $1")
            .bind(sees_unpublished)
            .fetch_one(pool)
            .await?;

    Ok((rows, total))
}

pub async fn find_royal_message(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<RoyalMessage>> {
    sqlx::query_as::<_, RoyalMessage>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM royal_messages WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_royal_message(
    pool: &PgPool,
    input: &RoyalMessageInput,
) -> sqlx::Result<RoyalMessage> {
    sqlx::query_as::<_, RoyalMessage>(&format!(
        "INSERT INTO royal_messages (
            title, message, signature_name, image, video_url, is_published, is_featured,
            message_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(&input.title)
    .bind(&input.message)
    .bind(&input.signature_name)
    .bind(&input.image)
    .bind(input.video_url.as_deref().unwrap_or_default())
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.message_date)
    .fetch_one(pool)
    .await
}

pub async fn update_royal_message(
    pool: &PgPool,
    id: Uuid,
    input: &RoyalMessageInput,
) -> sqlx::Result<Option<RoyalMessage>> {
    sqlx::query_as::<_, RoyalMessage>(&format!(
        "UPDATE royal_messages SET
            title = $2, message = $3, signature_name = $4, image = $5, video_url = $6,
            is_published = $7, is_featured = $8, message_date = $9, updated_at = NOW()
         WHERE id = $1
         RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.title)
    .bind(&input.message)
    .bind(&input.signature_name)
    .bind(&input.image)
    .bind(input.video_url.as_deref().unwrap_or_default())
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.message_date)
    .fetch_optional(pool)
    .await
}

pub async fn delete_royal_message(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM royal_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
