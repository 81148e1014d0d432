//! Event, category and festival queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{Event, EventCategory, EventCategoryInput, EventInput, EventType, Festival, FestivalInput};
use crate::error::{conflict_on_unique, invalid_reference, ApiError};
use crate::listing::{PageRequest, Window};

const SLUG_CONFLICT: &str = "An event with this slug already exists";
const CATEGORY_SLUG_CONFLICT: &str = "A category with this slug already exists";
const FESTIVAL_SLUG_CONFLICT: &str = "A festival with this slug already exists";

// ============================================================================
// Categories
// ============================================================================

const CATEGORY_COLUMNS: &str = "id, name, slug, description, color, icon";

pub async fn list_categories(pool: &PgPool) -> sqlx::Result<Vec<EventCategory>> {
    sqlx::query_as::<_, EventCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM event_categories ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn create_category(
    pool: &PgPool,
    input: &EventCategoryInput,
    slug: &str,
) -> Result<EventCategory, ApiError> {
    sqlx::query_as::<_, EventCategory>(&format!(
        "INSERT INTO event_categories (name, slug, description, color, icon)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.color)
    .bind(&input.icon)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, CATEGORY_SLUG_CONFLICT))
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    input: &EventCategoryInput,
    slug: &str,
) -> Result<Option<EventCategory>, ApiError> {
    sqlx::query_as::<_, EventCategory>(&format!(
        "UPDATE event_categories
         SET name = $2, slug = $3, description = $4, color = $5, icon = $6
         WHERE id = $1
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.color)
    .bind(&input.icon)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, CATEGORY_SLUG_CONFLICT))
}

pub async fn delete_category(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM event_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Events
// ============================================================================

const EVENT_SELECT: &str = "SELECT e.id, e.title, e.slug, e.description, e.short_description,
        e.category_id, c.name AS category_name, c.slug AS category_slug,
        c.color AS category_color, e.event_type, e.start_date, e.end_date, e.is_all_day,
        e.recurrence, e.venue, e.address, e.map_url, e.featured_image, e.dress_code,
        e.special_instructions, e.contact_info, e.is_published, e.is_featured,
        e.is_cancelled, e.view_count, e.created_at, e.updated_at
    FROM events e
    LEFT JOIN event_categories c ON c.id = e.category_id";

const EVENT_ORDER: &str = "ORDER BY e.start_date, e.id";

const LIST_WHERE: &str = "WHERE (e.is_published OR $1)
       AND NOT e.is_cancelled
       AND ($2::timestamptz IS NULL OR e.start_date >= $2)
       AND ($3::timestamptz IS NULL OR e.start_date < $3)
       AND ($4::text IS NULL OR c.slug = $4)
       AND ($5::event_type IS NULL OR e.event_type = $5)
       AND ($6::text IS NULL OR e.title ILIKE $6 OR e.description ILIKE $6 OR e.venue ILIKE $6)";

/// Public listing filter binds. `None` fields are not filtered.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub window: Window,
    pub category_slug: Option<String>,
    pub event_type: Option<EventType>,
    pub search: Option<String>,
}

/// Visible, non-cancelled events ordered by start.
pub async fn list_events(
    pool: &PgPool,
    filter: &EventFilter,
    sees_unpublished: bool,
    page: PageRequest,
) -> sqlx::Result<(Vec<Event>, i64)> {
    let rows = sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT} {LIST_WHERE} {EVENT_ORDER} LIMIT $7 OFFSET $8"
    ))
    .bind(sees_unpublished)
    .bind(filter.window.from)
    .bind(filter.window.to)
    .bind(&filter.category_slug)
    .bind(filter.event_type)
    .bind(&filter.search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM events e
         LEFT JOIN event_categories c ON c.id = e.category_id
         {LIST_WHERE}"
    ))
    .bind(sees_unpublished)
    .bind(filter.window.from)
    .bind(filter.window.to)
    .bind(&filter.category_slug)
    .bind(filter.event_type)
    .bind(&filter.search)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Every event, latest start first, for the manage screen.
pub async fn list_all_events(pool: &PgPool, page: PageRequest) -> sqlx::Result<(Vec<Event>, i64)> {
    let rows = sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT} ORDER BY e.start_date DESC, e.id DESC LIMIT $1 OFFSET $2"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Visible, non-cancelled events starting at or after `now`.
pub async fn upcoming_events(
    pool: &PgPool,
    now: DateTime<Utc>,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT}
         WHERE (e.is_published OR $1) AND NOT e.is_cancelled AND e.start_date >= $2
         {EVENT_ORDER}
         LIMIT $3"
    ))
    .bind(sees_unpublished)
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn featured_upcoming(
    pool: &PgPool,
    now: DateTime<Utc>,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT}
         WHERE (e.is_published OR $1) AND e.is_featured AND NOT e.is_cancelled
           AND e.start_date >= $2
         {EVENT_ORDER}
         LIMIT $3"
    ))
    .bind(sees_unpublished)
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Upcoming events in the same category, excluding `event`.
pub async fn related_upcoming(
    pool: &PgPool,
    event: &Event,
    now: DateTime<Utc>,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT}
         WHERE (e.is_published OR $1) AND NOT e.is_cancelled
           AND e.category_id IS NOT DISTINCT FROM $2
           AND e.id <> $3
           AND e.start_date >= $4
         {EVENT_ORDER}
         LIMIT $5"
    ))
    .bind(sees_unpublished)
    .bind(event.category_id)
    .bind(event.id)
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Every visible, non-cancelled event for the calendar feed.
pub async fn calendar_events(pool: &PgPool, sees_unpublished: bool) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT}
         WHERE (e.is_published OR $1) AND NOT e.is_cancelled
         {EVENT_ORDER}"
    ))
    .bind(sees_unpublished)
    .fetch_all(pool)
    .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>(&format!("{EVENT_SELECT} WHERE e.slug = $1"))
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn find_event(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>(&format!("{EVENT_SELECT} WHERE e.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn write_error(err: sqlx::Error) -> ApiError {
    let bad_reference =
        matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    if bad_reference {
        invalid_reference(err, "Unknown category")
    } else {
        conflict_on_unique(err, SLUG_CONFLICT)
    }
}

pub async fn create_event(pool: &PgPool, input: &EventInput, slug: &str) -> Result<Uuid, ApiError> {
    sqlx::query_scalar(
        "INSERT INTO events (
            title, slug, description, short_description, category_id, event_type, start_date,
            end_date, is_all_day, recurrence, venue, address, map_url, featured_image,
            dress_code, special_instructions, contact_info, is_published, is_featured,
            is_cancelled)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                 $18, $19, $20)
         RETURNING id",
    )
    .bind(&input.title)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.short_description)
    .bind(input.category_id)
    .bind(input.event_type)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.is_all_day)
    .bind(input.recurrence)
    .bind(&input.venue)
    .bind(&input.address)
    .bind(input.map_url.as_deref().unwrap_or_default())
    .bind(&input.featured_image)
    .bind(&input.dress_code)
    .bind(&input.special_instructions)
    .bind(&input.contact_info)
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.is_cancelled)
    .fetch_one(pool)
    .await
    .map_err(write_error)
}

pub async fn update_event(
    pool: &PgPool,
    id: Uuid,
    input: &EventInput,
    slug: &str,
) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE events SET
            title = $2, slug = $3, description = $4, short_description = $5,
            category_id = $6, event_type = $7, start_date = $8, end_date = $9,
            is_all_day = $10, recurrence = $11, venue = $12, address = $13, map_url = $14,
            featured_image = $15, dress_code = $16, special_instructions = $17,
            contact_info = $18, is_published = $19, is_featured = $20, is_cancelled = $21,
            updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(&input.title)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.short_description)
    .bind(input.category_id)
    .bind(input.event_type)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.is_all_day)
    .bind(input.recurrence)
    .bind(&input.venue)
    .bind(&input.address)
    .bind(input.map_url.as_deref().unwrap_or_default())
    .bind(&input.featured_image)
    .bind(&input.dress_code)
    .bind(&input.special_instructions)
    .bind(&input.contact_info)
    .bind(input.is_published)
    .bind(input.is_featured)
    .bind(input.is_cancelled)
    .execute(pool)
    .await
    .map_err(write_error)?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_event(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_published_events(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE is_published")
        .fetch_one(pool)
        .await
}

// ============================================================================
// Traditional Festivals
// ============================================================================

const FESTIVAL_COLUMNS: &str = "id, name, slug, description, history, typical_month, \
    duration_days, featured_image, activities, traditional_attire, food_and_drinks, is_active, \
    is_published, is_featured, view_count, created_at, updated_at";

/// Festivals still celebrated, by typical month.
pub async fn list_festivals(pool: &PgPool, sees_unpublished: bool) -> sqlx::Result<Vec<Festival>> {
    sqlx::query_as::<_, Festival>(&format!(
        "SELECT {FESTIVAL_COLUMNS} FROM traditional_festivals
         WHERE is_active AND (is_published OR $1)
         ORDER BY typical_month NULLS LAST, name, id"
    ))
    .bind(sees_unpublished)
    .fetch_all(pool)
    .await
}

pub async fn find_festival_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Festival>> {
    sqlx::query_as::<_, Festival>(&format!(
        "SELECT {FESTIVAL_COLUMNS} FROM traditional_festivals WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn create_festival(
    pool: &PgPool,
    input: &FestivalInput,
    slug: &str,
) -> Result<Festival, ApiError> {
    sqlx::query_as::<_, Festival>(&format!(
        "INSERT INTO traditional_festivals (
            name, slug, description, history, typical_month, duration_days, featured_image,
            activities, traditional_attire, food_and_drinks, is_active, is_published,
            is_featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING {FESTIVAL_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.history)
    .bind(input.typical_month)
    .bind(input.duration_days)
    .bind(&input.featured_image)
    .bind(&input.activities)
    .bind(&input.traditional_attire)
    .bind(&input.food_and_drinks)
    .bind(input.is_active)
    .bind(input.is_published)
    .bind(input.is_featured)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, FESTIVAL_SLUG_CONFLICT))
}

pub async fn update_festival(
    pool: &PgPool,
    id: Uuid,
    input: &FestivalInput,
    slug: &str,
) -> Result<Option<Festival>, ApiError> {
    sqlx::query_as::<_, Festival>(&format!(
        "UPDATE traditional_festivals SET
            name = $2, slug = $3, description = $4, history = $5, typical_month = $6,
            duration_days = $7, featured_image = $8, activities = $9,
            traditional_attire = $10, food_and_drinks = $11, is_active = $12,
            is_published = $13, is_featured = $14, updated_at = NOW()
         WHERE id = $1
         RETURNING {FESTIVAL_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.history)
    .bind(input.typical_month)
    .bind(input.duration_days)
    .bind(&input.featured_image)
    .bind(&input.activities)
    .bind(&input.traditional_attire)
    .bind(&input.food_and_drinks)
    .bind(input.is_active)
    .bind(input.is_published)
    .bind(input.is_featured)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, FESTIVAL_SLUG_CONFLICT))
}

pub async fn delete_festival(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM traditional_festivals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
