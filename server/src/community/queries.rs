//! Community submission queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::listing::PageRequest;
use crate::moderation::ContactMessageType;

/// Identifier and timestamp handed back to the submitter.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Receipt {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub struct NewContactMessage<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub village: &'a str,
    pub address: &'a str,
    pub subject: &'a str,
    pub message_type: ContactMessageType,
    pub message: &'a str,
}

/// Store a message as new, active and normal priority.
pub async fn insert_contact_message(
    pool: &PgPool,
    new: &NewContactMessage<'_>,
) -> sqlx::Result<Receipt> {
    sqlx::query_as::<_, Receipt>(
        "INSERT INTO contact_messages
            (full_name, email, phone, village, address, subject, message_type, message)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, created_at",
    )
    .bind(new.full_name)
    .bind(new.email)
    .bind(new.phone)
    .bind(new.village)
    .bind(new.address)
    .bind(new.subject)
    .bind(new.message_type)
    .bind(new.message)
    .fetch_one(pool)
    .await
}

pub struct NewFeedback<'a> {
    pub author_name: &'a str,
    pub author_title: &'a str,
    pub author_location: &'a str,
    pub content: &'a str,
    pub user_id: Option<Uuid>,
}

/// Store feedback as pending.
pub async fn insert_feedback(pool: &PgPool, new: &NewFeedback<'_>) -> sqlx::Result<Receipt> {
    sqlx::query_as::<_, Receipt>(
        "INSERT INTO public_feedback (author_name, author_title, author_location, content, user_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, created_at",
    )
    .bind(new.author_name)
    .bind(new.author_title)
    .bind(new.author_location)
    .bind(new.content)
    .bind(new.user_id)
    .fetch_one(pool)
    .await
}

// ============================================================================
// Newsletter
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

const SUBSCRIBER_COLUMNS: &str = "id, email, name, is_active, subscribed_at, unsubscribed_at";

/// Subscribe, or reactivate a lapsed subscription. The stored name is kept.
pub async fn subscribe(pool: &PgPool, email: &str, name: &str) -> sqlx::Result<Subscriber> {
    sqlx::query_as::<_, Subscriber>(&format!(
        "INSERT INTO newsletter_subscribers (email, name)
         VALUES ($1, $2)
         ON CONFLICT ((LOWER(email))) DO UPDATE
             SET is_active = TRUE, unsubscribed_at = NULL
         RETURNING {SUBSCRIBER_COLUMNS}"
    ))
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await
}

/// Deactivate a subscription. Returns whether an active subscription existed.
pub async fn unsubscribe(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE newsletter_subscribers
         SET is_active = FALSE, unsubscribed_at = NOW()
         WHERE LOWER(email) = LOWER($1) AND is_active",
    )
    .bind(email)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Active subscribers, newest first.
pub async fn list_active_subscribers(
    pool: &PgPool,
    page: PageRequest,
) -> sqlx::Result<(Vec<Subscriber>, i64)> {
    let rows = sqlx::query_as::<_, Subscriber>(&format!(
        "SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers
         WHERE is_active
         ORDER BY subscribed_at DESC, id DESC
         LIMIT $1 OFFSET $2"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active")
            .fetch_one(pool)
            .await?;

    Ok((rows, total))
}
