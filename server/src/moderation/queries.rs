//! Moderation queries.
//!
//! Each transition is one statement, so a failure leaves the row either
//! fully updated or untouched.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::contact::{
    ArchiveState, ContactMessageType, ContactPriority, ContactRow, TriageState,
};
use super::feedback::{FeedbackRow, FeedbackStatus, PublicFeedbackItem, RejectOutcome};
use crate::listing::PageRequest;

const CONTACT_COLUMNS: &str = "id, full_name, email, phone, village, address, subject, \
    message_type, message, triage_state, archive_state, priority, response, responded_by, \
    responded_at, admin_notes, created_at, updated_at";

const FEEDBACK_COLUMNS: &str = "id, author_name, author_title, author_location, content, \
    status, is_featured, approved_by, approved_at, user_id, created_at, updated_at";

// ============================================================================
// Contact messages
// ============================================================================

/// Inbox filter binds. `None` fields are not filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct InboxFilter {
    pub triage: Option<TriageState>,
    pub archive: Option<ArchiveState>,
    pub message_type: Option<ContactMessageType>,
    pub priority: Option<ContactPriority>,
}

const INBOX_WHERE: &str = "WHERE ($1::triage_state IS NULL OR triage_state = $1)
       AND ($2::archive_state IS NULL OR archive_state = $2)
       AND ($3::contact_message_type IS NULL OR message_type = $3)
       AND ($4::contact_priority IS NULL OR priority = $4)";

pub async fn list_inbox(
    pool: &PgPool,
    filter: InboxFilter,
    page: PageRequest,
) -> sqlx::Result<(Vec<ContactRow>, i64)> {
    let rows = sqlx::query_as::<_, ContactRow>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contact_messages {INBOX_WHERE}
         ORDER BY created_at DESC, id DESC
         LIMIT $5 OFFSET $6"
    ))
    .bind(filter.triage)
    .bind(filter.archive)
    .bind(filter.message_type)
    .bind(filter.priority)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM contact_messages {INBOX_WHERE}"
    ))
    .bind(filter.triage)
    .bind(filter.archive)
    .bind(filter.message_type)
    .bind(filter.priority)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find_contact_message<'e, E>(executor: E, id: Uuid) -> sqlx::Result<Option<ContactRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ContactRow>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contact_messages WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Move `new` to `read`; any other state is returned unchanged.
pub async fn mark_read<'e, E>(executor: E, id: Uuid) -> sqlx::Result<Option<ContactRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ContactRow>(&format!(
        "UPDATE contact_messages
         SET triage_state = CASE WHEN triage_state = 'new' THEN 'read'::triage_state ELSE triage_state END,
             updated_at = CASE WHEN triage_state = 'new' THEN NOW() ELSE updated_at END
         WHERE id = $1
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Record a response. Text, responder, time and triage change together.
pub async fn respond<'e, E>(
    executor: E,
    id: Uuid,
    text: &str,
    responder: Uuid,
) -> sqlx::Result<Option<ContactRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ContactRow>(&format!(
        "UPDATE contact_messages
         SET response = $2,
             responded_by = $3,
             responded_at = NOW(),
             triage_state = 'responded',
             updated_at = NOW()
         WHERE id = $1
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(id)
    .bind(text)
    .bind(responder)
    .fetch_optional(executor)
    .await
}

/// Set the archive flag. Triage is untouched.
pub async fn set_archive_state<'e, E>(
    executor: E,
    id: Uuid,
    archive: ArchiveState,
) -> sqlx::Result<Option<ContactRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ContactRow>(&format!(
        "UPDATE contact_messages
         SET archive_state = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(id)
    .bind(archive)
    .fetch_optional(executor)
    .await
}

pub async fn update_contact_details(
    pool: &PgPool,
    id: Uuid,
    priority: Option<ContactPriority>,
    admin_notes: Option<&str>,
) -> sqlx::Result<Option<ContactRow>> {
    sqlx::query_as::<_, ContactRow>(&format!(
        "UPDATE contact_messages
         SET priority = COALESCE($2, priority),
             admin_notes = COALESCE($3, admin_notes),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(id)
    .bind(priority)
    .bind(admin_notes)
    .fetch_optional(pool)
    .await
}

/// New messages that have not been archived.
pub async fn count_unread_messages(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM contact_messages WHERE triage_state = 'new' AND archive_state = 'active'",
    )
    .fetch_one(pool)
    .await
}

// ============================================================================
// Feedback
// ============================================================================

pub async fn list_feedback_queue(
    pool: &PgPool,
    status: Option<FeedbackStatus>,
    page: PageRequest,
) -> sqlx::Result<(Vec<FeedbackRow>, i64)> {
    let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
        "SELECT {FEEDBACK_COLUMNS} FROM public_feedback
         WHERE ($1::feedback_status IS NULL OR status = $1)
         ORDER BY created_at DESC, id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM public_feedback WHERE ($1::feedback_status IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Approved feedback, newest first.
pub async fn list_public_feedback(
    pool: &PgPool,
    page: PageRequest,
) -> sqlx::Result<(Vec<PublicFeedbackItem>, i64)> {
    let rows = sqlx::query_as::<_, PublicFeedbackItem>(
        "SELECT id, author_name, author_title, author_location, content, is_featured, created_at
         FROM public_feedback
         WHERE status = 'approved'
         ORDER BY created_at DESC, id DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM public_feedback WHERE status = 'approved'")
            .fetch_one(pool)
            .await?;

    Ok((rows, total))
}

pub async fn find_feedback<'e, E>(executor: E, id: Uuid) -> sqlx::Result<Option<FeedbackRow>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, FeedbackRow>(&format!(
        "SELECT {FEEDBACK_COLUMNS} FROM public_feedback WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Approve a pending item.
///
/// Returns the row and whether this call approved it. An item that is
/// already approved keeps its original approver and time.
pub async fn approve_feedback(
    pool: &PgPool,
    id: Uuid,
    approver: Uuid,
) -> sqlx::Result<Option<(FeedbackRow, bool)>> {
    let approved = sqlx::query_as::<_, FeedbackRow>(&format!(
        "UPDATE public_feedback
         SET status = 'approved', approved_by = $2, approved_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND status = 'pending'
         RETURNING {FEEDBACK_COLUMNS}"
    ))
    .bind(id)
    .bind(approver)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = approved {
        return Ok(Some((row, true)));
    }

    Ok(find_feedback(pool, id).await?.map(|row| (row, false)))
}

/// Delete a pending item. Approved items are left alone.
pub async fn reject_feedback(pool: &PgPool, id: Uuid) -> sqlx::Result<RejectOutcome> {
    let deleted: Option<Uuid> = sqlx::query_scalar(
        "DELETE FROM public_feedback WHERE id = $1 AND status = 'pending' RETURNING id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    if deleted.is_some() {
        return Ok(RejectOutcome::Deleted);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM public_feedback WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(if exists {
        RejectOutcome::AlreadyApproved
    } else {
        RejectOutcome::NotFound
    })
}

/// Toggle `is_featured` on an approved item. `None` if no approved item matches.
pub async fn set_feedback_featured(
    pool: &PgPool,
    id: Uuid,
    featured: bool,
) -> sqlx::Result<Option<FeedbackRow>> {
    sqlx::query_as::<_, FeedbackRow>(&format!(
        "UPDATE public_feedback
         SET is_featured = $2, updated_at = NOW()
         WHERE id = $1 AND status = 'approved'
         RETURNING {FEEDBACK_COLUMNS}"
    ))
    .bind(id)
    .bind(featured)
    .fetch_optional(pool)
    .await
}

pub async fn count_pending_feedback(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM public_feedback WHERE status = 'pending'")
        .fetch_one(pool)
        .await
}
