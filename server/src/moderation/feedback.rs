//! Public feedback approval.
//!
//! Feedback is `pending` until approved. Approval is terminal and keeps the
//! first approver. Rejection deletes a pending item outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listing::Advisory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "feedback_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Approved,
}

/// Who approved a feedback item and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Approval {
    pub by: Uuid,
    pub at: DateTime<Utc>,
}

/// Stored row.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub author_name: String,
    pub author_title: String,
    pub author_location: String,
    pub content: String,
    pub status: FeedbackStatus,
    pub is_featured: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feedback as moderators see it.
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: Uuid,
    pub author_name: String,
    pub author_title: String,
    pub author_location: String,
    pub content: String,
    pub status: FeedbackStatus,
    pub approval: Option<Approval>,
    pub is_featured: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = ApiError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        let approval = match (row.status, row.approved_by, row.approved_at) {
            (FeedbackStatus::Pending, None, None) => None,
            (FeedbackStatus::Approved, Some(by), Some(at)) => Some(Approval { by, at }),
            (status, by, at) => {
                return Err(ApiError::Invariant(format!(
                    "feedback {} is {status:?} with approved_by={} approved_at={}",
                    row.id,
                    by.is_some(),
                    at.is_some()
                )));
            }
        };

        Ok(Self {
            id: row.id,
            author_name: row.author_name,
            author_title: row.author_title,
            author_location: row.author_location,
            content: row.content,
            status: row.status,
            approval,
            is_featured: row.is_featured,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Approved feedback as shown on the public site.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicFeedbackItem {
    pub id: Uuid,
    pub author_name: String,
    pub author_title: String,
    pub author_location: String,
    pub content: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a reject request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectOutcome {
    Deleted,
    AlreadyApproved,
    NotFound,
}

/// Feedback queue `status` filter. Blank lists everything.
pub fn parse_queue_status(raw: Option<&str>) -> Advisory<FeedbackStatus> {
    Advisory::parse_enum(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: FeedbackStatus) -> FeedbackRow {
        FeedbackRow {
            id: Uuid::new_v4(),
            author_name: "Elder Abu".into(),
            author_title: "Elder".into(),
            author_location: "Enjema".into(),
            content: "The palace has served us well.".into(),
            status,
            is_featured: false,
            approved_by: None,
            approved_at: None,
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_has_no_approval() {
        let feedback = Feedback::try_from(row(FeedbackStatus::Pending)).unwrap();
        assert!(feedback.approval.is_none());
    }

    #[test]
    fn test_approved_carries_approver() {
        let mut approved = row(FeedbackStatus::Approved);
        let by = Uuid::new_v4();
        approved.approved_by = Some(by);
        approved.approved_at = Some(Utc::now());
        let feedback = Feedback::try_from(approved).unwrap();
        assert_eq!(feedback.approval.map(|a| a.by), Some(by));
    }

    #[test]
    fn test_approved_without_timestamp_is_invariant_violation() {
        let mut broken = row(FeedbackStatus::Approved);
        broken.approved_by = Some(Uuid::new_v4());
        assert!(matches!(
            Feedback::try_from(broken),
            Err(ApiError::Invariant(_))
        ));
    }

    #[test]
    fn test_queue_status_parse() {
        assert_eq!(parse_queue_status(None), Advisory::Any);
        assert_eq!(
            parse_queue_status(Some("approved")),
            Advisory::Is(FeedbackStatus::Approved)
        );
        assert_eq!(parse_queue_status(Some("rejected")), Advisory::Unmatchable);
    }
}
