//! Contact message triage.
//!
//! Triage moves `new → read → responded` and never backwards. Archiving is
//! an independent toggle. A responded message always carries its full
//! response record; the table's `contact_response_complete` CHECK enforces
//! the same rule at rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

// ============================================================================
// Database Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "triage_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriageState {
    New,
    Read,
    Responded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "archive_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArchiveState {
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_message_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactMessageType {
    #[default]
    General,
    Request,
    Feedback,
    Complaint,
    Suggestion,
    Media,
    Other,
}

impl ContactMessageType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "General Inquiry",
            Self::Request => "Request/Appeal",
            Self::Feedback => "Feedback",
            Self::Complaint => "Complaint",
            Self::Suggestion => "Suggestion",
            Self::Media => "Media/Press Inquiry",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactPriority {
    High,
    Normal,
    Low,
}

// ============================================================================
// Domain
// ============================================================================

/// Who answered a message, what they said, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    pub text: String,
    pub by: Uuid,
    pub at: DateTime<Utc>,
}

/// Read/response progress of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Triage {
    New,
    Read,
    Responded(ResponseRecord),
}

/// Stored row, before the triage columns are checked for consistency.
#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub village: String,
    pub address: String,
    pub subject: String,
    pub message_type: ContactMessageType,
    pub message: String,
    pub triage_state: TriageState,
    pub archive_state: ArchiveState,
    pub priority: ContactPriority,
    pub response: Option<String>,
    pub responded_by: Option<Uuid>,
    pub responded_at: Option<DateTime<Utc>>,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contact message as the API presents it.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub village: String,
    pub address: String,
    pub subject: String,
    pub message_type: ContactMessageType,
    pub message_type_label: &'static str,
    pub message: String,
    pub triage: Triage,
    pub archive_state: ArchiveState,
    /// Inbox badge derived from archive and triage state.
    pub status: &'static str,
    pub priority: ContactPriority,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single status for inbox display: archived wins, then triage.
const fn status_badge(archive: ArchiveState, triage: &Triage) -> &'static str {
    match (archive, triage) {
        (ArchiveState::Archived, _) => "archived",
        (_, Triage::Responded(_)) => "responded",
        (_, Triage::Read) => "read",
        (_, Triage::New) => "new",
    }
}

impl TryFrom<ContactRow> for ContactMessage {
    type Error = ApiError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let triage = match (row.triage_state, row.response, row.responded_by, row.responded_at) {
            (TriageState::New, None, None, None) => Triage::New,
            (TriageState::Read, None, None, None) => Triage::Read,
            (TriageState::Responded, Some(text), Some(by), Some(at)) => {
                Triage::Responded(ResponseRecord { text, by, at })
            }
            (state, text, by, at) => {
                return Err(ApiError::Invariant(format!(
                    "contact message {} has triage {state:?} with response={} responded_by={} responded_at={}",
                    row.id,
                    text.is_some(),
                    by.is_some(),
                    at.is_some(),
                )));
            }
        };

        Ok(Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            village: row.village,
            address: row.address,
            subject: row.subject,
            message_type_label: row.message_type.label(),
            message_type: row.message_type,
            message: row.message,
            status: status_badge(row.archive_state, &triage),
            triage,
            archive_state: row.archive_state,
            priority: row.priority,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Inbox `status` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InboxStatus {
    /// Everything not archived.
    #[default]
    Active,
    /// Unread, archived or not.
    New,
    Read,
    Responded,
    Archived,
}

impl InboxStatus {
    pub fn parse(raw: Option<&str>) -> crate::listing::Advisory<Self> {
        use crate::listing::Advisory;
        match Advisory::parse_with(raw, |s| match s.to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "new" | "unread" => Some(Self::New),
            "read" => Some(Self::Read),
            "responded" => Some(Self::Responded),
            "archived" => Some(Self::Archived),
            _ => None,
        }) {
            Advisory::Any => Advisory::Is(Self::default()),
            other => other,
        }
    }

    /// SQL binds for `triage_state` and `archive_state`.
    #[must_use]
    pub const fn binds(self) -> (Option<TriageState>, Option<ArchiveState>) {
        match self {
            Self::Active => (None, Some(ArchiveState::Active)),
            Self::New => (Some(TriageState::New), None),
            Self::Read => (Some(TriageState::Read), None),
            Self::Responded => (Some(TriageState::Responded), None),
            Self::Archived => (None, Some(ArchiveState::Archived)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Advisory;

    fn row(state: TriageState) -> ContactRow {
        ContactRow {
            id: Uuid::new_v4(),
            full_name: "Ene Ocheja".into(),
            email: "ene@example.com".into(),
            phone: String::new(),
            village: "Ankpa".into(),
            address: String::new(),
            subject: "Land matter".into(),
            message_type: ContactMessageType::Request,
            message: "Please advise.".into(),
            triage_state: state,
            archive_state: ArchiveState::Active,
            priority: ContactPriority::Normal,
            response: None,
            responded_by: None,
            responded_at: None,
            admin_notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_decode_consistent_rows() {
        assert_eq!(
            ContactMessage::try_from(row(TriageState::New)).unwrap().triage,
            Triage::New
        );

        let mut responded = row(TriageState::Responded);
        let by = Uuid::new_v4();
        responded.response = Some("We will meet on Friday.".into());
        responded.responded_by = Some(by);
        responded.responded_at = Some(Utc::now());
        let message = ContactMessage::try_from(responded).unwrap();
        assert_eq!(message.status, "responded");
        let Triage::Responded(r) = message.triage else {
            panic!("expected responded");
        };
        assert_eq!(r.by, by);
    }

    #[test]
    fn test_decode_partial_response_is_invariant_violation() {
        let mut partial = row(TriageState::Responded);
        partial.response = Some("text only".into());
        assert!(matches!(
            ContactMessage::try_from(partial),
            Err(ApiError::Invariant(_))
        ));

        let mut stray = row(TriageState::Read);
        stray.responded_at = Some(Utc::now());
        assert!(matches!(
            ContactMessage::try_from(stray),
            Err(ApiError::Invariant(_))
        ));
    }

    #[test]
    fn test_archive_keeps_triage_in_badge_order() {
        let mut archived = row(TriageState::Read);
        archived.archive_state = ArchiveState::Archived;
        let message = ContactMessage::try_from(archived).unwrap();
        assert_eq!(message.status, "archived");
        assert_eq!(message.triage, Triage::Read);
    }

    #[test]
    fn test_inbox_status_parse() {
        assert_eq!(InboxStatus::parse(None), Advisory::Is(InboxStatus::Active));
        assert_eq!(InboxStatus::parse(Some("unread")), Advisory::Is(InboxStatus::New));
        assert_eq!(InboxStatus::parse(Some("bogus")), Advisory::Unmatchable);
        assert_eq!(
            InboxStatus::Archived.binds(),
            (None, Some(ArchiveState::Archived))
        );
    }
}
