//! Announcement, category and royal message types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::permissions::Publishable;
use crate::util::BADGE_COLOR;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementType {
    RoyalMessage,
    #[default]
    Official,
    Communique,
    PressRelease,
    Notice,
    Event,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementPriority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnnouncementCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 120))]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(regex(path = *BADGE_COLOR, message = "Colour must be a theme name or #RRGGBB"))]
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "primary".to_string()
}

// ============================================================================
// Announcements
// ============================================================================

/// An announcement with its category and author resolved.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub category_color: Option<String>,
    pub announcement_type: AnnouncementType,
    pub priority: AnnouncementPriority,
    pub featured_image: Option<String>,
    pub attachment: Option<String>,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for Announcement {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementInput {
    #[validate(length(min = 1, max = 300, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 320))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub excerpt: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub announcement_type: AnnouncementType,
    #[serde(default)]
    pub priority: AnnouncementPriority,
    pub featured_image: Option<String>,
    pub attachment: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_pinned: bool,
    pub publish_date: Option<DateTime<Utc>>,
}

/// Publish date to store.
///
/// An explicit date wins, then the stored one. A published announcement
/// with neither is stamped with `now`.
#[must_use]
pub fn resolve_publish_date(
    is_published: bool,
    requested: Option<DateTime<Utc>>,
    existing: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    requested
        .or(existing)
        .or_else(|| is_published.then_some(now))
}

/// One page of announcements plus the pinned ones shown above the list.
#[derive(Debug, Serialize)]
pub struct AnnouncementList {
    #[serde(flatten)]
    pub page: crate::listing::Paginated<Announcement>,
    pub pinned: Vec<Announcement>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementDetail {
    pub announcement: Announcement,
    pub related: Vec<Announcement>,
}

// ============================================================================
// Royal Messages
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoyalMessage {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub signature_name: String,
    pub image: Option<String>,
    pub video_url: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub message_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for RoyalMessage {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoyalMessageInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[validate(length(min = 1, max = 200))]
    #[serde(default = "default_signature")]
    pub signature_name: String,
    pub image: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub message_date: NaiveDate,
}

fn default_signature() -> String {
    "His Royal Majesty, The Ejeh of Ankpa".to_string()
}
