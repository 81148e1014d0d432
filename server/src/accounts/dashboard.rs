//! Role dashboards and site statistics.

use serde::Serialize;
use sqlx::PgPool;

use crate::announcements::Announcement;
use crate::db::UserProfile;
use crate::events::EventView;
use crate::moderation::queries::{count_pending_feedback, count_unread_messages};
use crate::permissions::Role;

/// Which dashboard a role lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Admin,
    Chief,
    Member,
}

impl DashboardKind {
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        if role.is_palace_admin_or_above() {
            Self::Admin
        } else if role.is_chief_or_above() {
            Self::Chief
        } else {
            Self::Member
        }
    }
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteStats {
    pub total_users: i64,
    pub total_members: i64,
    pub unread_messages: i64,
    pub published_events: i64,
    pub total_announcements: i64,
    pub total_images: i64,
    pub pending_feedback: i64,
}

impl SiteStats {
    pub async fn load(pool: &PgPool) -> sqlx::Result<Self> {
        let (
            total_users,
            total_members,
            unread_messages,
            published_events,
            total_announcements,
            total_images,
            pending_feedback,
        ) = tokio::try_join!(
            count_all_users(pool),
            crate::db::count_users_by_role(pool, Role::Member),
            count_unread_messages(pool),
            crate::events::queries::count_published_events(pool),
            crate::announcements::queries::count_announcements(pool),
            crate::palace::gallery::count_images(pool),
            count_pending_feedback(pool),
        )?;

        Ok(Self {
            total_users,
            total_members,
            unread_messages,
            published_events,
            total_announcements,
            total_images,
            pending_feedback,
        })
    }
}

async fn count_all_users(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

/// Dashboard payload, tagged by `kind`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dashboard {
    Admin {
        stats: SiteStats,
        recent_users: Vec<UserProfile>,
    },
    Chief {
        recent_announcements: Vec<Announcement>,
        upcoming_events: Vec<EventView>,
    },
    Member {
        profile: UserProfile,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_kind_by_role() {
        assert_eq!(DashboardKind::for_role(Role::Ruler), DashboardKind::Admin);
        assert_eq!(DashboardKind::for_role(Role::PalaceAdmin), DashboardKind::Admin);
        assert_eq!(DashboardKind::for_role(Role::Chief), DashboardKind::Chief);
        assert_eq!(DashboardKind::for_role(Role::Member), DashboardKind::Member);
        assert_eq!(DashboardKind::for_role(Role::Visitor), DashboardKind::Member);
    }

    #[test]
    fn test_dashboard_is_tagged() {
        let json = serde_json::to_value(Dashboard::Admin {
            stats: SiteStats::default(),
            recent_users: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["kind"], "admin");
        assert_eq!(json["stats"]["pending_feedback"], 0);
    }
}
