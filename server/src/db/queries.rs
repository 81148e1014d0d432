//! User queries shared by authentication and account management, plus view counting.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::models::User;
use crate::permissions::Role;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone_number, bio, \
     profile_image, role, traditional_title, village, ward, is_verified, is_active, \
     date_joined, updated_at";

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find user by email (case-insensitive).
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
        .bind(email.trim())
        .fetch_one(pool)
        .await
}

/// Fields for a new account.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub village: &'a str,
    pub ward: &'a str,
    pub role: Role,
    pub is_verified: bool,
}

/// Insert a user. The unique email index turns duplicates into a database error.
pub async fn create_user<'e, E>(executor: E, new: &NewUser<'_>) -> sqlx::Result<User>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users
            (email, password_hash, first_name, last_name, phone_number, village, ward, role, is_verified)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(new.email.trim())
    .bind(new.password_hash)
    .bind(new.first_name.trim())
    .bind(new.last_name.trim())
    .bind(new.phone_number.trim())
    .bind(new.village.trim())
    .bind(new.ward.trim())
    .bind(new.role)
    .bind(new.is_verified)
    .fetch_one(executor)
    .await
}

/// Self-editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ProfileUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub traditional_title: Option<&'a str>,
    pub village: Option<&'a str>,
    pub ward: Option<&'a str>,
    /// `Some(None)` clears the image.
    pub profile_image: Option<Option<&'a str>>,
}

/// Update profile fields. Role, verification and active status are not touched.
pub async fn update_user_profile(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate<'_>,
) -> sqlx::Result<Option<User>> {
    let (image_set, image) = match update.profile_image {
        Some(value) => (true, value),
        None => (false, None),
    };

    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone_number = COALESCE($4, phone_number),
            bio = COALESCE($5, bio),
            traditional_title = COALESCE($6, traditional_title),
            village = COALESCE($7, village),
            ward = COALESCE($8, ward),
            profile_image = CASE WHEN $9 THEN $10 ELSE profile_image END,
            updated_at = NOW()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(update.first_name)
    .bind(update.last_name)
    .bind(update.phone_number)
    .bind(update.bio)
    .bind(update.traditional_title)
    .bind(update.village)
    .bind(update.ward)
    .bind(image_set)
    .bind(image)
    .fetch_optional(pool)
    .await
}

/// Set a user's role.
pub async fn update_user_role<'e, E>(executor: E, id: Uuid, role: Role) -> sqlx::Result<Option<User>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(role)
    .fetch_optional(executor)
    .await
}

/// Set verification and/or active flags. `None` leaves a flag unchanged.
pub async fn update_user_status(
    pool: &PgPool,
    id: Uuid,
    is_verified: Option<bool>,
    is_active: Option<bool>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            is_verified = COALESCE($2, is_verified),
            is_active = COALESCE($3, is_active),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(is_verified)
    .bind(is_active)
    .fetch_optional(pool)
    .await
}

/// List users holding `role`, newest first.
pub async fn list_users_by_role(
    pool: &PgPool,
    role: Role,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE role = $1
         ORDER BY date_joined DESC, id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(role)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Most recently joined users.
pub async fn list_recent_users(pool: &PgPool, limit: i64) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY date_joined DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Count users holding `role`.
pub async fn count_users_by_role(pool: &PgPool, role: Role) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(pool)
        .await
}

/// Content tables that keep a `view_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCounted {
    Announcements,
    Events,
    Festivals,
    GalleryImages,
    HistoryArticles,
}

impl ViewCounted {
    const fn table(self) -> &'static str {
        match self {
            Self::Announcements => "announcements",
            Self::Events => "events",
            Self::Festivals => "traditional_festivals",
            Self::GalleryImages => "gallery_images",
            Self::HistoryArticles => "history_articles",
        }
    }
}

/// Count one detail view and return the new total, or `None` if the row is gone.
///
/// The increment happens inside the UPDATE, so concurrent views are never lost.
pub async fn record_view<'e, E>(
    executor: E,
    counted: ViewCounted,
    id: Uuid,
) -> sqlx::Result<Option<i32>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(&format!(
        "UPDATE {} SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        counted.table()
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}
