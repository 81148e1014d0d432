//! Council of Chiefs profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, invalid_reference, ApiError};
use crate::permissions::Publishable;

/// A chief's profile with the holder's name resolved.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChiefProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub domain: String,
    pub installation_date: Option<NaiveDate>,
    pub is_active: bool,
    pub display_order: i32,
    pub first_name: String,
    pub last_name: String,
    pub village: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inactive chiefs are hidden from the public council page.
impl Publishable for ChiefProfile {
    fn is_published(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChiefInput {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Chieftaincy title is required"))]
    pub title: String,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub domain: String,
    pub installation_date: Option<NaiveDate>,
    #[serde(default = "crate::util::default_true")]
    pub is_active: bool,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub display_order: i32,
}

const CHIEF_SELECT: &str = "SELECT p.id, p.user_id, p.title, p.domain, p.installation_date,
        p.is_active, p.display_order, u.first_name, u.last_name, u.village, u.bio,
        u.profile_image, p.created_at
    FROM chief_profiles p
    JOIN users u ON u.id = p.user_id";

fn write_error(err: sqlx::Error) -> ApiError {
    let bad_reference =
        matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
    if bad_reference {
        invalid_reference(err, "Unknown user")
    } else {
        conflict_on_unique(err, "This user already has a chief profile")
    }
}

/// Active chiefs (all for content managers), by display order then title.
pub async fn list_chiefs(pool: &PgPool, include_inactive: bool) -> sqlx::Result<Vec<ChiefProfile>> {
    sqlx::query_as::<_, ChiefProfile>(&format!(
        "{CHIEF_SELECT}
         WHERE p.is_active OR $1
         ORDER BY p.display_order, p.title, p.id"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn find_chief(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<ChiefProfile>> {
    sqlx::query_as::<_, ChiefProfile>(&format!("{CHIEF_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_chief(pool: &PgPool, input: &ChiefInput) -> Result<Uuid, ApiError> {
    sqlx::query_scalar(
        "INSERT INTO chief_profiles (user_id, title, domain, installation_date, is_active, display_order)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(input.user_id)
    .bind(&input.title)
    .bind(&input.domain)
    .bind(input.installation_date)
    .bind(input.is_active)
    .bind(input.display_order)
    .fetch_one(pool)
    .await
    .map_err(write_error)
}

pub async fn update_chief(pool: &PgPool, id: Uuid, input: &ChiefInput) -> Result<bool, ApiError> {
    let result = sqlx::query(
        "UPDATE chief_profiles SET
            user_id = $2, title = $3, domain = $4, installation_date = $5, is_active = $6,
            display_order = $7
         WHERE id = $1",
    )
    .bind(id)
    .bind(input.user_id)
    .bind(&input.title)
    .bind(&input.domain)
    .bind(input.installation_date)
    .bind(input.is_active)
    .bind(input.display_order)
    .execute(pool)
    .await
    .map_err(write_error)?;
    Ok(result.rows_affected() > 0)
}

/// Removes the profile only; the account stays.
pub async fn delete_chief(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM chief_profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
