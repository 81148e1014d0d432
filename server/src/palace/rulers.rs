//! Ejeh profiles, past and present.
//!
//! At most one active profile may hold `reign_status = present`. The
//! `idx_ejeh_single_present` partial unique index enforces it; a violation
//! surfaces as `Conflict`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, ApiError};
use crate::permissions::Publishable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reign_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReignStatus {
    Present,
    #[default]
    Past,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EjehProfile {
    pub id: Uuid,
    pub full_name: String,
    pub title: String,
    pub reign_status: ReignStatus,
    pub official_portrait: Option<String>,
    pub coronation_image: Option<String>,
    pub reign_start: Option<NaiveDate>,
    pub reign_end: Option<NaiveDate>,
    pub reign_number: Option<i32>,
    pub biography: String,
    pub early_life: String,
    pub achievements: String,
    pub legacy: String,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: String,
    pub education: String,
    pub occupation_before_throne: String,
    pub full_title_and_honours: String,
    pub royal_title: String,
    pub motto: String,
    pub hobbies: String,
    pub countries_visited: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EjehProfile {
    /// `"1998 - 2015"`, `"2016 - Present"` or `"Unknown"`.
    #[must_use]
    pub fn reign_period(&self) -> String {
        match (self.reign_start, self.reign_end) {
            (Some(start), Some(end)) => format!("{} - {}", start.year(), end.year()),
            (Some(start), None) => format!("{} - Present", start.year()),
            _ => "Unknown".to_string(),
        }
    }
}

/// Inactive profiles are hidden like unpublished content.
impl Publishable for EjehProfile {
    fn is_published(&self) -> bool {
        self.is_active
    }
}

/// A profile with its derived reign period.
#[derive(Debug, Clone, Serialize)]
pub struct EjehView {
    #[serde(flatten)]
    pub profile: EjehProfile,
    pub reign_period: String,
}

impl From<EjehProfile> for EjehView {
    fn from(profile: EjehProfile) -> Self {
        Self {
            reign_period: profile.reign_period(),
            profile,
        }
    }
}

/// Create or replace a profile.
#[derive(Debug, Deserialize, Validate)]
pub struct EjehInput {
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 100))]
    #[serde(default = "default_royal_title")]
    pub title: String,
    #[serde(default)]
    pub reign_status: ReignStatus,
    pub official_portrait: Option<String>,
    pub coronation_image: Option<String>,
    pub reign_start: Option<NaiveDate>,
    pub reign_end: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub reign_number: Option<i32>,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub early_life: String,
    #[serde(default)]
    pub achievements: String,
    #[serde(default)]
    pub legacy: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub birth_place: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub occupation_before_throne: String,
    #[serde(default)]
    pub full_title_and_honours: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub royal_title: String,
    #[serde(default)]
    pub motto: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub countries_visited: String,
    #[serde(default = "crate::util::default_true")]
    pub is_active: bool,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub display_order: i32,
}

fn default_royal_title() -> String {
    "His Royal Majesty".to_string()
}

impl EjehInput {
    /// Reign end may not precede reign start.
    pub fn check_dates(&self) -> Result<(), ApiError> {
        match (self.reign_start, self.reign_end) {
            (Some(start), Some(end)) if end < start => Err(ApiError::InvalidInput(
                "Reign end date cannot be before the start date".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

const EJEH_COLUMNS: &str = "id, full_name, title, reign_status, official_portrait, coronation_image, \
    reign_start, reign_end, reign_number, biography, early_life, achievements, legacy, birth_date, \
    birth_place, education, occupation_before_throne, full_title_and_honours, royal_title, motto, \
    hobbies, countries_visited, is_active, display_order, created_at, updated_at";

const PRESENT_CONFLICT: &str = "Another active profile already holds the present reign";

/// Active profiles (all profiles for content managers), present ruler first.
pub async fn list_profiles(pool: &PgPool, include_inactive: bool) -> sqlx::Result<Vec<EjehProfile>> {
    sqlx::query_as::<_, EjehProfile>(&format!(
        "SELECT {EJEH_COLUMNS} FROM ejeh_profiles
         WHERE is_active OR $1
         ORDER BY reign_status, display_order, reign_start DESC NULLS LAST, id"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn find_present(pool: &PgPool) -> sqlx::Result<Option<EjehProfile>> {
    sqlx::query_as::<_, EjehProfile>(&format!(
        "SELECT {EJEH_COLUMNS} FROM ejeh_profiles
         WHERE reign_status = 'present' AND is_active"
    ))
    .fetch_optional(pool)
    .await
}

/// Active past rulers, most recent reign first.
pub async fn list_past(pool: &PgPool) -> sqlx::Result<Vec<EjehProfile>> {
    sqlx::query_as::<_, EjehProfile>(&format!(
        "SELECT {EJEH_COLUMNS} FROM ejeh_profiles
         WHERE reign_status = 'past' AND is_active
         ORDER BY reign_start DESC NULLS LAST, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<EjehProfile>> {
    sqlx::query_as::<_, EjehProfile>(&format!(
        "SELECT {EJEH_COLUMNS} FROM ejeh_profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_profile<'e, E>(executor: E, input: &EjehInput) -> Result<EjehProfile, ApiError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, EjehProfile>(&format!(
        "INSERT INTO ejeh_profiles (
            full_name, title, reign_status, official_portrait, coronation_image, reign_start,
            reign_end, reign_number, biography, early_life, achievements, legacy, birth_date,
            birth_place, education, occupation_before_throne, full_title_and_honours, royal_title,
            motto, hobbies, countries_visited, is_active, display_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                 $19, $20, $21, $22, $23)
         RETURNING {EJEH_COLUMNS}"
    ))
    .bind(&input.full_name)
    .bind(&input.title)
    .bind(input.reign_status)
    .bind(&input.official_portrait)
    .bind(&input.coronation_image)
    .bind(input.reign_start)
    .bind(input.reign_end)
    .bind(input.reign_number)
    .bind(&input.biography)
    .bind(&input.early_life)
    .bind(&input.achievements)
    .bind(&input.legacy)
    .bind(input.birth_date)
    .bind(&input.birth_place)
    .bind(&input.education)
    .bind(&input.occupation_before_throne)
    .bind(&input.full_title_and_honours)
    .bind(&input.royal_title)
    .bind(&input.motto)
    .bind(&input.hobbies)
    .bind(&input.countries_visited)
    .bind(input.is_active)
    .bind(input.display_order)
    .fetch_one(executor)
    .await
    .map_err(|e| conflict_on_unique(e, PRESENT_CONFLICT))
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    input: &EjehInput,
) -> Result<Option<EjehProfile>, ApiError> {
    sqlx::query_as::<_, EjehProfile>(&format!(
        "UPDATE ejeh_profiles SET
            full_name = $2, title = $3, reign_status = $4, official_portrait = $5,
            coronation_image = $6, reign_start = $7, reign_end = $8, reign_number = $9,
            biography = $10, early_life = $11, achievements = $12, legacy = $13, birth_date = $14,
            birth_place = $15, education = $16, occupation_before_throne = $17,
            full_title_and_honours = $18, royal_title = $19, motto = $20, hobbies = $21,
            countries_visited = $22, is_active = $23, display_order = $24, updated_at = NOW()
         WHERE id = $1
         RETURNING {EJEH_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.full_name)
    .bind(&input.title)
    .bind(input.reign_status)
    .bind(&input.official_portrait)
    .bind(&input.coronation_image)
    .bind(input.reign_start)
    .bind(input.reign_end)
    .bind(input.reign_number)
    .bind(&input.biography)
    .bind(&input.early_life)
    .bind(&input.achievements)
    .bind(&input.legacy)
    .bind(input.birth_date)
    .bind(&input.birth_place)
    .bind(&input.education)
    .bind(&input.occupation_before_throne)
    .bind(&input.full_title_and_honours)
    .bind(&input.royal_title)
    .bind(&input.motto)
    .bind(&input.hobbies)
    .bind(&input.countries_visited)
    .bind(input.is_active)
    .bind(input.display_order)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, PRESENT_CONFLICT))
}

pub async fn delete_profile(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM ejeh_profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(start: Option<(i32, u32, u32)>, end: Option<(i32, u32, u32)>) -> EjehProfile {
        let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        EjehProfile {
            id: Uuid::new_v4(),
            full_name: "Alhaji Ahmed Ocheja".into(),
            title: "His Royal Majesty".into(),
            reign_status: ReignStatus::Past,
            official_portrait: None,
            coronation_image: None,
            reign_start: start.map(date),
            reign_end: end.map(date),
            reign_number: Some(3),
            biography: String::new(),
            early_life: String::new(),
            achievements: String::new(),
            legacy: String::new(),
            birth_date: None,
            birth_place: String::new(),
            education: String::new(),
            occupation_before_throne: String::new(),
            full_title_and_honours: String::new(),
            royal_title: String::new(),
            motto: String::new(),
            hobbies: String::new(),
            countries_visited: String::new(),
            is_active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reign_period() {
        assert_eq!(
            profile(Some((1998, 1, 1)), Some((2015, 6, 30))).reign_period(),
            "1998 - 2015"
        );
        assert_eq!(profile(Some((2016, 3, 1)), None).reign_period(), "2016 - Present");
        assert_eq!(profile(None, Some((1950, 1, 1))).reign_period(), "Unknown");
    }

    #[test]
    fn test_inactive_profile_is_hidden() {
        let mut p = profile(None, None);
        assert!(p.is_published());
        p.is_active = false;
        assert!(!p.is_published());
    }

    #[test]
    fn test_view_flattens_profile() {
        let view = EjehView::from(profile(Some((2016, 3, 1)), None));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["reign_period"], "2016 - Present");
        assert_eq!(json["full_name"], "Alhaji Ahmed Ocheja");
        assert_eq!(json["reign_status"], "past");
    }
}
