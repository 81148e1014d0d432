//! Palace information singleton and its in-memory cache.
//!
//! The table holds exactly one row (`id = 1`, enforced by a CHECK). The row
//! is created on first access with `INSERT ... ON CONFLICT DO NOTHING`, so
//! concurrent first requests agree on the same record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use validator::Validate;

/// Site-wide palace details.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PalaceInfo {
    pub id: i16,
    pub palace_name: String,
    pub tagline: String,
    pub about: String,
    pub mission: String,
    pub vision: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub facebook_url: String,
    pub twitter_url: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub logo: Option<String>,
    pub banner_image: Option<String>,
    pub favicon: Option<String>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PalaceInfoInput {
    #[validate(length(min = 1, max = 200, message = "Palace name is required"))]
    pub palace_name: String,
    #[validate(length(max = 300))]
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub address: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub facebook_url: String,
    #[serde(default)]
    pub twitter_url: String,
    #[serde(default)]
    pub instagram_url: String,
    #[serde(default)]
    pub youtube_url: String,
    pub logo: Option<String>,
    pub banner_image: Option<String>,
    pub favicon: Option<String>,
    #[validate(length(max = 160))]
    #[serde(default)]
    pub meta_description: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub meta_keywords: String,
}

const PALACE_COLUMNS: &str = "id, palace_name, tagline, about, mission, vision, address, phone, \
    email, facebook_url, twitter_url, instagram_url, youtube_url, logo, banner_image, favicon, \
    meta_description, meta_keywords, updated_at";

/// Fetch the singleton, creating it with defaults if absent.
pub async fn load_or_init(pool: &PgPool) -> sqlx::Result<PalaceInfo> {
    sqlx::query("INSERT INTO palace_info (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
        .execute(pool)
        .await?;

    sqlx::query_as::<_, PalaceInfo>(&format!(
        "SELECT {PALACE_COLUMNS} FROM palace_info WHERE id = 1"
    ))
    .fetch_one(pool)
    .await
}

/// Replace every editable field of the singleton.
pub async fn update_palace_info(pool: &PgPool, input: &PalaceInfoInput) -> sqlx::Result<PalaceInfo> {
    // The row may not exist yet on a fresh database.
    sqlx::query("INSERT INTO palace_info (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
        .execute(pool)
        .await?;

    sqlx::query_as::<_, PalaceInfo>(&format!(
        "UPDATE palace_info SET
            palace_name = $1, tagline = $2, about = $3, mission = $4, vision = $5, address = $6,
            phone = $7, email = $8, facebook_url = $9, twitter_url = $10, instagram_url = $11,
            youtube_url = $12, logo = $13, banner_image = $14, favicon = $15,
            meta_description = $16, meta_keywords = $17, updated_at = NOW()
         WHERE id = 1
         RETURNING {PALACE_COLUMNS}"
    ))
    .bind(&input.palace_name)
    .bind(&input.tagline)
    .bind(&input.about)
    .bind(&input.mission)
    .bind(&input.vision)
    .bind(&input.address)
    .bind(&input.phone)
    .bind(&input.email)
    .bind(&input.facebook_url)
    .bind(&input.twitter_url)
    .bind(&input.instagram_url)
    .bind(&input.youtube_url)
    .bind(&input.logo)
    .bind(&input.banner_image)
    .bind(&input.favicon)
    .bind(&input.meta_description)
    .bind(&input.meta_keywords)
    .fetch_one(pool)
    .await
}

/// Cached copy of [`PalaceInfo`], shared through `AppState`.
#[derive(Debug, Clone, Default)]
pub struct SiteSettings {
    cached: Arc<RwLock<Option<PalaceInfo>>>,
}

impl SiteSettings {
    /// Cached settings, loading (and creating) the row on first use.
    pub async fn get(&self, pool: &PgPool) -> sqlx::Result<PalaceInfo> {
        if let Some(info) = self.cached.read().await.as_ref() {
            return Ok(info.clone());
        }

        let mut slot = self.cached.write().await;
        if let Some(info) = slot.as_ref() {
            return Ok(info.clone());
        }
        let info = load_or_init(pool).await?;
        *slot = Some(info.clone());
        Ok(info)
    }

    /// Write `input` to the row and the cache under one write guard, so the
    /// cache always ends on the last committed update.
    pub async fn update(&self, pool: &PgPool, input: &PalaceInfoInput) -> sqlx::Result<PalaceInfo> {
        let mut slot = self.cached.write().await;
        let info = update_palace_info(pool, input).await?;
        *slot = Some(info.clone());
        Ok(info)
    }
}
