//! Media gallery: categories and images.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, ApiError};
use crate::listing::PageRequest;
use crate::permissions::Publishable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "occasion_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OccasionType {
    Coronation,
    Festival,
    Palace,
    Community,
    Official,
    Cultural,
    #[default]
    Other,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GalleryCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GalleryCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 120))]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub icon: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "crate::util::default_true")]
    pub is_active: bool,
}

const CATEGORY_COLUMNS: &str = "id, name, slug, description, icon, display_order, is_active";
const SLUG_CONFLICT: &str = "A category with this slug already exists";

/// Active categories (all for content managers).
pub async fn list_categories(
    pool: &PgPool,
    include_inactive: bool,
) -> sqlx::Result<Vec<GalleryCategory>> {
    sqlx::query_as::<_, GalleryCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM gallery_categories
         WHERE is_active OR $1
         ORDER BY display_order, name, id"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn create_category(
    pool: &PgPool,
    input: &GalleryCategoryInput,
    slug: &str,
) -> Result<GalleryCategory, ApiError> {
    sqlx::query_as::<_, GalleryCategory>(&format!(
        "INSERT INTO gallery_categories (name, slug, description, icon, display_order, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.icon)
    .bind(input.display_order)
    .bind(input.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, SLUG_CONFLICT))
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    input: &GalleryCategoryInput,
    slug: &str,
) -> Result<Option<GalleryCategory>, ApiError> {
    sqlx::query_as::<_, GalleryCategory>(&format!(
        "UPDATE gallery_categories
         SET name = $2, slug = $3, description = $4, icon = $5, display_order = $6, is_active = $7
         WHERE id = $1
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.name)
    .bind(slug)
    .bind(&input.description)
    .bind(&input.icon)
    .bind(input.display_order)
    .bind(input.is_active)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, SLUG_CONFLICT))
}

/// Images in the category keep existing with no category.
pub async fn delete_category(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM gallery_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Images
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GalleryImage {
    pub id: Uuid,
    pub image: String,
    pub thumbnail: Option<String>,
    pub title: String,
    pub caption: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub occasion_type: OccasionType,
    pub related_ejeh_id: Option<Uuid>,
    pub date_taken: Option<NaiveDate>,
    pub location: String,
    pub photographer: String,
    pub is_featured: bool,
    pub is_published: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for GalleryImage {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GalleryImageInput {
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image: String,
    pub thumbnail: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub caption: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub occasion_type: OccasionType,
    pub related_ejeh_id: Option<Uuid>,
    pub date_taken: Option<NaiveDate>,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub location: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub photographer: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "crate::util::default_true")]
    pub is_published: bool,
}

/// Image filter binds. `None` fields are not filtered.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pub category_slug: Option<String>,
    pub occasion: Option<OccasionType>,
    pub search: Option<String>,
}

const IMAGE_SELECT: &str = "SELECT i.id, i.image, i.thumbnail, i.title, i.caption, i.category_id,
        c.name AS category_name, c.slug AS category_slug, i.occasion_type, i.related_ejeh_id,
        i.date_taken, i.location, i.photographer, i.is_featured, i.is_published, i.view_count,
        i.created_at, i.updated_at
    FROM gallery_images i
    LEFT JOIN gallery_categories c ON c.id = i.category_id";

const IMAGE_ORDER: &str = "ORDER BY i.date_taken DESC NULLS LAST, i.created_at DESC, i.id DESC";

const IMAGE_WHERE: &str = "WHERE (i.is_published OR $1)
       AND ($2::text IS NULL OR c.slug = $2)
       AND ($3::occasion_type IS NULL OR i.occasion_type = $3)
       AND ($4::text IS NULL OR i.title ILIKE $4 OR i.caption ILIKE $4 OR i.location ILIKE $4)";

pub async fn list_images(
    pool: &PgPool,
    filter: &ImageFilter,
    sees_unpublished: bool,
    page: PageRequest,
) -> sqlx::Result<(Vec<GalleryImage>, i64)> {
    let rows = sqlx::query_as::<_, GalleryImage>(&format!(
        "{IMAGE_SELECT} {IMAGE_WHERE} {IMAGE_ORDER} LIMIT $5 OFFSET $6"
    ))
    .bind(sees_unpublished)
    .bind(&filter.category_slug)
    .bind(filter.occasion)
    .bind(&filter.search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM gallery_images i
         LEFT JOIN gallery_categories c ON c.id = i.category_id
         {IMAGE_WHERE}"
    ))
    .bind(sees_unpublished)
    .bind(&filter.category_slug)
    .bind(filter.occasion)
    .bind(&filter.search)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find_image(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<GalleryImage>> {
    sqlx::query_as::<_, GalleryImage>(&format!("{IMAGE_SELECT} WHERE i.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Other visible images in the same category. Uncategorised images relate to each other.
pub async fn related_images(
    pool: &PgPool,
    image: &GalleryImage,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<GalleryImage>> {
    sqlx::query_as::<_, GalleryImage>(&format!(
        "{IMAGE_SELECT}
         WHERE (i.is_published OR $1)
           AND i.category_id IS NOT DISTINCT FROM $2
           AND i.id <> $3
         {IMAGE_ORDER}
         LIMIT $4"
    ))
    .bind(sees_unpublished)
    .bind(image.category_id)
    .bind(image.id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Visible images linked to a ruler's profile.
pub async fn images_for_ruler(
    pool: &PgPool,
    ruler_id: Uuid,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<GalleryImage>> {
    sqlx::query_as::<_, GalleryImage>(&format!(
        "{IMAGE_SELECT}
         WHERE (i.is_published OR $1) AND i.related_ejeh_id = $2
         {IMAGE_ORDER}
         LIMIT $3"
    ))
    .bind(sees_unpublished)
    .bind(ruler_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn featured_images(
    pool: &PgPool,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<GalleryImage>> {
    sqlx::query_as::<_, GalleryImage>(&format!(
        "{IMAGE_SELECT}
         WHERE (i.is_published OR $1) AND i.is_featured
         {IMAGE_ORDER}
         LIMIT $2"
    ))
    .bind(sees_unpublished)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn create_image(pool: &PgPool, input: &GalleryImageInput) -> sqlx::Result<Uuid> {
    sqlx::query_scalar(
        "INSERT INTO gallery_images (
            image, thumbnail, title, caption, category_id, occasion_type, related_ejeh_id,
            date_taken, location, photographer, is_featured, is_published)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING id",
    )
    .bind(&input.image)
    .bind(&input.thumbnail)
    .bind(&input.title)
    .bind(&input.caption)
    .bind(input.category_id)
    .bind(input.occasion_type)
    .bind(input.related_ejeh_id)
    .bind(input.date_taken)
    .bind(&input.location)
    .bind(&input.photographer)
    .bind(input.is_featured)
    .bind(input.is_published)
    .fetch_one(pool)
    .await
}

pub async fn update_image(
    pool: &PgPool,
    id: Uuid,
    input: &GalleryImageInput,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE gallery_images SET
            image = $2, thumbnail = $3, title = $4, caption = $5, category_id = $6,
            occasion_type = $7, related_ejeh_id = $8, date_taken = $9, location = $10,
            photographer = $11, is_featured = $12, is_published = $13, updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(&input.image)
    .bind(&input.thumbnail)
    .bind(&input.title)
    .bind(&input.caption)
    .bind(input.category_id)
    .bind(input.occasion_type)
    .bind(input.related_ejeh_id)
    .bind(input.date_taken)
    .bind(&input.location)
    .bind(&input.photographer)
    .bind(input.is_featured)
    .bind(input.is_published)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_image(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_images(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM gallery_images")
        .fetch_one(pool)
        .await
}
