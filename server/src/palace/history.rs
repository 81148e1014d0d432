//! History and culture articles, and the traditional title hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, ApiError};
use crate::listing::PageRequest;
use crate::permissions::Publishable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "article_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArticleType {
    #[default]
    History,
    Tradition,
    Culture,
    Title,
    Festival,
    Language,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryArticle {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub video_url: String,
    pub article_type: ArticleType,
    pub author: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publishable for HistoryArticle {
    fn is_published(&self) -> bool {
        self.is_published
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryArticleInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 220))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub excerpt: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub article_type: ArticleType,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub author: String,
    #[serde(default = "crate::util::default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
}

const ARTICLE_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, video_url, \
    article_type, author, is_published, is_featured, view_count, created_at, updated_at";

const ARTICLE_SLUG_CONFLICT: &str = "An article with this slug already exists";

const ARTICLE_WHERE: &str = "WHERE (is_published OR $1)
       AND ($2::article_type IS NULL OR article_type = $2)
       AND ($3::text IS NULL OR title ILIKE $3 OR content ILIKE $3 OR excerpt ILIKE $3)";

pub async fn list_articles(
    pool: &PgPool,
    article_type: Option<ArticleType>,
    search: Option<&str>,
    sees_unpublished: bool,
    page: PageRequest,
) -> sqlx::Result<(Vec<HistoryArticle>, i64)> {
    let rows = sqlx::query_as::<_, HistoryArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM history_articles {ARTICLE_WHERE}
         ORDER BY created_at DESC, id DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(sees_unpublished)
    .bind(article_type)
    .bind(search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM history_articles {ARTICLE_WHERE}"
    ))
    .bind(sees_unpublished)
    .bind(article_type)
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find_article_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<HistoryArticle>> {
    sqlx::query_as::<_, HistoryArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM history_articles WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Other visible articles of the same type, newest first.
pub async fn related_articles(
    pool: &PgPool,
    article: &HistoryArticle,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<HistoryArticle>> {
    sqlx::query_as::<_, HistoryArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM history_articles
         WHERE (is_published OR $1) AND article_type = $2 AND id <> $3
         ORDER BY created_at DESC, id DESC
         LIMIT $4"
    ))
    .bind(sees_unpublished)
    .bind(article.article_type)
    .bind(article.id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn featured_articles(
    pool: &PgPool,
    sees_unpublished: bool,
    limit: i64,
) -> sqlx::Result<Vec<HistoryArticle>> {
    sqlx::query_as::<_, HistoryArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM history_articles
         WHERE (is_published OR $1) AND is_featured
         ORDER BY created_at DESC, id DESC
         LIMIT $2"
    ))
    .bind(sees_unpublished)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn create_article(
    pool: &PgPool,
    input: &HistoryArticleInput,
    slug: &str,
) -> Result<HistoryArticle, ApiError> {
    sqlx::query_as::<_, HistoryArticle>(&format!(
        "INSERT INTO history_articles (
            title, slug, excerpt, content, featured_image, video_url, article_type, author,
            is_published, is_featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(&input.title)
    .bind(slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.featured_image)
    .bind(&input.video_url)
    .bind(input.article_type)
    .bind(&input.author)
    .bind(input.is_published)
    .bind(input.is_featured)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, ARTICLE_SLUG_CONFLICT))
}

pub async fn update_article(
    pool: &PgPool,
    id: Uuid,
    input: &HistoryArticleInput,
    slug: &str,
) -> Result<Option<HistoryArticle>, ApiError> {
    sqlx::query_as::<_, HistoryArticle>(&format!(
        "UPDATE history_articles SET
            title = $2, slug = $3, excerpt = $4, content = $5, featured_image = $6,
            video_url = $7, article_type = $8, author = $9, is_published = $10,
            is_featured = $11, updated_at = NOW()
         WHERE id = $1
         RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.title)
    .bind(slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.featured_image)
    .bind(&input.video_url)
    .bind(input.article_type)
    .bind(&input.author)
    .bind(input.is_published)
    .bind(input.is_featured)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, ARTICLE_SLUG_CONFLICT))
}

pub async fn delete_article(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM history_articles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Traditional Titles
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TraditionalTitle {
    pub id: Uuid,
    pub title_name: String,
    pub description: String,
    pub hierarchy_level: i32,
    pub responsibilities: String,
    pub requirements: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TraditionalTitleInput {
    #[validate(length(min = 1, max = 100, message = "Title name is required"))]
    pub title_name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// 1 is the highest.
    #[validate(range(min = 1, message = "Hierarchy level starts at 1"))]
    pub hierarchy_level: i32,
    #[serde(default)]
    pub responsibilities: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default = "crate::util::default_true")]
    pub is_active: bool,
}

const TITLE_COLUMNS: &str =
    "id, title_name, description, hierarchy_level, responsibilities, requirements, is_active";

pub async fn list_titles(pool: &PgPool, include_inactive: bool) -> sqlx::Result<Vec<TraditionalTitle>> {
    sqlx::query_as::<_, TraditionalTitle>(&format!(
        "SELECT {TITLE_COLUMNS} FROM traditional_titles
         WHERE is_active OR $1
         ORDER BY hierarchy_level, title_name, id"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await
}

pub async fn create_title(
    pool: &PgPool,
    input: &TraditionalTitleInput,
) -> sqlx::Result<TraditionalTitle> {
    sqlx::query_as::<_, TraditionalTitle>(&format!(
        "INSERT INTO traditional_titles
            (title_name, description, hierarchy_level, responsibilities, requirements, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {TITLE_COLUMNS}"
    ))
    .bind(&input.title_name)
    .bind(&input.description)
    .bind(input.hierarchy_level)
    .bind(&input.responsibilities)
    .bind(&input.requirements)
    .bind(input.is_active)
    .fetch_one(pool)
    .await
}

pub async fn update_title(
    pool: &PgPool,
    id: Uuid,
    input: &TraditionalTitleInput,
) -> sqlx::Result<Option<TraditionalTitle>> {
    sqlx::query_as::<_, TraditionalTitle>(&format!(
        "UPDATE traditional_titles SET
            title_name = $2, description = $3, hierarchy_level = $4,
            responsibilities = $5, requirements = $6, is_active = $7
         WHERE id = $1
         RETURNING {TITLE_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.title_name)
    .bind(&input.description)
    .bind(input.hierarchy_level)
    .bind(&input.responsibilities)
    .bind(&input.requirements)
    .bind(input.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn delete_title(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM traditional_titles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
