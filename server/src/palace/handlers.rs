//! Palace HTTP handlers: site settings, rulers, gallery, history and titles.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use super::gallery::{
    self, GalleryCategory, GalleryCategoryInput, GalleryImage, GalleryImageInput, ImageFilter,
    OccasionType,
};
use super::history::{
    self, ArticleType, HistoryArticle, HistoryArticleInput, TraditionalTitle, TraditionalTitleInput,
};
use super::rulers::{self, EjehInput, EjehView};
use super::settings::{PalaceInfo, PalaceInfoInput};
use crate::announcements::{self, Announcement};
use crate::api::AppState;
use crate::auth::Viewer;
use crate::db::{record_view, ViewCounted};
use crate::error::{invalid_reference, Ack, ApiError, ApiResult};
use crate::events::{self, EventView};
use crate::listing::pagination::{GALLERY_PER_PAGE, HISTORY_PER_PAGE};
use crate::listing::{Advisory, ListParams, Paginated};
use crate::permissions::{require_visible, sees_unpublished, ContentManager};
use crate::util::slug_or_title;

const RULER_GALLERY_LIMIT: i64 = 8;
const RELATED_IMAGES_LIMIT: i64 = 4;
const RELATED_ARTICLES_LIMIT: i64 = 3;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RulerDetail {
    pub ruler: EjehView,
    pub gallery: Vec<GalleryImage>,
}

#[derive(Debug, Serialize)]
pub struct ImageDetail {
    pub image: GalleryImage,
    pub related: Vec<GalleryImage>,
}

#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    pub article: HistoryArticle,
    pub related: Vec<HistoryArticle>,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub palace: PalaceInfo,
    pub present_ruler: Option<EjehView>,
    pub featured_images: Vec<GalleryImage>,
    pub recent_announcements: Vec<Announcement>,
    pub upcoming_events: Vec<EventView>,
    pub featured_articles: Vec<HistoryArticle>,
}

// ============================================================================
// Site
// ============================================================================

/// `GET /api/home`
#[tracing::instrument(skip(state))]
pub async fn home(State(state): State<AppState>, viewer: Viewer) -> ApiResult<Json<HomePage>> {
    let sees = sees_unpublished(&viewer);
    let now = Utc::now();

    let palace = state.site.get(&state.db).await?;
    let present_ruler = rulers::find_present(&state.db).await?.map(EjehView::from);
    let featured_images = gallery::featured_images(&state.db, sees, 6).await?;
    let recent_announcements = announcements::queries::recent_announcements(&state.db, sees, 3).await?;
    let upcoming_events = events::queries::upcoming_events(&state.db, now, sees, 4)
        .await?
        .into_iter()
        .map(|e| EventView::at(e, now, state.config.site_offset))
        .collect();
    let featured_articles = history::featured_articles(&state.db, sees, 3).await?;

    Ok(Json(HomePage {
        palace,
        present_ruler,
        featured_images,
        recent_announcements,
        upcoming_events,
        featured_articles,
    }))
}

/// `GET /api/palace`
pub async fn get_palace_info(State(state): State<AppState>) -> ApiResult<Json<PalaceInfo>> {
    Ok(Json(state.site.get(&state.db).await?))
}

/// `PUT /api/admin/palace`
#[tracing::instrument(skip(state, body))]
pub async fn update_palace_info(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<PalaceInfoInput>,
) -> ApiResult<Ack<PalaceInfo>> {
    body.validate()?;

    let info = state.site.update(&state.db, &body).await?;

    tracing::info!(actor_id = %manager.id, "Palace settings updated");
    Ok(Ack::new("Palace settings saved", info))
}

// ============================================================================
// Rulers
// ============================================================================

/// `GET /api/rulers`
pub async fn list_rulers(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<EjehView>>> {
    let profiles = rulers::list_profiles(&state.db, sees_unpublished(&viewer)).await?;
    Ok(Json(profiles.into_iter().map(EjehView::from).collect()))
}

/// `GET /api/rulers/present`
pub async fn present_ruler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<RulerDetail>> {
    let ruler = rulers::find_present(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Present ruler"))?;

    let gallery = gallery::images_for_ruler(
        &state.db,
        ruler.id,
        sees_unpublished(&viewer),
        RULER_GALLERY_LIMIT,
    )
    .await?;

    Ok(Json(RulerDetail {
        ruler: ruler.into(),
        gallery,
    }))
}

/// `GET /api/rulers/past`
pub async fn past_rulers(State(state): State<AppState>) -> ApiResult<Json<Vec<EjehView>>> {
    let profiles = rulers::list_past(&state.db).await?;
    Ok(Json(profiles.into_iter().map(EjehView::from).collect()))
}

/// `GET /api/rulers/{id}`
pub async fn get_ruler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RulerDetail>> {
    let ruler = require_visible(rulers::find_profile(&state.db, id).await?, &viewer, "Ruler")?;

    let gallery = gallery::images_for_ruler(
        &state.db,
        ruler.id,
        sees_unpublished(&viewer),
        RULER_GALLERY_LIMIT,
    )
    .await?;

    Ok(Json(RulerDetail {
        ruler: ruler.into(),
        gallery,
    }))
}

fn validate_ruler(body: &EjehInput) -> ApiResult<()> {
    body.validate()?;
    body.check_dates()
}

/// `POST /api/admin/rulers`
#[tracing::instrument(skip(state, body))]
pub async fn create_ruler(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<EjehInput>,
) -> ApiResult<(StatusCode, Ack<EjehView>)> {
    validate_ruler(&body)?;

    let profile = rulers::create_profile(&state.db, &body).await?;
    tracing::info!(ruler_id = %profile.id, actor_id = %manager.id, "Ruler profile created");

    Ok((
        StatusCode::CREATED,
        Ack::new("Ruler profile created", profile.into()),
    ))
}

/// `PUT /api/admin/rulers/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_ruler(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<EjehInput>,
) -> ApiResult<Ack<EjehView>> {
    validate_ruler(&body)?;

    let profile = rulers::update_profile(&state.db, id, &body)
        .await?
        .ok_or(ApiError::NotFound("Ruler"))?;

    Ok(Ack::new("Ruler profile updated", profile.into()))
}

/// `DELETE /api/admin/rulers/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_ruler(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !rulers::delete_profile(&state.db, id).await? {
        return Err(ApiError::NotFound("Ruler"));
    }
    tracing::info!(ruler_id = %id, actor_id = %manager.id, "Ruler profile deleted");
    Ok(Ack::new("Ruler profile deleted", id))
}

// ============================================================================
// Traditional Titles
// ============================================================================

/// `GET /api/titles`
pub async fn list_titles(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<TraditionalTitle>>> {
    Ok(Json(
        history::list_titles(&state.db, sees_unpublished(&viewer)).await?,
    ))
}

/// `POST /api/admin/titles`
#[tracing::instrument(skip(state, body))]
pub async fn create_title(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Json(body): Json<TraditionalTitleInput>,
) -> ApiResult<(StatusCode, Ack<TraditionalTitle>)> {
    body.validate()?;
    let title = history::create_title(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Ack::new("Title created", title)))
}

/// `PUT /api/admin/titles/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_title(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<TraditionalTitleInput>,
) -> ApiResult<Ack<TraditionalTitle>> {
    body.validate()?;
    let title = history::update_title(&state.db, id, &body)
        .await?
        .ok_or(ApiError::NotFound("Title"))?;
    Ok(Ack::new("Title updated", title))
}

/// `DELETE /api/admin/titles/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_title(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !history::delete_title(&state.db, id).await? {
        return Err(ApiError::NotFound("Title"));
    }
    Ok(Ack::new("Title deleted", id))
}

// ============================================================================
// Gallery
// ============================================================================

/// `GET /api/gallery/categories`
pub async fn list_gallery_categories(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<GalleryCategory>>> {
    Ok(Json(
        gallery::list_categories(&state.db, sees_unpublished(&viewer)).await?,
    ))
}

/// `GET /api/gallery?category=&occasion=&search=&page=`
#[tracing::instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<GalleryImage>>> {
    let page = params.page_request(GALLERY_PER_PAGE);

    let occasion = Advisory::<OccasionType>::parse_enum(params.occasion.as_deref());
    let (Some(category_slug), Some(occasion)) =
        (params.category().into_bind(), occasion.into_bind())
    else {
        return Ok(Json(Paginated::empty(page)));
    };

    let filter = ImageFilter {
        category_slug,
        occasion,
        search: params.search_pattern(),
    };

    let (items, total) =
        gallery::list_images(&state.db, &filter, sees_unpublished(&viewer), page).await?;
    Ok(Json(Paginated::new(items, total, page)))
}

/// `GET /api/gallery/{id}`
#[tracing::instrument(skip(state))]
pub async fn get_gallery_image(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ImageDetail>> {
    let mut image = require_visible(gallery::find_image(&state.db, id).await?, &viewer, "Image")?;
    image.view_count = record_view(&state.db, ViewCounted::GalleryImages, image.id)
        .await?
        .ok_or(ApiError::NotFound("Image"))?;

    let related = gallery::related_images(
        &state.db,
        &image,
        sees_unpublished(&viewer),
        RELATED_IMAGES_LIMIT,
    )
    .await?;

    Ok(Json(ImageDetail { image, related }))
}

/// `POST /api/admin/gallery/categories`
#[tracing::instrument(skip(state, body))]
pub async fn create_gallery_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Json(body): Json<GalleryCategoryInput>,
) -> ApiResult<(StatusCode, Ack<GalleryCategory>)> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = gallery::create_category(&state.db, &body, &slug).await?;
    Ok((StatusCode::CREATED, Ack::new("Category created", category)))
}

/// `PUT /api/admin/gallery/categories/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_gallery_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<GalleryCategoryInput>,
) -> ApiResult<Ack<GalleryCategory>> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = gallery::update_category(&state.db, id, &body, &slug)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(Ack::new("Category updated", category))
}

/// `DELETE /api/admin/gallery/categories/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_gallery_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !gallery::delete_category(&state.db, id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(Ack::new("Category deleted", id))
}

const IMAGE_REFERENCE: &str = "Unknown category or ruler";

/// `POST /api/admin/gallery`
#[tracing::instrument(skip(state, body))]
pub async fn create_gallery_image(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<GalleryImageInput>,
) -> ApiResult<(StatusCode, Ack<GalleryImage>)> {
    body.validate()?;

    let id = gallery::create_image(&state.db, &body)
        .await
        .map_err(|e| invalid_reference(e, IMAGE_REFERENCE))?;
    let image = gallery::find_image(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Image"))?;

    tracing::info!(image_id = %id, actor_id = %manager.id, "Gallery image added");
    Ok((StatusCode::CREATED, Ack::new("Image uploaded", image)))
}

/// `PUT /api/admin/gallery/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_gallery_image(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<GalleryImageInput>,
) -> ApiResult<Ack<GalleryImage>> {
    body.validate()?;

    let updated = gallery::update_image(&state.db, id, &body)
        .await
        .map_err(|e| invalid_reference(e, IMAGE_REFERENCE))?;
    if !updated {
        return Err(ApiError::NotFound("Image"));
    }
    let image = gallery::find_image(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Image"))?;

    Ok(Ack::new("Image updated", image))
}

/// `DELETE /api/admin/gallery/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_gallery_image(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !gallery::delete_image(&state.db, id).await? {
        return Err(ApiError::NotFound("Image"));
    }
    Ok(Ack::new("Image deleted", id))
}

// ============================================================================
// History
// ============================================================================

/// `GET /api/history?type=&search=&page=`
#[tracing::instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<HistoryArticle>>> {
    let page = params.page_request(HISTORY_PER_PAGE);
    let Some(article_type) = Advisory::<ArticleType>::parse_enum(params.kind.as_deref()).into_bind()
    else {
        return Ok(Json(Paginated::empty(page)));
    };

    let search = params.search_pattern();
    let (items, total) = history::list_articles(
        &state.db,
        article_type,
        search.as_deref(),
        sees_unpublished(&viewer),
        page,
    )
    .await?;

    Ok(Json(Paginated::new(items, total, page)))
}

/// `GET /api/history/{slug}`
#[tracing::instrument(skip(state))]
pub async fn get_history_article(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleDetail>> {
    let mut article = require_visible(
        history::find_article_by_slug(&state.db, &slug).await?,
        &viewer,
        "Article",
    )?;
    article.view_count = record_view(&state.db, ViewCounted::HistoryArticles, article.id)
        .await?
        .ok_or(ApiError::NotFound("Article"))?;

    let related = history::related_articles(
        &state.db,
        &article,
        sees_unpublished(&viewer),
        RELATED_ARTICLES_LIMIT,
    )
    .await?;

    Ok(Json(ArticleDetail { article, related }))
}

/// `POST /api/admin/history`
#[tracing::instrument(skip(state, body))]
pub async fn create_history_article(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<HistoryArticleInput>,
) -> ApiResult<(StatusCode, Ack<HistoryArticle>)> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    let article = history::create_article(&state.db, &body, &slug).await?;
    tracing::info!(article_id = %article.id, actor_id = %manager.id, "History article created");
    Ok((StatusCode::CREATED, Ack::new("Article created", article)))
}

/// `PUT /api/admin/history/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_history_article(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<HistoryArticleInput>,
) -> ApiResult<Ack<HistoryArticle>> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    let article = history::update_article(&state.db, id, &body, &slug)
        .await?
        .ok_or(ApiError::NotFound("Article"))?;
    Ok(Ack::new("Article updated", article))
}

/// `DELETE /api/admin/history/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_history_article(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !history::delete_article(&state.db, id).await? {
        return Err(ApiError::NotFound("Article"));
    }
    Ok(Ack::new("Article deleted", id))
}
