//! Event, calendar and festival HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::queries::{self, EventFilter};
use super::types::{
    CalendarEntry, Event, EventCategory, EventCategoryInput, EventDetail, EventInput, EventList,
    EventType, EventView, FestivalInput, FestivalView,
};
use crate::api::AppState;
use crate::auth::Viewer;
use crate::db::{record_view, ViewCounted};
use crate::error::{Ack, ApiError, ApiResult};
use crate::listing::pagination::{ADMIN_PER_PAGE, EVENTS_PER_PAGE};
use crate::listing::{Advisory, ListParams, Paginated, TimeFrame, Window};
use crate::permissions::{require_visible, sees_unpublished, ContentManager};
use crate::util::slug_or_title;

const FEATURED_LIMIT: i64 = 3;
const RELATED_LIMIT: i64 = 3;

// ============================================================================
// Categories
// ============================================================================

/// `GET /api/events/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<EventCategory>>> {
    Ok(Json(queries::list_categories(&state.db).await?))
}

/// `POST /api/admin/events/categories`
#[tracing::instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Json(body): Json<EventCategoryInput>,
) -> ApiResult<(StatusCode, Ack<EventCategory>)> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = queries::create_category(&state.db, &body, &slug).await?;
    Ok((StatusCode::CREATED, Ack::new("Category created", category)))
}

/// `PUT /api/admin/events/categories/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<EventCategoryInput>,
) -> ApiResult<Ack<EventCategory>> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let category = queries::update_category(&state.db, id, &body, &slug)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(Ack::new("Category updated", category))
}

/// `DELETE /api/admin/events/categories/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_category(&state.db, id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    Ok(Ack::new("Category deleted", id))
}

// ============================================================================
// Events
// ============================================================================

/// `GET /api/events?time=&date=&category=&type=&search=&page=`
///
/// `time` defaults to `upcoming`. `date` narrows to one calendar day.
#[tracing::instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<EventList>> {
    let page = params.page_request(EVENTS_PER_PAGE);
    let sees = sees_unpublished(&viewer);
    let now = Utc::now();
    let offset = state.config.site_offset;
    let view = |e: Event| EventView::at(e, now, offset);

    let featured = queries::featured_upcoming(&state.db, now, sees, FEATURED_LIMIT)
        .await?
        .into_iter()
        .map(view)
        .collect();

    let time_frame = TimeFrame::parse(params.time.as_deref());
    let day = Advisory::parse_date(params.date.as_deref());
    let event_type = Advisory::<EventType>::parse_enum(params.kind.as_deref());

    let (Some(Some(time_frame)), Some(day), Some(category_slug), Some(event_type)) = (
        time_frame.clone().into_bind(),
        day.into_bind(),
        params.category().into_bind(),
        event_type.into_bind(),
    ) else {
        return Ok(Json(EventList {
            page: Paginated::empty(page),
            featured,
            time: match time_frame {
                Advisory::Is(frame) => frame.as_str(),
                _ => TimeFrame::default().as_str(),
            },
        }));
    };

    let mut window = time_frame.bounds(now, offset);
    if let Some(day) = day {
        window = window.intersect(Window::day(day, offset));
    }

    let filter = EventFilter {
        window,
        category_slug,
        event_type,
        search: params.search_pattern(),
    };
    let (events, total) = queries::list_events(&state.db, &filter, sees, page).await?;
    let items = events.into_iter().map(view).collect();

    Ok(Json(EventList {
        page: Paginated::new(items, total, page),
        featured,
        time: time_frame.as_str(),
    }))
}

/// `GET /api/events/{slug}`
#[tracing::instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<EventDetail>> {
    let mut event = require_visible(queries::find_by_slug(&state.db, &slug).await?, &viewer, "Event")?;
    event.view_count = record_view(&state.db, ViewCounted::Events, event.id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    let now = Utc::now();
    let offset = state.config.site_offset;
    let related = queries::related_upcoming(&state.db, &event, now, sees_unpublished(&viewer), RELATED_LIMIT)
        .await?
        .into_iter()
        .map(|e| EventView::at(e, now, offset))
        .collect();

    Ok(Json(EventDetail {
        event: EventView::at(event, now, offset),
        related,
    }))
}

/// `GET /api/events/calendar`
#[tracing::instrument(skip(state))]
pub async fn calendar(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<CalendarEntry>>> {
    let offset = state.config.site_offset;
    let entries = queries::calendar_events(&state.db, sees_unpublished(&viewer))
        .await?
        .into_iter()
        .map(|e| CalendarEntry::from_event(e, offset))
        .collect();
    Ok(Json(entries))
}

/// `GET /api/admin/events?page=`
#[tracing::instrument(skip(state))]
pub async fn manage_events(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<EventView>>> {
    let page = params.page_request(ADMIN_PER_PAGE);
    let now = Utc::now();
    let (events, total) = queries::list_all_events(&state.db, page).await?;
    let items = events
        .into_iter()
        .map(|e| EventView::at(e, now, state.config.site_offset))
        .collect();
    Ok(Json(Paginated::new(items, total, page)))
}

async fn load_view(state: &AppState, id: Uuid) -> ApiResult<EventView> {
    let event = queries::find_event(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(EventView::at(event, Utc::now(), state.config.site_offset))
}

/// `POST /api/admin/events`
#[tracing::instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<EventInput>,
) -> ApiResult<(StatusCode, Ack<EventView>)> {
    body.validate()?;
    body.check_dates()?;

    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    let id = queries::create_event(&state.db, &body, &slug).await?;

    tracing::info!(event_id = %id, actor_id = %manager.id, "Event created");
    Ok((StatusCode::CREATED, Ack::new("Event created", load_view(&state, id).await?)))
}

/// `PUT /api/admin/events/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_event(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<EventInput>,
) -> ApiResult<Ack<EventView>> {
    body.validate()?;
    body.check_dates()?;

    let slug = slug_or_title(body.slug.as_deref(), &body.title)?;
    if !queries::update_event(&state.db, id, &body, &slug).await? {
        return Err(ApiError::NotFound("Event"));
    }

    tracing::info!(event_id = %id, actor_id = %manager.id, cancelled = body.is_cancelled, "Event updated");
    Ok(Ack::new("Event updated", load_view(&state, id).await?))
}

/// `DELETE /api/admin/events/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_event(&state.db, id).await? {
        return Err(ApiError::NotFound("Event"));
    }
    tracing::info!(event_id = %id, actor_id = %manager.id, "Event deleted");
    Ok(Ack::new("Event deleted", id))
}

// ============================================================================
// Festivals
// ============================================================================

/// `GET /api/festivals`
pub async fn list_festivals(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<FestivalView>>> {
    let festivals = queries::list_festivals(&state.db, sees_unpublished(&viewer)).await?;
    Ok(Json(festivals.into_iter().map(FestivalView::from).collect()))
}

/// `GET /api/festivals/{slug}`
#[tracing::instrument(skip(state))]
pub async fn get_festival(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> ApiResult<Json<FestivalView>> {
    let mut festival = require_visible(
        queries::find_festival_by_slug(&state.db, &slug).await?,
        &viewer,
        "Festival",
    )?;
    festival.view_count = record_view(&state.db, ViewCounted::Festivals, festival.id)
        .await?
        .ok_or(ApiError::NotFound("Festival"))?;
    Ok(Json(FestivalView::from(festival)))
}

/// `POST /api/admin/festivals`
#[tracing::instrument(skip(state, body))]
pub async fn create_festival(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Json(body): Json<FestivalInput>,
) -> ApiResult<(StatusCode, Ack<FestivalView>)> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let festival = queries::create_festival(&state.db, &body, &slug).await?;
    Ok((StatusCode::CREATED, Ack::new("Festival created", festival.into())))
}

/// `PUT /api/admin/festivals/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_festival(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<FestivalInput>,
) -> ApiResult<Ack<FestivalView>> {
    body.validate()?;
    let slug = slug_or_title(body.slug.as_deref(), &body.name)?;
    let festival = queries::update_festival(&state.db, id, &body, &slug)
        .await?
        .ok_or(ApiError::NotFound("Festival"))?;
    Ok(Ack::new("Festival updated", festival.into()))
}

/// `DELETE /api/admin/festivals/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_festival(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !queries::delete_festival(&state.db, id).await? {
        return Err(ApiError::NotFound("Festival"));
    }
    Ok(Ack::new("Festival deleted", id))
}
