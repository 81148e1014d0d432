//! Account HTTP handlers: dashboards, the council of chiefs and admin user
//! management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::chiefs::{self, ChiefInput, ChiefProfile};
use super::dashboard::{Dashboard, DashboardKind, SiteStats};
use crate::announcements;
use crate::api::AppState;
use crate::auth::password::hash_password;
use crate::auth::{AuthError, AuthUser, Viewer};
use crate::db::{
    count_users_by_role, create_user, email_exists, find_user_by_id, list_recent_users,
    list_users_by_role, update_user_role, update_user_status, NewUser, User, UserProfile,
};
use crate::error::{Ack, ApiError, ApiResult};
use crate::events::{self, EventView};
use crate::listing::pagination::ADMIN_PER_PAGE;
use crate::listing::{ListParams, Paginated};
use crate::permissions::{can_assign_role, require_visible, sees_unpublished, ContentManager, Role};

const DASHBOARD_ITEMS: i64 = 5;

// ============================================================================
// Request Types
// ============================================================================

/// Account created by a content manager.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone_number: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub village: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub ward: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Verification and active flags. Absent fields are unchanged.
#[derive(Debug, Deserialize)]
pub struct UserStatusRequest {
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Dashboard
// ============================================================================

/// `GET /api/dashboard`
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn dashboard(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Dashboard>> {
    let dashboard = match DashboardKind::for_role(user.role) {
        DashboardKind::Admin => Dashboard::Admin {
            stats: SiteStats::load(&state.db).await?,
            recent_users: list_recent_users(&state.db, DASHBOARD_ITEMS)
                .await?
                .into_iter()
                .map(UserProfile::from)
                .collect(),
        },
        DashboardKind::Chief => {
            let now = Utc::now();
            Dashboard::Chief {
                recent_announcements: announcements::queries::recent_announcements(
                    &state.db,
                    false,
                    DASHBOARD_ITEMS,
                )
                .await?,
                upcoming_events: events::queries::upcoming_events(&state.db, now, false, DASHBOARD_ITEMS)
                    .await?
                    .into_iter()
                    .map(|e| EventView::at(e, now, state.config.site_offset))
                    .collect(),
            }
        }
        DashboardKind::Member => Dashboard::Member {
            profile: find_user_by_id(&state.db, user.id)
                .await?
                .ok_or(ApiError::NotFound("User"))?
                .into(),
        },
    };

    Ok(Json(dashboard))
}

/// `GET /api/admin/stats`
pub async fn site_stats(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
) -> ApiResult<Json<SiteStats>> {
    Ok(Json(SiteStats::load(&state.db).await?))
}

// ============================================================================
// Council of Chiefs
// ============================================================================

/// `GET /api/chiefs`
pub async fn list_chiefs(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Json<Vec<ChiefProfile>>> {
    Ok(Json(
        chiefs::list_chiefs(&state.db, sees_unpublished(&viewer)).await?,
    ))
}

/// `GET /api/chiefs/{id}`
pub async fn get_chief(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChiefProfile>> {
    let chief = require_visible(chiefs::find_chief(&state.db, id).await?, &viewer, "Chief")?;
    Ok(Json(chief))
}

/// `POST /api/admin/chiefs`
#[tracing::instrument(skip(state, body))]
pub async fn create_chief(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<ChiefInput>,
) -> ApiResult<(StatusCode, Ack<ChiefProfile>)> {
    body.validate()?;
    let id = chiefs::create_chief(&state.db, &body).await?;
    let chief = chiefs::find_chief(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Chief"))?;

    tracing::info!(chief_id = %id, user_id = %body.user_id, actor_id = %manager.id, "Chief profile created");
    Ok((StatusCode::CREATED, Ack::new("Chief profile created", chief)))
}

/// `PUT /api/admin/chiefs/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_chief(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<ChiefInput>,
) -> ApiResult<Ack<ChiefProfile>> {
    body.validate()?;
    if !chiefs::update_chief(&state.db, id, &body).await? {
        return Err(ApiError::NotFound("Chief"));
    }
    let chief = chiefs::find_chief(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Chief"))?;
    Ok(Ack::new("Chief profile updated", chief))
}

/// `DELETE /api/admin/chiefs/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_chief(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Path(id): Path<Uuid>,
) -> ApiResult<Ack<Uuid>> {
    if !chiefs::delete_chief(&state.db, id).await? {
        return Err(ApiError::NotFound("Chief"));
    }
    Ok(Ack::new("Chief profile deleted", id))
}

// ============================================================================
// User Management
// ============================================================================

/// `GET /api/admin/members?page=`
#[tracing::instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    ContentManager(_manager): ContentManager,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Paginated<UserProfile>>> {
    let page = params.page_request(ADMIN_PER_PAGE);
    let users = list_users_by_role(&state.db, Role::Member, page.limit(), page.offset()).await?;
    let total = count_users_by_role(&state.db, Role::Member).await?;
    let items = users.into_iter().map(UserProfile::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

/// `POST /api/admin/users`
#[tracing::instrument(skip(state, body), fields(email = %body.email, role = %body.role))]
pub async fn create_account(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Ack<UserProfile>)> {
    body.validate()?;
    can_assign_role(manager.role, body.role)?;

    if email_exists(&state.db, &body.email).await? {
        return Err(AuthError::EmailTaken.into());
    }

    let password_hash = hash_password(&body.password)?;
    let user = create_user(
        &state.db,
        &NewUser {
            email: &body.email,
            password_hash: &password_hash,
            first_name: &body.first_name,
            last_name: &body.last_name,
            phone_number: &body.phone_number,
            village: &body.village,
            ward: &body.ward,
            role: body.role,
            is_verified: body.is_verified,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ApiError::Auth(AuthError::EmailTaken)
        }
        other => ApiError::Database(other),
    })?;

    tracing::info!(user_id = %user.id, actor_id = %manager.id, role = %user.role, "Account created by administrator");
    Ok((StatusCode::CREATED, Ack::new("Account created", user.into())))
}

/// Load the account and check the actor may manage someone holding its current role.
async fn managed_account(state: &AppState, actor: &AuthUser, id: Uuid) -> ApiResult<User> {
    let user = find_user_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    can_assign_role(actor.role, user.role)?;
    Ok(user)
}

/// `PUT /api/admin/users/{id}/role`
#[tracing::instrument(skip(state))]
pub async fn change_role(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeRoleRequest>,
) -> ApiResult<Ack<UserProfile>> {
    let current = managed_account(&state, &manager, id).await?;
    can_assign_role(manager.role, body.role)?;

    let user = update_user_role(&state.db, id, body.role)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    tracing::info!(
        user_id = %id,
        actor_id = %manager.id,
        from = %current.role,
        to = %user.role,
        "User role changed"
    );
    Ok(Ack::new("Role updated", user.into()))
}

/// `PATCH /api/admin/users/{id}/status`
#[tracing::instrument(skip(state))]
pub async fn set_status(
    State(state): State<AppState>,
    ContentManager(manager): ContentManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UserStatusRequest>,
) -> ApiResult<Ack<UserProfile>> {
    managed_account(&state, &manager, id).await?;

    let user = update_user_status(&state.db, id, body.is_verified, body.is_active)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    tracing::info!(
        user_id = %id,
        actor_id = %manager.id,
        is_verified = user.is_verified,
        is_active = user.is_active,
        "User status changed"
    );
    Ok(Ack::new("Account updated", user.into()))
}
