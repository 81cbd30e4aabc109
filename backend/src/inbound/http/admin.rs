//! Admin API handlers.
//!
//! Every endpoint names the session member as the acting admin; the domain
//! services re-check the role per call.
//!
//! ```text
//! GET  /api/v1/admin/dashboard
//! GET  /api/v1/admin/users?search=ada&active=true
//! PUT  /api/v1/admin/users/{id}/status {"active":false}
//! GET  /api/v1/admin/swaps?status=pending
//! GET  /api/v1/admin/ratings?flagged=true
//! PUT  /api/v1/admin/ratings/{id}/flag {"flagged":true,"reason":"abusive comment"}
//! GET  /api/v1/admin/reports?kind=swaps&from=2026-01-01T00:00:00Z
//! POST /api/v1/admin/message {"title":"Planned maintenance","body":"..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::ports::{
    AdminUserFilter, BroadcastRequest, SetRatingFlagRequest, SetUserStatusRequest,
};
use crate::domain::rating::{FlagReason, RatingId, RatingView};
use crate::domain::reporting::{
    ActivityReport, BroadcastDraft, BroadcastReceipt, BroadcastValidationError, DashboardSnapshot,
    ReportKind, ReportWindow,
};
use crate::domain::swap::{SwapStatus, SwapView};
use crate::domain::user::AccountView;
use crate::domain::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, page_request, parse_id, parse_label,
};

/// Query parameters accepted by the admin account listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersParams {
    /// Substring matched against display name or email.
    pub search: Option<String>,
    /// Restrict to active or deactivated accounts.
    pub active: Option<bool>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Query parameters accepted by the admin swap listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminSwapsParams {
    /// Restrict to one lifecycle status.
    pub status: Option<String>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Query parameters accepted by the admin rating listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminRatingsParams {
    /// Restrict to flagged or unflagged ratings.
    pub flagged: Option<bool>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Query parameters accepted by the activity report.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    /// Which series to include: `all`, `users`, `swaps` or `ratings`.
    pub kind: Option<String>,
    /// Earliest timestamp included, RFC 3339.
    pub from: Option<DateTime<Utc>>,
    /// Latest timestamp included, RFC 3339.
    pub to: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/v1/admin/users/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetUserStatusBody {
    /// Desired active state.
    pub active: bool,
}

/// Request body for `PUT /api/v1/admin/ratings/{id}/flag`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRatingFlagBody {
    /// Desired flag state.
    pub flagged: bool,
    /// Optional moderation note; ignored when clearing the flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Request body for `POST /api/v1/admin/message`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBody {
    /// Broadcast headline.
    pub title: String,
    /// Broadcast text.
    pub body: String,
    /// Optional category label; defaults to `info`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

fn map_broadcast_validation_error(err: BroadcastValidationError) -> Error {
    let field = match err {
        BroadcastValidationError::EmptyTitle => FieldName::new("title"),
        BroadcastValidationError::EmptyBody => FieldName::new("body"),
    };
    invalid_field_error(field, &err)
}

/// Assemble the admin dashboard snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDashboard"
)]
#[get("/admin/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardSnapshot>> {
    let actor = session.require_user_id()?;
    let snapshot = state.admin_query.dashboard(actor).await?;
    Ok(web::Json(snapshot))
}

/// List member accounts for moderation.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(AdminUsersParams),
    responses(
        (status = 200, description = "Account page", body = Page<AccountView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<AdminUsersParams>,
) -> ApiResult<web::Json<Page<AccountView>>> {
    let actor = session.require_user_id()?;
    let params = params.into_inner();
    let window = page_request(params.page, params.limit)?;
    let filter = AdminUserFilter {
        search: params.search,
        active: params.active,
    };
    let results = state.admin_query.list_users(actor, filter, window).await?;
    Ok(web::Json(results))
}

/// Activate or deactivate a member account.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/status",
    params(("id" = String, Path, description = "Member id")),
    request_body = SetUserStatusBody,
    responses(
        (status = 200, description = "Updated account", body = AccountView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Member not found", body = Error),
        (status = 409, description = "Admins cannot change their own status", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetUserStatus"
)]
#[put("/admin/users/{id}/status")]
pub async fn set_user_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetUserStatusBody>,
) -> ApiResult<web::Json<AccountView>> {
    let actor = session.require_user_id()?;
    let user_id: UserId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let account = state
        .admin
        .set_user_active(SetUserStatusRequest {
            actor,
            user_id,
            active: payload.active,
        })
        .await?;
    Ok(web::Json(account))
}

/// List swap requests across all members.
#[utoipa::path(
    get,
    path = "/api/v1/admin/swaps",
    params(AdminSwapsParams),
    responses(
        (status = 200, description = "Swap page", body = Page<SwapView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListSwaps"
)]
#[get("/admin/swaps")]
pub async fn list_swaps(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<AdminSwapsParams>,
) -> ApiResult<web::Json<Page<SwapView>>> {
    let actor = session.require_user_id()?;
    let params = params.into_inner();
    let window = page_request(params.page, params.limit)?;
    let status = params
        .status
        .map(|raw| parse_label::<SwapStatus>(&raw, FieldName::new("status")))
        .transpose()?;
    let results = state.admin_query.list_swaps(actor, status, window).await?;
    Ok(web::Json(results))
}

/// List ratings across all members.
#[utoipa::path(
    get,
    path = "/api/v1/admin/ratings",
    params(AdminRatingsParams),
    responses(
        (status = 200, description = "Rating page", body = Page<RatingView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListRatings"
)]
#[get("/admin/ratings")]
pub async fn list_ratings(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<AdminRatingsParams>,
) -> ApiResult<web::Json<Page<RatingView>>> {
    let actor = session.require_user_id()?;
    let params = params.into_inner();
    let window = page_request(params.page, params.limit)?;
    let results = state
        .admin_query
        .list_ratings(actor, params.flagged, window)
        .await?;
    Ok(web::Json(results))
}

/// Flag a rating for review or clear an existing flag.
#[utoipa::path(
    put,
    path = "/api/v1/admin/ratings/{id}/flag",
    params(("id" = String, Path, description = "Rating id")),
    request_body = SetRatingFlagBody,
    responses(
        (status = 200, description = "Updated rating", body = RatingView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Rating not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSetRatingFlag"
)]
#[put("/admin/ratings/{id}/flag")]
pub async fn set_rating_flag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetRatingFlagBody>,
) -> ApiResult<web::Json<RatingView>> {
    let actor = session.require_user_id()?;
    let rating_id: RatingId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let payload = payload.into_inner();
    let reason = payload
        .reason
        .map(|raw| {
            FlagReason::new(raw)
                .map_err(|err| invalid_field_error(FieldName::new("reason"), &err))
        })
        .transpose()?;
    let rating = state
        .admin
        .set_rating_flag(SetRatingFlagRequest {
            actor,
            rating_id,
            flagged: payload.flagged,
            reason,
        })
        .await?;
    Ok(web::Json(rating))
}

/// Assemble the activity report for the requested window.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reports",
    params(ReportParams),
    responses(
        (status = 200, description = "Activity report", body = ActivityReport),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminActivityReport"
)]
#[get("/admin/reports")]
pub async fn activity_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<ReportParams>,
) -> ApiResult<web::Json<ActivityReport>> {
    let actor = session.require_user_id()?;
    let params = params.into_inner();
    let kind = params
        .kind
        .map(|raw| parse_label::<ReportKind>(&raw, FieldName::new("kind")))
        .transpose()?
        .unwrap_or_default();
    let window = ReportWindow {
        from: params.from,
        to: params.to,
    };
    let report = state
        .admin_query
        .activity_report(actor, window, kind)
        .await?;
    Ok(web::Json(report))
}

/// Record a platform-wide broadcast message.
#[utoipa::path(
    post,
    path = "/api/v1/admin/message",
    request_body = BroadcastBody,
    responses(
        (status = 201, description = "Broadcast recorded", body = BroadcastReceipt),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminBroadcast"
)]
#[post("/admin/message")]
pub async fn broadcast(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BroadcastBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let payload = payload.into_inner();
    let draft =
        BroadcastDraft::try_from_parts(&payload.title, &payload.body, payload.kind.as_deref())
            .map_err(map_broadcast_validation_error)?;
    let receipt = state.admin.broadcast(BroadcastRequest { actor, draft }).await?;
    Ok(HttpResponse::Created().json(receipt))
}
