//! Member directory API handlers.
//!
//! ```text
//! GET    /api/v1/users?q=guitar&availability=weekends&page=1&limit=10
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/me/profile
//! GET    /api/v1/users/me/swaps?role=sent&status=pending
//! GET    /api/v1/users/me/ratings
//! DELETE /api/v1/users/me
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use pagination::Page;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Error;
use crate::domain::ports::{DirectoryFilter, GetProfileResponse, SwapListFilter, SwapRole};
use crate::domain::rating::RatingView;
use crate::domain::swap::{SwapStatus, SwapView};
use crate::domain::user::{
    AccountView, AvailabilityTag, Bio, DisplayName, Location, PhotoUrl, ProfileChanges,
    PublicProfile,
};
use crate::domain::{SkillDescriptor, SkillDraft, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, page_request, parse_id, parse_label,
};

/// Query parameters accepted by the directory search.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySearchParams {
    /// Free text matched against display names and skill names.
    pub q: Option<String>,
    /// Substring matched against skill names only.
    pub skill: Option<String>,
    /// Substring matched against the location field.
    pub location: Option<String>,
    /// Availability tag members must list.
    pub availability: Option<String>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Query parameters accepted by the personal swap listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MySwapsParams {
    /// Which side of the request to list: `sent`, `received` or `either`.
    pub role: Option<String>,
    /// Restrict to one lifecycle status.
    pub status: Option<String>,
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Plain pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
}

/// Distinguishes an absent JSON field from an explicit `null`.
///
/// Absent keeps the stored value; `null` clears it.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Profile update body for `PUT /api/v1/users/me/profile`.
///
/// Every field is optional; omitted fields keep their stored value, while
/// `null` clears the clearable ones.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Replacement display name.
    pub display_name: Option<String>,
    /// Set or clear the location.
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    /// Set or clear the bio.
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    /// Set or clear the photo URL.
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
    /// Toggle profile visibility.
    pub is_public: Option<bool>,
    /// Replace the offered skill list.
    pub skills_offered: Option<Vec<SkillDraft>>,
    /// Replace the wanted skill list.
    pub skills_wanted: Option<Vec<SkillDraft>>,
    /// Replace the availability tags.
    pub availability: Option<Vec<AvailabilityTag>>,
}

fn parse_skills(
    drafts: Vec<SkillDraft>,
    field: FieldName,
) -> Result<Vec<SkillDescriptor>, Error> {
    drafts
        .into_iter()
        .map(|draft| SkillDescriptor::new(draft).map_err(|err| invalid_field_error(field, &err)))
        .collect()
}

fn parse_clearable<T, E>(
    value: Option<Option<String>>,
    field: FieldName,
    construct: impl Fn(String) -> Result<T, E>,
) -> Result<Option<Option<T>>, Error>
where
    E: std::fmt::Display,
{
    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(raw)) => construct(raw)
            .map(|parsed| Some(Some(parsed)))
            .map_err(|err| invalid_field_error(field, &err)),
    }
}

impl TryFrom<UpdateProfileRequest> for ProfileChanges {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let display_name = value
            .display_name
            .map(|raw| {
                DisplayName::new(raw)
                    .map_err(|err| invalid_field_error(FieldName::new("displayName"), &err))
            })
            .transpose()?;
        let location = parse_clearable(value.location, FieldName::new("location"), Location::new)?;
        let bio = parse_clearable(value.bio, FieldName::new("bio"), Bio::new)?;
        let photo_url =
            parse_clearable(value.photo_url, FieldName::new("photoUrl"), PhotoUrl::new)?;
        let skills_offered = value
            .skills_offered
            .map(|drafts| parse_skills(drafts, FieldName::new("skillsOffered")))
            .transpose()?;
        let skills_wanted = value
            .skills_wanted
            .map(|drafts| parse_skills(drafts, FieldName::new("skillsWanted")))
            .transpose()?;
        Ok(Self {
            display_name,
            location,
            bio,
            photo_url,
            is_public: value.is_public,
            skills_offered,
            skills_wanted,
            availability: value.availability,
        })
    }
}

impl DirectorySearchParams {
    fn into_filter(self) -> Result<(DirectoryFilter, Option<u32>, Option<u32>), Error> {
        let availability = self
            .availability
            .map(|raw| parse_label::<AvailabilityTag>(&raw, FieldName::new("availability")))
            .transpose()?;
        let filter = DirectoryFilter {
            text: self.q,
            skill: self.skill,
            location: self.location,
            availability,
        };
        Ok((filter, self.page, self.limit))
    }
}

impl MySwapsParams {
    pub(crate) fn into_filter(self) -> Result<(SwapListFilter, Option<u32>, Option<u32>), Error> {
        let role = self
            .role
            .map(|raw| parse_label::<SwapRole>(&raw, FieldName::new("role")))
            .transpose()?
            .unwrap_or_default();
        let status = self
            .status
            .map(|raw| parse_label::<SwapStatus>(&raw, FieldName::new("status")))
            .transpose()?;
        Ok((SwapListFilter { role, status }, self.page, self.limit))
    }
}

/// Search the public member directory.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(DirectorySearchParams),
    responses(
        (status = 200, description = "Directory page", body = Page<PublicProfile>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "searchDirectory"
)]
#[get("/users")]
pub async fn search_directory(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<DirectorySearchParams>,
) -> ApiResult<web::Json<Page<PublicProfile>>> {
    session.require_user_id()?;
    let (filter, page, limit) = params.into_inner().into_filter()?;
    let window = page_request(page, limit)?;
    let results = state.directory_query.search(filter, window).await?;
    Ok(web::Json(results))
}

/// Fetch one member's profile with their recent ratings.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Member profile", body = GetProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Profile is private", body = Error),
        (status = 404, description = "Member not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/{id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<GetProfileResponse>> {
    let viewer = session.require_user_id()?;
    let user_id: UserId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let profile = state.directory_query.profile(user_id, viewer).await?;
    Ok(web::Json(profile))
}

/// Apply partial changes to the calling member's profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<AccountView>> {
    let user_id = session.require_user_id()?;
    let changes = ProfileChanges::try_from(payload.into_inner())?;
    let account = state.directory.update_profile(user_id, changes).await?;
    Ok(web::Json(account))
}

/// List the calling member's swap requests.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/swaps",
    params(MySwapsParams),
    responses(
        (status = 200, description = "Swap page", body = Page<SwapView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listMySwaps"
)]
#[get("/users/me/swaps")]
pub async fn list_my_swaps(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<MySwapsParams>,
) -> ApiResult<web::Json<Page<SwapView>>> {
    let user_id = session.require_user_id()?;
    let (filter, page, limit) = params.into_inner().into_filter()?;
    let window = page_request(page, limit)?;
    let results = state
        .swaps_query
        .list_for_user(user_id, filter, window)
        .await?;
    Ok(web::Json(results))
}

/// List ratings the calling member has received.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/ratings",
    params(PageParams),
    responses(
        (status = 200, description = "Rating page", body = Page<RatingView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listMyRatings"
)]
#[get("/users/me/ratings")]
pub async fn list_my_ratings(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<PageParams>,
) -> ApiResult<web::Json<Page<RatingView>>> {
    let user_id = session.require_user_id()?;
    let window = page_request(params.page, params.limit)?;
    let results = state.ratings_query.list_received(user_id, window).await?;
    Ok(web::Json(results))
}

/// Deactivate the calling member's account and end the session.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deactivateAccount"
)]
#[delete("/users/me")]
pub async fn deactivate_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.directory.deactivate(user_id).await?;
    session.forget_user();
    Ok(HttpResponse::NoContent().finish())
}
