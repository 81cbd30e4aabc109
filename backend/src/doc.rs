//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the domain
//! view and error schemas they reference, and the session cookie security
//! scheme. The generated specification backs Swagger UI (debug builds) and
//! is exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::GetProfileResponse;
use crate::domain::rating::{RatingId, RatingScore, RatingSummary, RatingView, SubScores};
use crate::domain::reporting::{
    ActivityReport, BroadcastReceipt, DashboardSnapshot, DashboardStats, DayBucket, MonthBucket,
    RecentUser, ScoreMonthBucket, StatusMonthBucket,
};
use crate::domain::swap::{DurationHours, MeetingKind, MeetingPlan, SwapId, SwapStatus, SwapView};
use crate::domain::user::{AccountView, AvailabilityTag, PublicProfile, UserRole};
use crate::domain::{Error, ErrorCode, SkillDescriptor, SkillDraft, SkillLevel, UserId};
use crate::inbound::http::admin::{BroadcastBody, SetRatingFlagBody, SetUserStatusBody};
use crate::inbound::http::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::inbound::http::swaps::{
    AcceptSwapBody, CancelSwapBody, CreateSwapBody, RateSwapBody, RejectSwapBody,
};
use crate::inbound::http::users::UpdateProfileRequest;
use pagination::{Page, PageInfo};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Skillswap backend API",
        description = "HTTP interface for the skill-bartering marketplace: member \
                       directory, swap lifecycle, peer ratings, and moderation.",
        license(
            name = "ISC",
            url = "https://opensource.org/licenses/ISC"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::users::search_directory,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::list_my_swaps,
        crate::inbound::http::users::list_my_ratings,
        crate::inbound::http::users::deactivate_account,
        crate::inbound::http::swaps::create_swap,
        crate::inbound::http::swaps::list_swaps,
        crate::inbound::http::swaps::get_swap,
        crate::inbound::http::swaps::accept_swap,
        crate::inbound::http::swaps::reject_swap,
        crate::inbound::http::swaps::cancel_swap,
        crate::inbound::http::swaps::complete_swap,
        crate::inbound::http::swaps::rate_swap,
        crate::inbound::http::admin::dashboard,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::set_user_status,
        crate::inbound::http::admin::list_swaps,
        crate::inbound::http::admin::list_ratings,
        crate::inbound::http::admin::set_rating_flag,
        crate::inbound::http::admin::activity_report,
        crate::inbound::http::admin::broadcast,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserId,
        UserRole,
        AvailabilityTag,
        AccountView,
        PublicProfile,
        GetProfileResponse,
        SkillDraft,
        SkillDescriptor,
        SkillLevel,
        SwapId,
        SwapStatus,
        SwapView,
        MeetingKind,
        MeetingPlan,
        DurationHours,
        RatingId,
        RatingScore,
        RatingSummary,
        RatingView,
        SubScores,
        DashboardSnapshot,
        DashboardStats,
        RecentUser,
        MonthBucket,
        DayBucket,
        StatusMonthBucket,
        ScoreMonthBucket,
        ActivityReport,
        BroadcastReceipt,
        RegisterRequest,
        LoginRequest,
        ChangePasswordRequest,
        UpdateProfileRequest,
        CreateSwapBody,
        AcceptSwapBody,
        RejectSwapBody,
        CancelSwapBody,
        RateSwapBody,
        SetUserStatusBody,
        SetRatingFlagBody,
        BroadcastBody,
        PageInfo,
        Page<AccountView>,
        Page<PublicProfile>,
        Page<SwapView>,
        Page<RatingView>,
    )),
    tags(
        (name = "auth", description = "Registration, sessions, and credentials"),
        (name = "users", description = "Member directory and profile upkeep"),
        (name = "swaps", description = "Swap request lifecycle and ratings"),
        (name = "admin", description = "Moderation, reporting, and broadcasts"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
