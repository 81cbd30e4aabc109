//! Swap request API handlers.
//!
//! ```text
//! POST /api/v1/swaps {"recipientId":"...","offeredSkill":{"name":"Guitar basics"},"requestedSkill":{"name":"Spanish conversation"}}
//! GET  /api/v1/swaps/my?role=sent&status=pending
//! GET  /api/v1/swaps/{id}
//! PUT  /api/v1/swaps/{id}/accept
//! PUT  /api/v1/swaps/{id}/reject
//! PUT  /api/v1/swaps/{id}/cancel
//! PUT  /api/v1/swaps/{id}/complete
//! POST /api/v1/swaps/{id}/rate {"score":5}
//! ```

use actix_web::{get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    AcceptSwapRequest, CancelSwapRequest, CompleteSwapRequest, CreateSwapRequest,
    RejectSwapRequest, SubmitRatingRequest,
};
use crate::domain::rating::{RatingComment, RatingScore, RatingView, SubScores};
use crate::domain::swap::{
    AcceptDetails, CancelReason, DurationHours, MeetingPlan, ResponseMessage, SwapId, SwapMessage,
    SwapView,
};
use crate::domain::{Error, SkillDescriptor, SkillDraft, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::MySwapsParams;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, page_request, parse_id,
};

/// Request body for `POST /api/v1/swaps`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapBody {
    /// Member the trade is proposed to.
    pub recipient_id: String,
    /// Skill the caller offers.
    pub offered_skill: SkillDraft,
    /// Skill the caller wants in return.
    pub requested_skill: SkillDraft,
    /// Optional opening message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional proposed session time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional agreed session length in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    /// Optional proposed meeting arrangement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingPlan>,
}

impl CreateSwapBody {
    fn into_request(self, requester_id: UserId) -> Result<CreateSwapRequest, Error> {
        let recipient_id: UserId = parse_id(&self.recipient_id, FieldName::new("recipientId"))?;
        let offered_skill = SkillDescriptor::new(self.offered_skill)
            .map_err(|err| invalid_field_error(FieldName::new("offeredSkill"), &err))?;
        let requested_skill = SkillDescriptor::new(self.requested_skill)
            .map_err(|err| invalid_field_error(FieldName::new("requestedSkill"), &err))?;
        let message = self
            .message
            .map(|raw| {
                SwapMessage::new(raw)
                    .map_err(|err| invalid_field_error(FieldName::new("message"), &err))
            })
            .transpose()?;
        let duration_hours = self
            .duration_hours
            .map(|raw| {
                DurationHours::new(raw)
                    .map_err(|err| invalid_field_error(FieldName::new("durationHours"), &err))
            })
            .transpose()?;
        Ok(CreateSwapRequest {
            requester_id,
            recipient_id,
            offered_skill,
            requested_skill,
            message,
            scheduled_for: self.scheduled_for,
            duration_hours,
            meeting: self.meeting,
        })
    }
}

/// Request body for `PUT /api/v1/swaps/{id}/accept`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptSwapBody {
    /// Optional message for the requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    /// Optional agreed session time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional replacement meeting arrangement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<MeetingPlan>,
}

impl AcceptSwapBody {
    fn into_details(self) -> Result<AcceptDetails, Error> {
        let response_message = parse_response_message(self.response_message)?;
        Ok(AcceptDetails {
            response_message,
            scheduled_for: self.scheduled_for,
            meeting: self.meeting,
        })
    }
}

/// Request body for `PUT /api/v1/swaps/{id}/reject`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectSwapBody {
    /// Optional message for the requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
}

/// Request body for `PUT /api/v1/swaps/{id}/cancel`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelSwapBody {
    /// Optional cancellation reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

const fn default_would_recommend() -> bool {
    true
}

/// Request body for `POST /api/v1/swaps/{id}/rate`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateSwapBody {
    /// Overall score from 1 to 5.
    pub score: u8,
    /// Optional free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Optional per-aspect scores.
    #[serde(default, skip_serializing_if = "SubScores::is_empty")]
    pub sub_scores: SubScores,
    /// Whether the caller would trade with this member again.
    #[serde(default = "default_would_recommend")]
    pub would_recommend: bool,
}

impl RateSwapBody {
    fn into_request(self, swap_id: SwapId, rater_id: UserId) -> Result<SubmitRatingRequest, Error> {
        let score = RatingScore::new(self.score)
            .map_err(|err| invalid_field_error(FieldName::new("score"), &err))?;
        let comment = self
            .comment
            .map(|raw| {
                RatingComment::new(raw)
                    .map_err(|err| invalid_field_error(FieldName::new("comment"), &err))
            })
            .transpose()?;
        Ok(SubmitRatingRequest {
            swap_id,
            rater_id,
            score,
            comment,
            sub_scores: self.sub_scores,
            would_recommend: self.would_recommend,
        })
    }
}

fn parse_response_message(raw: Option<String>) -> Result<Option<ResponseMessage>, Error> {
    raw.map(|value| {
        ResponseMessage::new(value)
            .map_err(|err| invalid_field_error(FieldName::new("responseMessage"), &err))
    })
    .transpose()
}

/// Open a swap request towards another member.
#[utoipa::path(
    post,
    path = "/api/v1/swaps",
    request_body = CreateSwapBody,
    responses(
        (status = 201, description = "Swap request created", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Recipient not found", body = Error),
        (status = 409, description = "Duplicate pending request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "createSwap"
)]
#[post("/swaps")]
pub async fn create_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateSwapBody>,
) -> ApiResult<actix_web::HttpResponse> {
    let requester_id = session.require_user_id()?;
    let request = payload.into_inner().into_request(requester_id)?;
    let swap = state.swaps.create(request).await?;
    Ok(actix_web::HttpResponse::Created().json(swap))
}

/// List the calling member's swap requests.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/my",
    params(MySwapsParams),
    responses(
        (status = 200, description = "Swap page", body = Page<SwapView>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "listSwaps"
)]
#[get("/swaps/my")]
pub async fn list_swaps(
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

/// Fetch one swap request. Only its participants may view it.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/{id}",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap request", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "getSwap"
)]
#[get("/swaps/{id}")]
pub async fn get_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    let viewer = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let swap = state.swaps_query.get(swap_id, viewer).await?;
    Ok(web::Json(swap))
}

/// Accept a pending swap request.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/accept",
    params(("id" = String, Path, description = "Swap id")),
    request_body = AcceptSwapBody,
    responses(
        (status = 200, description = "Swap accepted", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only the recipient may accept", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 409, description = "Swap is not pending", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "acceptSwap"
)]
#[put("/swaps/{id}/accept")]
pub async fn accept_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AcceptSwapBody>,
) -> ApiResult<web::Json<SwapView>> {
    let actor = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let details = payload.into_inner().into_details()?;
    let swap = state
        .swaps
        .accept(AcceptSwapRequest {
            swap_id,
            actor,
            details,
        })
        .await?;
    Ok(web::Json(swap))
}

/// Reject a pending swap request.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/reject",
    params(("id" = String, Path, description = "Swap id")),
    request_body = RejectSwapBody,
    responses(
        (status = 200, description = "Swap rejected", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only the recipient may reject", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 409, description = "Swap is not pending", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "rejectSwap"
)]
#[put("/swaps/{id}/reject")]
pub async fn reject_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RejectSwapBody>,
) -> ApiResult<web::Json<SwapView>> {
    let actor = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let response_message = parse_response_message(payload.into_inner().response_message)?;
    let swap = state
        .swaps
        .reject(RejectSwapRequest {
            swap_id,
            actor,
            response_message,
        })
        .await?;
    Ok(web::Json(swap))
}

/// Cancel an open swap request.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/cancel",
    params(("id" = String, Path, description = "Swap id")),
    request_body = CancelSwapBody,
    responses(
        (status = 200, description = "Swap cancelled", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 409, description = "Swap is already closed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "cancelSwap"
)]
#[put("/swaps/{id}/cancel")]
pub async fn cancel_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CancelSwapBody>,
) -> ApiResult<web::Json<SwapView>> {
    let actor = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let reason = payload
        .into_inner()
        .reason
        .map(|raw| {
            CancelReason::new(raw)
                .map_err(|err| invalid_field_error(FieldName::new("reason"), &err))
        })
        .transpose()?;
    let swap = state
        .swaps
        .cancel(CancelSwapRequest {
            swap_id,
            actor,
            reason,
        })
        .await?;
    Ok(web::Json(swap))
}

/// Mark an accepted swap as completed.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/complete",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap completed", body = SwapView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 409, description = "Swap is not accepted", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "completeSwap"
)]
#[put("/swaps/{id}/complete")]
pub async fn complete_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    let actor = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let swap = state
        .swaps
        .complete(CompleteSwapRequest { swap_id, actor })
        .await?;
    Ok(web::Json(swap))
}

/// Rate the counterpart on a completed swap.
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/rate",
    params(("id" = String, Path, description = "Swap id")),
    request_body = RateSwapBody,
    responses(
        (status = 201, description = "Rating recorded", body = RatingView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Swap not found", body = Error),
        (status = 409, description = "Swap not completed or already rated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["swaps"],
    operation_id = "rateSwap"
)]
#[post("/swaps/{id}/rate")]
pub async fn rate_swap(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RateSwapBody>,
) -> ApiResult<actix_web::HttpResponse> {
    let rater_id = session.require_user_id()?;
    let swap_id: SwapId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let request = payload.into_inner().into_request(swap_id, rater_id)?;
    let rating = state.ratings.submit(request).await?;
    Ok(actix_web::HttpResponse::Created().json(rating))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::swap::MeetingKind;

    const RECIPIENT: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn create_body(recipient: &str) -> CreateSwapBody {
        serde_json::from_value(json!({
            "recipientId": recipient,
            "offeredSkill": {"name": "Guitar basics", "level": "intermediate"},
            "requestedSkill": {"name": "Spanish conversation"},
            "message": "Shall we trade?",
            "durationHours": 1.5
        }))
        .expect("valid body")
    }

    #[rstest]
    fn create_body_builds_a_validated_request() {
        let requester = UserId::random();

        let request = create_body(RECIPIENT)
            .into_request(requester)
            .expect("valid request");

        assert_eq!(request.requester_id, requester);
        assert_eq!(request.recipient_id.to_string(), RECIPIENT);
        assert_eq!(request.offered_skill.name(), "Guitar basics");
        assert_eq!(
            request.message.as_ref().map(|msg| msg.as_ref()),
            Some("Shall we trade?")
        );
        assert_eq!(request.duration_hours.map(DurationHours::hours), Some(1.5));
    }

    #[rstest]
    fn create_body_parses_proposed_scheduling_details() {
        let body: CreateSwapBody = serde_json::from_value(json!({
            "recipientId": RECIPIENT,
            "offeredSkill": {"name": "Guitar basics"},
            "requestedSkill": {"name": "Spanish conversation"},
            "scheduledFor": "2026-09-05T10:00:00Z",
            "meeting": {"kind": "in_person", "details": "Central library"}
        }))
        .expect("valid body");

        let request = body
            .into_request(UserId::random())
            .expect("valid request");

        assert!(request.scheduled_for.is_some());
        assert_eq!(
            request.meeting.as_ref().map(|plan| plan.kind),
            Some(MeetingKind::InPerson)
        );
    }

    #[rstest]
    fn create_body_rejects_a_malformed_recipient_id() {
        let error = create_body("not-a-uuid")
            .into_request(UserId::random())
            .expect_err("malformed id fails");

        let details = error.details().expect("details present");
        assert_eq!(details["field"], "recipientId");
    }

    #[rstest]
    fn accept_body_parses_the_optional_details() {
        let body: AcceptSwapBody = serde_json::from_value(json!({
            "responseMessage": "See you Saturday",
            "scheduledFor": "2026-09-05T10:00:00Z",
            "meeting": {"kind": "in_person", "details": "Central library"}
        }))
        .expect("valid body");

        let details = body.into_details().expect("valid details");
        assert_eq!(
            details.response_message.as_ref().map(|msg| msg.as_ref()),
            Some("See you Saturday")
        );
        assert!(details.scheduled_for.is_some());
        assert!(details.meeting.is_some());
    }

    #[rstest]
    fn empty_accept_body_yields_default_details() {
        let body: AcceptSwapBody = serde_json::from_value(json!({})).expect("valid body");
        let details = body.into_details().expect("valid details");
        assert!(details.response_message.is_none());
        assert!(details.scheduled_for.is_none());
        assert!(details.meeting.is_none());
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn rate_body_rejects_out_of_range_scores(#[case] score: u8) {
        let body = RateSwapBody {
            score,
            comment: None,
            sub_scores: SubScores::default(),
            would_recommend: true,
        };

        let error = body
            .into_request(SwapId::random(), UserId::random())
            .expect_err("score is rejected");
        let details = error.details().expect("details present");
        assert_eq!(details["field"], "score");
    }

    #[rstest]
    fn rate_body_defaults_would_recommend_to_true() {
        let body: RateSwapBody = serde_json::from_value(json!({"score": 4})).expect("valid body");
        assert!(body.would_recommend);
        let request = body
            .into_request(SwapId::random(), UserId::random())
            .expect("valid request");
        assert!(request.would_recommend);
        assert_eq!(request.score.value(), 4);
    }
}
