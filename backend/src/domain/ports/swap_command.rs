//! Driving port for swap request lifecycle commands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::swap::{
    AcceptDetails, CancelReason, DurationHours, MeetingPlan, NewSwapRequest, ResponseMessage,
    SwapId, SwapMessage, SwapRequest, SwapView,
};
use crate::domain::{Error, SkillDescriptor, UserId};

/// Validated inputs for opening a swap request.
#[derive(Debug, Clone)]
pub struct CreateSwapRequest {
    /// Member proposing the trade.
    pub requester_id: UserId,
    /// Member the trade is proposed to.
    pub recipient_id: UserId,
    /// Skill the requester offers.
    pub offered_skill: SkillDescriptor,
    /// Skill the requester wants in return.
    pub requested_skill: SkillDescriptor,
    /// Optional opening message.
    pub message: Option<SwapMessage>,
    /// Optional proposed session time.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional agreed session length.
    pub duration_hours: Option<DurationHours>,
    /// Optional proposed meeting arrangement.
    pub meeting: Option<MeetingPlan>,
}

/// Inputs for accepting a pending swap.
#[derive(Debug, Clone)]
pub struct AcceptSwapRequest {
    /// Swap being accepted.
    pub swap_id: SwapId,
    /// Member performing the action.
    pub actor: UserId,
    /// Optional response details.
    pub details: AcceptDetails,
}

/// Inputs for rejecting a pending swap.
#[derive(Debug, Clone)]
pub struct RejectSwapRequest {
    /// Swap being rejected.
    pub swap_id: SwapId,
    /// Member performing the action.
    pub actor: UserId,
    /// Optional message for the requester.
    pub response_message: Option<ResponseMessage>,
}

/// Inputs for cancelling an open swap.
#[derive(Debug, Clone)]
pub struct CancelSwapRequest {
    /// Swap being cancelled.
    pub swap_id: SwapId,
    /// Member performing the action.
    pub actor: UserId,
    /// Optional cancellation reason.
    pub reason: Option<CancelReason>,
}

/// Inputs for completing an accepted swap.
#[derive(Debug, Clone)]
pub struct CompleteSwapRequest {
    /// Swap being completed.
    pub swap_id: SwapId,
    /// Member performing the action.
    pub actor: UserId,
}

/// Driving port for swap lifecycle commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapCommand: Send + Sync {
    /// Open a pending swap towards an active member.
    ///
    /// Fails with a conflict when a pending swap already exists between the
    /// same pair in the same direction.
    async fn create(&self, request: CreateSwapRequest) -> Result<SwapView, Error>;

    /// Accept a pending swap. Only the recipient may accept.
    async fn accept(&self, request: AcceptSwapRequest) -> Result<SwapView, Error>;

    /// Reject a pending swap. Only the recipient may reject.
    async fn reject(&self, request: RejectSwapRequest) -> Result<SwapView, Error>;

    /// Cancel a pending or accepted swap. Either participant may cancel.
    async fn cancel(&self, request: CancelSwapRequest) -> Result<SwapView, Error>;

    /// Mark an accepted swap as completed. Either participant may complete.
    async fn complete(&self, request: CompleteSwapRequest) -> Result<SwapView, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
///
/// `create` echoes a fresh pending swap; the transition methods report the
/// swap as unknown because the fixture stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSwapCommand;

impl FixtureSwapCommand {
    fn unknown_swap(swap_id: SwapId) -> Error {
        Error::not_found(format!("swap request {swap_id} not found"))
    }
}

#[async_trait]
impl SwapCommand for FixtureSwapCommand {
    async fn create(&self, request: CreateSwapRequest) -> Result<SwapView, Error> {
        let swap = SwapRequest::new(NewSwapRequest {
            id: SwapId::random(),
            requester_id: request.requester_id,
            recipient_id: request.recipient_id,
            offered_skill: request.offered_skill,
            requested_skill: request.requested_skill,
            message: request.message,
            scheduled_for: request.scheduled_for,
            duration_hours: request.duration_hours,
            meeting: request.meeting.unwrap_or_default(),
            now: DateTime::UNIX_EPOCH,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(swap.view())
    }

    async fn accept(&self, request: AcceptSwapRequest) -> Result<SwapView, Error> {
        Err(Self::unknown_swap(request.swap_id))
    }

    async fn reject(&self, request: RejectSwapRequest) -> Result<SwapView, Error> {
        Err(Self::unknown_swap(request.swap_id))
    }

    async fn cancel(&self, request: CancelSwapRequest) -> Result<SwapView, Error> {
        Err(Self::unknown_swap(request.swap_id))
    }

    async fn complete(&self, request: CompleteSwapRequest) -> Result<SwapView, Error> {
        Err(Self::unknown_swap(request.swap_id))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::skill::SkillDraft;
    use crate::domain::swap::SwapStatus;
    use crate::domain::ErrorCode;

    fn skill(name: &str) -> SkillDescriptor {
        SkillDescriptor::new(SkillDraft {
            name: name.to_owned(),
            description: None,
            level: None,
        })
        .expect("valid skill draft")
    }

    fn create_request(requester_id: UserId, recipient_id: UserId) -> CreateSwapRequest {
        CreateSwapRequest {
            requester_id,
            recipient_id,
            offered_skill: skill("Guitar"),
            requested_skill: skill("Spanish"),
            message: None,
            scheduled_for: None,
            duration_hours: None,
            meeting: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_create_echoes_a_pending_swap() {
        let command = FixtureSwapCommand;
        let requester_id = UserId::random();
        let recipient_id = UserId::random();

        let view = command
            .create(create_request(requester_id, recipient_id))
            .await
            .expect("fixture create succeeds");

        assert_eq!(view.status, SwapStatus::Pending);
        assert_eq!(view.requester_id, requester_id);
        assert_eq!(view.recipient_id, recipient_id);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_create_rejects_self_swaps() {
        let command = FixtureSwapCommand;
        let member = UserId::random();

        let error = command
            .create(create_request(member, member))
            .await
            .expect_err("self swap fails");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_transitions_are_not_found() {
        let command = FixtureSwapCommand;

        let error = command
            .complete(CompleteSwapRequest {
                swap_id: SwapId::random(),
                actor: UserId::random(),
            })
            .await
            .expect_err("fixture complete fails");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
