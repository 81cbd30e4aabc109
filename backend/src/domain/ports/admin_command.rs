//! Driving port for admin moderation commands.
//!
//! Every operation names the acting member; implementations resolve the
//! actor's role per call rather than trusting the session, so a demotion
//! takes effect immediately.

use async_trait::async_trait;

use crate::domain::rating::{FlagReason, RatingId, RatingView};
use crate::domain::reporting::{BroadcastDraft, BroadcastReceipt};
use crate::domain::user::AccountView;
use crate::domain::{Error, UserId};

/// Inputs for activating or deactivating a member account.
#[derive(Debug, Clone)]
pub struct SetUserStatusRequest {
    /// Admin performing the action.
    pub actor: UserId,
    /// Account being changed.
    pub user_id: UserId,
    /// Desired active state.
    pub active: bool,
}

/// Inputs for flagging or clearing a rating.
#[derive(Debug, Clone)]
pub struct SetRatingFlagRequest {
    /// Admin performing the action.
    pub actor: UserId,
    /// Rating being moderated.
    pub rating_id: RatingId,
    /// Desired flag state.
    pub flagged: bool,
    /// Optional moderation note; ignored when clearing the flag.
    pub reason: Option<FlagReason>,
}

/// Inputs for a platform-wide broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    /// Admin performing the action.
    pub actor: UserId,
    /// Validated broadcast payload.
    pub draft: BroadcastDraft,
}

/// Driving port for admin moderation commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminCommand: Send + Sync {
    /// Activate or deactivate a member account.
    ///
    /// Admins cannot change their own status.
    async fn set_user_active(&self, request: SetUserStatusRequest) -> Result<AccountView, Error>;

    /// Flag a rating for review or clear an existing flag.
    async fn set_rating_flag(&self, request: SetRatingFlagRequest) -> Result<RatingView, Error>;

    /// Record a platform broadcast and return its receipt.
    async fn broadcast(&self, request: BroadcastRequest) -> Result<BroadcastReceipt, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
///
/// The fixture world has no admin accounts, so every call is forbidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminCommand;

impl FixtureAdminCommand {
    fn forbidden() -> Error {
        Error::forbidden("administrator access required")
    }
}

#[async_trait]
impl AdminCommand for FixtureAdminCommand {
    async fn set_user_active(&self, _request: SetUserStatusRequest) -> Result<AccountView, Error> {
        Err(Self::forbidden())
    }

    async fn set_rating_flag(&self, _request: SetRatingFlagRequest) -> Result<RatingView, Error> {
        Err(Self::forbidden())
    }

    async fn broadcast(&self, _request: BroadcastRequest) -> Result<BroadcastReceipt, Error> {
        Err(Self::forbidden())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[tokio::test]
    async fn fixture_commands_are_forbidden() {
        let command = FixtureAdminCommand;

        let status_error = command
            .set_user_active(SetUserStatusRequest {
                actor: UserId::random(),
                user_id: UserId::random(),
                active: false,
            })
            .await
            .expect_err("fixture status change fails");
        let broadcast_error = command
            .broadcast(BroadcastRequest {
                actor: UserId::random(),
                draft: BroadcastDraft::try_from_parts("Scheduled maintenance", "Back at noon", None)
                    .expect("valid draft"),
            })
            .await
            .expect_err("fixture broadcast fails");

        assert_eq!(status_error.code(), ErrorCode::Forbidden);
        assert_eq!(broadcast_error.code(), ErrorCode::Forbidden);
    }
}
