//! Swap request lifecycle domain services.
//!
//! `SwapCommandService` drives the request state machine and notifies
//! recipients of new requests; `SwapQueryService` serves participant-scoped
//! reads.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AcceptSwapRequest, CancelSwapRequest, CompleteSwapRequest, CreateSwapRequest,
    RejectSwapRequest, SwapCommand, SwapListFilter, SwapNotifier, SwapQuery, SwapRepository,
    SwapRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::swap::{NewSwapRequest, SwapId, SwapParticipant, SwapRequest, SwapView};
use crate::domain::{Error, User, UserId};

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

fn map_swap_repository_error(error: SwapRepositoryError) -> Error {
    match error {
        SwapRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("swap repository unavailable: {message}"))
        }
        SwapRepositoryError::Query { message } => {
            Error::internal(format!("swap repository error: {message}"))
        }
    }
}

fn unknown_swap(swap_id: SwapId) -> Error {
    Error::not_found(format!("swap request {swap_id} not found"))
}

/// Load the session account, rejecting stale sessions.
///
/// A session may outlive its account; report that as an authentication
/// failure rather than a missing resource.
async fn load_session_account<R>(user_repo: &R, user_id: UserId) -> Result<User, Error>
where
    R: UserRepository,
{
    let member = user_repo
        .find_by_id(user_id)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::unauthorized("account not found"))?;
    if !member.is_active() {
        return Err(Error::unauthorized("account deactivated"));
    }
    Ok(member)
}

async fn load_swap<S>(swap_repo: &S, swap_id: SwapId) -> Result<SwapRequest, Error>
where
    S: SwapRepository,
{
    swap_repo
        .find_by_id(swap_id)
        .await
        .map_err(map_swap_repository_error)?
        .ok_or_else(|| unknown_swap(swap_id))
}

/// Reload a participant and credit them with a completed swap.
async fn credit_completion<R>(
    user_repo: &R,
    member_id: UserId,
    now: DateTime<Utc>,
) -> Result<(), Error>
where
    R: UserRepository,
{
    let member = user_repo
        .find_by_id(member_id)
        .await
        .map_err(map_user_repository_error)?
        .ok_or_else(|| Error::not_found(format!("member {member_id} not found")))?;
    user_repo
        .update(&member.record_completed_swap(now))
        .await
        .map_err(map_user_repository_error)
}

/// Swap lifecycle service implementing the command driving port.
#[derive(Clone)]
pub struct SwapCommandService<U, S, N> {
    user_repo: Arc<U>,
    swap_repo: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<U, S, N> SwapCommandService<U, S, N> {
    /// Create a new lifecycle service over the given adapters.
    pub fn new(
        user_repo: Arc<U>,
        swap_repo: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            swap_repo,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<U, S, N> SwapCommand for SwapCommandService<U, S, N>
where
    U: UserRepository,
    S: SwapRepository,
    N: SwapNotifier,
{
    async fn create(&self, request: CreateSwapRequest) -> Result<SwapView, Error> {
        load_session_account(self.user_repo.as_ref(), request.requester_id).await?;
        // A deactivated recipient is indistinguishable from a missing one.
        self.user_repo
            .find_by_id(request.recipient_id)
            .await
            .map_err(map_user_repository_error)?
            .filter(User::is_active)
            .ok_or_else(|| Error::not_found(format!("member {} not found", request.recipient_id)))?;
        if self
            .swap_repo
            .find_pending_between(request.requester_id, request.recipient_id)
            .await
            .map_err(map_swap_repository_error)?
            .is_some()
        {
            return Err(Error::conflict(
                "a pending swap request to this member already exists",
            ));
        }

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
            now: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.swap_repo
            .save(&swap)
            .await
            .map_err(map_swap_repository_error)?;

        // Delivery is best-effort; a broken channel never blocks creation.
        if let Err(error) = self.notifier.swap_requested(&swap).await {
            tracing::warn!(
                error = %error,
                swap_id = %swap.id(),
                "swap request notification failed"
            );
        }
        Ok(swap.view())
    }

    async fn accept(&self, request: AcceptSwapRequest) -> Result<SwapView, Error> {
        load_session_account(self.user_repo.as_ref(), request.actor).await?;
        let swap = load_swap(self.swap_repo.as_ref(), request.swap_id).await?;
        if swap.participant_of(request.actor) != Some(SwapParticipant::Recipient) {
            return Err(Error::forbidden("only the recipient may accept a swap request"));
        }
        let accepted = swap
            .accept(request.details, self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.swap_repo
            .update(&accepted)
            .await
            .map_err(map_swap_repository_error)?;
        Ok(accepted.view())
    }

    async fn reject(&self, request: RejectSwapRequest) -> Result<SwapView, Error> {
        load_session_account(self.user_repo.as_ref(), request.actor).await?;
        let swap = load_swap(self.swap_repo.as_ref(), request.swap_id).await?;
        if swap.participant_of(request.actor) != Some(SwapParticipant::Recipient) {
            return Err(Error::forbidden("only the recipient may reject a swap request"));
        }
        let rejected = swap
            .reject(request.response_message, self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.swap_repo
            .update(&rejected)
            .await
            .map_err(map_swap_repository_error)?;
        Ok(rejected.view())
    }

    async fn cancel(&self, request: CancelSwapRequest) -> Result<SwapView, Error> {
        load_session_account(self.user_repo.as_ref(), request.actor).await?;
        let swap = load_swap(self.swap_repo.as_ref(), request.swap_id).await?;
        if swap.participant_of(request.actor).is_none() {
            return Err(Error::forbidden("only a participant may cancel a swap request"));
        }
        let cancelled = swap
            .cancel(request.reason, self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.swap_repo
            .update(&cancelled)
            .await
            .map_err(map_swap_repository_error)?;
        Ok(cancelled.view())
    }

    async fn complete(&self, request: CompleteSwapRequest) -> Result<SwapView, Error> {
        load_session_account(self.user_repo.as_ref(), request.actor).await?;
        let swap = load_swap(self.swap_repo.as_ref(), request.swap_id).await?;
        if swap.participant_of(request.actor).is_none() {
            return Err(Error::forbidden(
                "only a participant may complete a swap request",
            ));
        }
        let now = self.clock.utc();
        let completed = swap
            .complete(now)
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.swap_repo
            .update(&completed)
            .await
            .map_err(map_swap_repository_error)?;

        // Swap counters lag rather than roll back an already completed swap.
        for participant in [SwapParticipant::Requester, SwapParticipant::Recipient] {
            let member_id = completed.id_of(participant);
            if let Err(error) = credit_completion(self.user_repo.as_ref(), member_id, now).await {
                tracing::warn!(
                    error = %error,
                    member_id = %member_id,
                    swap_id = %completed.id(),
                    "failed to credit completed swap"
                );
            }
        }
        Ok(completed.view())
    }
}

/// Read-side service implementing the swap query driving port.
#[derive(Clone)]
pub struct SwapQueryService<S, U> {
    swap_repo: Arc<S>,
    user_repo: Arc<U>,
}

impl<S, U> SwapQueryService<S, U> {
    /// Create a new query service over the swap and user repositories.
    pub fn new(swap_repo: Arc<S>, user_repo: Arc<U>) -> Self {
        Self {
            swap_repo,
            user_repo,
        }
    }
}

#[async_trait]
impl<S, U> SwapQuery for SwapQueryService<S, U>
where
    S: SwapRepository,
    U: UserRepository,
{
    async fn get(&self, swap_id: SwapId, viewer: UserId) -> Result<SwapView, Error> {
        let swap = load_swap(self.swap_repo.as_ref(), swap_id).await?;
        if swap.participant_of(viewer).is_none() {
            // Moderators may inspect any swap.
            let viewing = self
                .user_repo
                .find_by_id(viewer)
                .await
                .map_err(map_user_repository_error)?;
            if !viewing.is_some_and(|account| account.role().is_admin()) {
                return Err(Error::forbidden(
                    "only a participant may view this swap request",
                ));
            }
        }
        Ok(swap.view())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapView>, Error> {
        let swaps = self
            .swap_repo
            .list_for_user(user_id, filter, page)
            .await
            .map_err(map_swap_repository_error)?;
        Ok(swaps.map(|swap| swap.view()))
    }
}

#[cfg(test)]
#[path = "swap_service_tests.rs"]
mod tests;
