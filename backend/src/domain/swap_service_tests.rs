//! Tests for the swap lifecycle services.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockSwapNotifier, MockSwapRepository, MockUserRepository, SwapNotifierError, SwapRole,
};
use crate::domain::skill::{SkillDescriptor, SkillDraft};
use crate::domain::swap::{AcceptDetails, MeetingKind, MeetingPlan, ResponseMessage, SwapStatus};
use crate::domain::rating::RatingSummary;
use crate::domain::user::{
    CredentialHash, DisplayName, EmailAddress, NewUser, UserRole, UserSnapshot,
};

fn registered_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

fn member_with_id(id: UserId) -> User {
    User::new(NewUser {
        id,
        display_name: DisplayName::new("Ada Lovelace").expect("valid name"),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
        credential: CredentialHash::new("plain$open sesame").expect("valid credential"),
        now: registered_at(),
    })
}

fn admin_with_id(id: UserId) -> User {
    User::from_snapshot(UserSnapshot {
        id,
        display_name: DisplayName::new("Grace Hopper").expect("valid name"),
        email: EmailAddress::new("grace@example.com").expect("valid email"),
        credential: CredentialHash::new("plain$open sesame").expect("valid credential"),
        role: UserRole::Admin,
        is_active: true,
        is_public: true,
        location: None,
        bio: None,
        photo_url: None,
        skills_offered: Vec::new(),
        skills_wanted: Vec::new(),
        availability: Vec::new(),
        rating: RatingSummary::default(),
        swap_count: 0,
        last_active_at: registered_at(),
        created_at: registered_at(),
        updated_at: registered_at(),
    })
}

fn skill(name: &str) -> SkillDescriptor {
    SkillDescriptor::new(SkillDraft {
        name: name.to_owned(),
        description: None,
        level: None,
    })
    .expect("valid skill")
}

fn pending_swap(requester_id: UserId, recipient_id: UserId) -> SwapRequest {
    SwapRequest::new(NewSwapRequest {
        id: SwapId::random(),
        requester_id,
        recipient_id,
        offered_skill: skill("Sourdough baking"),
        requested_skill: skill("Bicycle maintenance"),
        message: None,
        scheduled_for: None,
        duration_hours: None,
        meeting: MeetingPlan::default(),
        now: registered_at(),
    })
    .expect("valid swap")
}

fn accepted_swap(requester_id: UserId, recipient_id: UserId) -> SwapRequest {
    pending_swap(requester_id, recipient_id)
        .accept(AcceptDetails::default(), registered_at())
        .expect("pending swap accepts")
}

fn create_request(requester_id: UserId, recipient_id: UserId) -> CreateSwapRequest {
    CreateSwapRequest {
        requester_id,
        recipient_id,
        offered_skill: skill("Sourdough baking"),
        requested_skill: skill("Bicycle maintenance"),
        message: None,
        scheduled_for: None,
        duration_hours: None,
        meeting: None,
    }
}

fn active_pair(requester_id: UserId, recipient_id: UserId) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == requester_id)
        .return_once(move |_| Ok(Some(member_with_id(requester_id))));
    users
        .expect_find_by_id()
        .withf(move |id| *id == recipient_id)
        .return_once(move |_| Ok(Some(member_with_id(recipient_id))));
    users
}

fn accepting_notifier() -> MockSwapNotifier {
    let mut notifier = MockSwapNotifier::new();
    notifier.expect_swap_requested().returning(|_| Ok(()));
    notifier
}

#[tokio::test]
async fn create_saves_a_pending_swap_and_notifies_the_recipient() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_pending_between()
        .times(1)
        .returning(|_, _| Ok(None));
    swaps
        .expect_save()
        .withf(move |swap| {
            swap.status() == SwapStatus::Pending
                && swap.requester_id() == requester_id
                && swap.recipient_id() == recipient_id
                && swap.created_at() == fixture_now()
        })
        .times(1)
        .returning(|_| Ok(()));

    let mut notifier = MockSwapNotifier::new();
    notifier
        .expect_swap_requested()
        .withf(move |swap| swap.recipient_id() == recipient_id)
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(active_pair(requester_id, recipient_id)),
        Arc::new(swaps),
        Arc::new(notifier),
        fixture_clock(),
    );
    let view = service
        .create(create_request(requester_id, recipient_id))
        .await
        .expect("create succeeds");

    assert_eq!(view.status, SwapStatus::Pending);
    assert_eq!(view.requester_id, requester_id);
    assert_eq!(view.offered_skill.name(), "Sourdough baking");
}

#[tokio::test]
async fn create_carries_proposed_scheduling_details() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_pending_between()
        .times(1)
        .returning(|_, _| Ok(None));
    swaps.expect_save().times(1).returning(|_| Ok(()));

    let mut notifier = MockSwapNotifier::new();
    notifier
        .expect_swap_requested()
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(active_pair(requester_id, recipient_id)),
        Arc::new(swaps),
        Arc::new(notifier),
        fixture_clock(),
    );
    let mut request = create_request(requester_id, recipient_id);
    request.scheduled_for = Some(fixture_now());
    request.meeting = Some(MeetingPlan {
        kind: MeetingKind::InPerson,
        details: None,
    });
    let view = service.create(request).await.expect("create succeeds");

    assert_eq!(view.scheduled_for, Some(fixture_now()));
    assert_eq!(view.meeting.kind, MeetingKind::InPerson);
}

#[tokio::test]
async fn create_rejects_unknown_recipients() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == requester_id)
        .return_once(move |_| Ok(Some(member_with_id(requester_id))));
    users
        .expect_find_by_id()
        .withf(move |id| *id == recipient_id)
        .returning(|_| Ok(None));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(MockSwapRepository::new()),
        Arc::new(MockSwapNotifier::new()),
        fixture_clock(),
    );
    let error = service
        .create(create_request(requester_id, recipient_id))
        .await
        .expect_err("unknown recipient fails");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), format!("member {recipient_id} not found"));
}

#[tokio::test]
async fn create_treats_deactivated_recipients_as_missing() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == requester_id)
        .return_once(move |_| Ok(Some(member_with_id(requester_id))));
    users
        .expect_find_by_id()
        .withf(move |id| *id == recipient_id)
        .return_once(move |_| Ok(Some(member_with_id(recipient_id).with_active(false, registered_at()))));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(MockSwapRepository::new()),
        Arc::new(MockSwapNotifier::new()),
        fixture_clock(),
    );
    let error = service
        .create(create_request(requester_id, recipient_id))
        .await
        .expect_err("deactivated recipient fails");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn create_rejects_duplicate_pending_requests() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_pending_between()
        .withf(move |requester, recipient| {
            *requester == requester_id && *recipient == recipient_id
        })
        .times(1)
        .return_once(move |_, _| Ok(Some(pending_swap(requester_id, recipient_id))));
    swaps.expect_save().times(0);

    let service = SwapCommandService::new(
        Arc::new(active_pair(requester_id, recipient_id)),
        Arc::new(swaps),
        Arc::new(MockSwapNotifier::new()),
        fixture_clock(),
    );
    let error = service
        .create(create_request(requester_id, recipient_id))
        .await
        .expect_err("duplicate pending fails");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.message(),
        "a pending swap request to this member already exists"
    );
}

#[tokio::test]
async fn create_rejects_self_swaps() {
    let member_id = UserId::random();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(Some(member_with_id(member_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_pending_between()
        .returning(|_, _| Ok(None));
    swaps.expect_save().times(0);

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(MockSwapNotifier::new()),
        fixture_clock(),
    );
    let error = service
        .create(create_request(member_id, member_id))
        .await
        .expect_err("self swap fails");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "requester and recipient must differ");
}

#[tokio::test]
async fn create_continues_when_notification_delivery_fails() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_pending_between()
        .returning(|_, _| Ok(None));
    swaps.expect_save().times(1).returning(|_| Ok(()));

    let mut notifier = MockSwapNotifier::new();
    notifier
        .expect_swap_requested()
        .times(1)
        .returning(|_| Err(SwapNotifierError::delivery("webhook returned 500")));

    let service = SwapCommandService::new(
        Arc::new(active_pair(requester_id, recipient_id)),
        Arc::new(swaps),
        Arc::new(notifier),
        fixture_clock(),
    );
    let view = service
        .create(create_request(requester_id, recipient_id))
        .await
        .expect("create survives notifier failure");

    assert_eq!(view.status, SwapStatus::Pending);
}

#[tokio::test]
async fn accept_transitions_a_pending_swap() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = pending_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(recipient_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .withf(move |id| *id == swap_id)
        .return_once(move |_| Ok(Some(swap)));
    swaps
        .expect_update()
        .withf(|swap| swap.status() == SwapStatus::Accepted && swap.updated_at() == fixture_now())
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let view = service
        .accept(AcceptSwapRequest {
            swap_id,
            actor: recipient_id,
            details: AcceptDetails::default(),
        })
        .await
        .expect("accept succeeds");

    assert_eq!(view.status, SwapStatus::Accepted);
}

#[tokio::test]
async fn accept_is_forbidden_for_the_requester() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = pending_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(requester_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps.expect_update().times(0);

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let error = service
        .accept(AcceptSwapRequest {
            swap_id,
            actor: requester_id,
            details: AcceptDetails::default(),
        })
        .await
        .expect_err("requester cannot accept");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "only the recipient may accept a swap request");
}

#[tokio::test]
async fn accept_conflicts_when_the_swap_is_not_pending() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = accepted_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(recipient_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps.expect_update().times(0);

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let error = service
        .accept(AcceptSwapRequest {
            swap_id,
            actor: recipient_id,
            details: AcceptDetails::default(),
        })
        .await
        .expect_err("accepted swap cannot accept again");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.message(),
        "cannot accept a swap request that is accepted"
    );
}

#[tokio::test]
async fn reject_records_the_response_message() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = pending_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(recipient_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps
        .expect_update()
        .withf(|swap| {
            swap.status() == SwapStatus::Rejected
                && swap
                    .response_message()
                    .is_some_and(|message| message.as_ref() == "Sorry, fully booked")
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let view = service
        .reject(RejectSwapRequest {
            swap_id,
            actor: recipient_id,
            response_message: Some(ResponseMessage::new("Sorry, fully booked").expect("valid message")),
        })
        .await
        .expect("reject succeeds");

    assert_eq!(view.status, SwapStatus::Rejected);
    assert_eq!(view.response_message.as_deref(), Some("Sorry, fully booked"));
}

#[tokio::test]
async fn cancel_allows_either_participant() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = accepted_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(requester_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps
        .expect_update()
        .withf(|swap| swap.status() == SwapStatus::Cancelled)
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let view = service
        .cancel(CancelSwapRequest {
            swap_id,
            actor: requester_id,
            reason: None,
        })
        .await
        .expect("cancel succeeds");

    assert_eq!(view.status, SwapStatus::Cancelled);
}

#[tokio::test]
async fn cancel_is_forbidden_for_strangers() {
    let stranger_id = UserId::random();
    let swap = pending_swap(UserId::random(), UserId::random());
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(stranger_id))));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps.expect_update().times(0);

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let error = service
        .cancel(CancelSwapRequest {
            swap_id,
            actor: stranger_id,
            reason: None,
        })
        .await
        .expect_err("strangers cannot cancel");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "only a participant may cancel a swap request");
}

#[tokio::test]
async fn complete_credits_both_participants() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = accepted_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == requester_id)
        .times(2)
        .returning(move |_| Ok(Some(member_with_id(requester_id))));
    users
        .expect_find_by_id()
        .withf(move |id| *id == recipient_id)
        .times(1)
        .returning(move |_| Ok(Some(member_with_id(recipient_id))));
    users
        .expect_update()
        .withf(|member| member.swap_count() == 1 && member.updated_at() == fixture_now())
        .times(2)
        .returning(|_| Ok(()));

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps
        .expect_update()
        .withf(|swap| {
            swap.status() == SwapStatus::Completed && swap.completed_at() == Some(fixture_now())
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let view = service
        .complete(CompleteSwapRequest {
            swap_id,
            actor: requester_id,
        })
        .await
        .expect("complete succeeds");

    assert_eq!(view.status, SwapStatus::Completed);
    assert_eq!(view.completed_at, Some(fixture_now()));
}

#[tokio::test]
async fn complete_returns_the_view_even_if_crediting_fails() {
    let requester_id = UserId::random();
    let recipient_id = UserId::random();
    let swap = accepted_swap(requester_id, recipient_id);
    let swap_id = swap.id();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(member_with_id(id))));
    users
        .expect_update()
        .times(2)
        .returning(|_| Err(UserRepositoryError::query("disk full")));

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    swaps.expect_update().times(1).returning(|_| Ok(()));

    let service = SwapCommandService::new(
        Arc::new(users),
        Arc::new(swaps),
        Arc::new(accepting_notifier()),
        fixture_clock(),
    );
    let view = service
        .complete(CompleteSwapRequest {
            swap_id,
            actor: requester_id,
        })
        .await
        .expect("complete survives crediting failure");

    assert_eq!(view.status, SwapStatus::Completed);
}

#[tokio::test]
async fn get_is_forbidden_for_non_participants() {
    let swap = pending_swap(UserId::random(), UserId::random());
    let swap_id = swap.id();
    let viewer_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == viewer_id)
        .times(1)
        .return_once(move |_| Ok(Some(member_with_id(viewer_id))));

    let service = SwapQueryService::new(Arc::new(swaps), Arc::new(users));
    let error = service
        .get(swap_id, viewer_id)
        .await
        .expect_err("strangers cannot view");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "only a participant may view this swap request");
}

#[tokio::test]
async fn get_serves_admin_viewers() {
    let swap = pending_swap(UserId::random(), UserId::random());
    let swap_id = swap.id();
    let admin_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(swap)));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == admin_id)
        .times(1)
        .return_once(move |_| Ok(Some(admin_with_id(admin_id))));

    let service = SwapQueryService::new(Arc::new(swaps), Arc::new(users));
    let view = service
        .get(swap_id, admin_id)
        .await
        .expect("moderators inspect any swap");

    assert_eq!(view.id, swap_id);
}

#[tokio::test]
async fn get_reports_unknown_swaps_as_missing() {
    let mut swaps = MockSwapRepository::new();
    swaps.expect_find_by_id().returning(|_| Ok(None));

    let service = SwapQueryService::new(Arc::new(swaps), Arc::new(MockUserRepository::new()));
    let swap_id = SwapId::random();
    let error = service
        .get(swap_id, UserId::random())
        .await
        .expect_err("unknown swap fails");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), format!("swap request {swap_id} not found"));
}

#[tokio::test]
async fn list_for_user_maps_swaps_to_views() {
    let member_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_list_for_user()
        .withf(move |id, filter, _| *id == member_id && filter.role == SwapRole::Sent)
        .times(1)
        .return_once(move |_, _, page| {
            Ok(Page::new(
                vec![pending_swap(member_id, UserId::random())],
                page,
                1,
            ))
        });

    let service = SwapQueryService::new(Arc::new(swaps), Arc::new(MockUserRepository::new()));
    let filter = SwapListFilter {
        role: SwapRole::Sent,
        status: None,
    };
    let page = service
        .list_for_user(member_id, filter, PageRequest::default())
        .await
        .expect("list succeeds");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].requester_id, member_id);
    assert_eq!(page.page_info.total_items, 1);
}
