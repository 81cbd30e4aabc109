//! Tests for the admin services.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockRatingRepository, MockSwapRepository, MockUserRepository, RatingTotals, SwapTotals,
};
use crate::domain::rating::{
    FlagReason, NewRating, Rating, RatingId, RatingScore, RatingSummary, SubScores,
};
use crate::domain::reporting::BroadcastDraft;
use crate::domain::skill::{SkillDescriptor, SkillDraft};
use crate::domain::swap::{MeetingPlan, NewSwapRequest, SwapId, SwapRequest};
use crate::domain::user::{
    CredentialHash, DisplayName, EmailAddress, NewUser, User, UserRole, UserSnapshot,
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

fn pending_swap() -> SwapRequest {
    SwapRequest::new(NewSwapRequest {
        id: SwapId::random(),
        requester_id: UserId::random(),
        recipient_id: UserId::random(),
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

fn unflagged_rating() -> Rating {
    Rating::new(NewRating {
        id: RatingId::random(),
        swap_id: SwapId::random(),
        rater_id: UserId::random(),
        rated_user_id: UserId::random(),
        score: RatingScore::new(2).expect("valid score"),
        comment: None,
        sub_scores: SubScores::default(),
        would_recommend: false,
        now: registered_at(),
    })
}

/// User repository that resolves the actor as an admin account.
fn admin_session(admin_id: UserId) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == admin_id)
        .returning(move |_| Ok(Some(admin_with_id(admin_id))));
    users
}

#[tokio::test]
async fn set_user_active_requires_the_admin_role() {
    let actor = UserId::random();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(actor))));
    users.expect_update().times(0);

    let service = AdminCommandService::new(
        Arc::new(users),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let error = service
        .set_user_active(SetUserStatusRequest {
            actor,
            user_id: UserId::random(),
            active: false,
        })
        .await
        .expect_err("regular members cannot moderate");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "administrator access required");
}

#[tokio::test]
async fn set_user_active_rejects_stale_sessions() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let service = AdminCommandService::new(
        Arc::new(users),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let error = service
        .set_user_active(SetUserStatusRequest {
            actor: UserId::random(),
            user_id: UserId::random(),
            active: false,
        })
        .await
        .expect_err("stale session fails");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn set_user_active_rejects_self_changes() {
    let admin_id = UserId::random();

    let mut users = admin_session(admin_id);
    users.expect_update().times(0);

    let service = AdminCommandService::new(
        Arc::new(users),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let error = service
        .set_user_active(SetUserStatusRequest {
            actor: admin_id,
            user_id: admin_id,
            active: false,
        })
        .await
        .expect_err("self change fails");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "cannot change your own account status");
}

#[tokio::test]
async fn set_user_active_deactivates_the_target() {
    let admin_id = UserId::random();
    let target_id = UserId::random();

    let mut users = admin_session(admin_id);
    users
        .expect_find_by_id()
        .withf(move |id| *id == target_id)
        .return_once(move |_| Ok(Some(member_with_id(target_id))));
    users
        .expect_update()
        .withf(|member| !member.is_active() && member.updated_at() == fixture_now())
        .times(1)
        .returning(|_| Ok(()));

    let service = AdminCommandService::new(
        Arc::new(users),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let account = service
        .set_user_active(SetUserStatusRequest {
            actor: admin_id,
            user_id: target_id,
            active: false,
        })
        .await
        .expect("status change succeeds");

    assert_eq!(account.id, target_id);
    assert!(!account.is_active);
}

#[tokio::test]
async fn set_user_active_reports_unknown_targets() {
    let admin_id = UserId::random();
    let target_id = UserId::random();

    let mut users = admin_session(admin_id);
    users
        .expect_find_by_id()
        .withf(move |id| *id == target_id)
        .returning(|_| Ok(None));

    let service = AdminCommandService::new(
        Arc::new(users),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let error = service
        .set_user_active(SetUserStatusRequest {
            actor: admin_id,
            user_id: target_id,
            active: true,
        })
        .await
        .expect_err("unknown target fails");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), format!("member {target_id} not found"));
}

#[tokio::test]
async fn set_rating_flag_marks_the_rating() {
    let admin_id = UserId::random();
    let rating = unflagged_rating();
    let rating_id = rating.id();

    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_id()
        .withf(move |id| *id == rating_id)
        .return_once(move |_| Ok(Some(rating)));
    ratings
        .expect_update()
        .withf(|rating| {
            rating.flagged()
                && rating
                    .flag_reason()
                    .is_some_and(|reason| reason.as_ref() == "Offensive language")
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = AdminCommandService::new(
        Arc::new(admin_session(admin_id)),
        Arc::new(ratings),
        fixture_clock(),
    );
    let view = service
        .set_rating_flag(SetRatingFlagRequest {
            actor: admin_id,
            rating_id,
            flagged: true,
            reason: Some(FlagReason::new("Offensive language").expect("valid reason")),
        })
        .await
        .expect("flag succeeds");

    assert!(view.flagged);
    assert_eq!(view.flag_reason.as_deref(), Some("Offensive language"));
}

#[tokio::test]
async fn set_rating_flag_reports_unknown_ratings() {
    let admin_id = UserId::random();

    let mut ratings = MockRatingRepository::new();
    ratings.expect_find_by_id().returning(|_| Ok(None));

    let service = AdminCommandService::new(
        Arc::new(admin_session(admin_id)),
        Arc::new(ratings),
        fixture_clock(),
    );
    let rating_id = RatingId::random();
    let error = service
        .set_rating_flag(SetRatingFlagRequest {
            actor: admin_id,
            rating_id,
            flagged: true,
            reason: None,
        })
        .await
        .expect_err("unknown rating fails");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), format!("rating {rating_id} not found"));
}

#[tokio::test]
async fn broadcast_returns_a_stamped_receipt() {
    let admin_id = UserId::random();

    let service = AdminCommandService::new(
        Arc::new(admin_session(admin_id)),
        Arc::new(MockRatingRepository::new()),
        fixture_clock(),
    );
    let draft = BroadcastDraft::try_from_parts("Scheduled maintenance", "Back at noon", None)
        .expect("valid draft");
    let receipt = service
        .broadcast(BroadcastRequest {
            actor: admin_id,
            draft,
        })
        .await
        .expect("broadcast succeeds");

    assert_eq!(receipt.title, "Scheduled maintenance");
    assert_eq!(receipt.kind, "info");
    assert_eq!(receipt.sent_by, admin_id);
    assert_eq!(receipt.sent_at, fixture_now());
}

#[tokio::test]
async fn dashboard_assembles_totals_and_recent_activity() {
    let admin_id = UserId::random();

    let mut users = admin_session(admin_id);
    users.expect_count_active().returning(|| Ok(7));
    users
        .expect_recent()
        .withf(|limit| *limit == DASHBOARD_RECENT_LIMIT)
        .returning(|_| Ok(vec![member_with_id(UserId::random())]));

    let mut swaps = MockSwapRepository::new();
    swaps.expect_totals().returning(|| {
        Ok(SwapTotals {
            total: 4,
            pending: 1,
            accepted: 1,
            rejected: 0,
            completed: 2,
            cancelled: 0,
        })
    });
    swaps
        .expect_recent()
        .withf(|limit| *limit == DASHBOARD_RECENT_LIMIT)
        .returning(|_| Ok(vec![pending_swap()]));
    swaps
        .expect_status_timeline()
        .returning(|_| {
            Ok(vec![
                (SwapStatus::Pending, registered_at()),
                (SwapStatus::Completed, registered_at()),
            ])
        });

    let mut ratings = MockRatingRepository::new();
    ratings.expect_totals().returning(|| {
        Ok(RatingTotals {
            count: 2,
            score_sum: 9,
        })
    });

    let service = AdminQueryService::new(Arc::new(users), Arc::new(swaps), Arc::new(ratings));
    let snapshot = service.dashboard(admin_id).await.expect("dashboard succeeds");

    assert_eq!(snapshot.stats.total_users, 7);
    assert_eq!(snapshot.stats.total_swaps, 4);
    assert_eq!(snapshot.stats.completed_swaps, 2);
    assert_eq!(snapshot.stats.pending_swaps, 1);
    assert_eq!(snapshot.stats.total_ratings, 2);
    assert_eq!(snapshot.stats.average_rating, 4.5);
    assert_eq!(snapshot.recent_users.len(), 1);
    assert_eq!(snapshot.recent_users[0].email, "ada@example.com");
    assert_eq!(snapshot.recent_swaps.len(), 1);
    assert_eq!(snapshot.monthly_swaps.len(), 1);
    assert_eq!(snapshot.monthly_swaps[0].count, 2);
}

#[tokio::test]
async fn dashboard_requires_the_admin_role() {
    let actor = UserId::random();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(member_with_id(actor))));

    let service = AdminQueryService::new(
        Arc::new(users),
        Arc::new(MockSwapRepository::new()),
        Arc::new(MockRatingRepository::new()),
    );
    let error = service
        .dashboard(actor)
        .await
        .expect_err("regular members cannot view the dashboard");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "administrator access required");
}

#[tokio::test]
async fn list_users_projects_accounts() {
    let admin_id = UserId::random();

    let mut users = admin_session(admin_id);
    users
        .expect_search_accounts()
        .withf(|filter, _| filter.search.as_deref() == Some("ada") && filter.active == Some(true))
        .times(1)
        .return_once(|_, page| Ok(Page::new(vec![member_with_id(UserId::random())], page, 1)));

    let service = AdminQueryService::new(
        Arc::new(users),
        Arc::new(MockSwapRepository::new()),
        Arc::new(MockRatingRepository::new()),
    );
    let filter = AdminUserFilter {
        search: Some("ada".to_owned()),
        active: Some(true),
    };
    let page = service
        .list_users(admin_id, filter, PageRequest::default())
        .await
        .expect("list succeeds");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].email, "ada@example.com");
}

#[tokio::test]
async fn list_ratings_filters_flagged_entries() {
    let admin_id = UserId::random();

    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_list_all()
        .withf(|flagged, _| *flagged == Some(true))
        .times(1)
        .return_once(|_, page| {
            Ok(Page::new(
                vec![unflagged_rating().with_flag(true, None)],
                page,
                1,
            ))
        });

    let service = AdminQueryService::new(
        Arc::new(admin_session(admin_id)),
        Arc::new(MockSwapRepository::new()),
        Arc::new(ratings),
    );
    let page = service
        .list_ratings(admin_id, Some(true), PageRequest::default())
        .await
        .expect("list succeeds");

    assert_eq!(page.items.len(), 1);
    assert!(page.items[0].flagged);
}

#[tokio::test]
async fn activity_report_honours_the_requested_kind() {
    let admin_id = UserId::random();

    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_status_timeline()
        .times(1)
        .returning(|_| Ok(vec![(SwapStatus::Pending, registered_at())]));

    let service = AdminQueryService::new(
        Arc::new(admin_session(admin_id)),
        Arc::new(swaps),
        Arc::new(MockRatingRepository::new()),
    );
    let report = service
        .activity_report(admin_id, ReportWindow::default(), ReportKind::Swaps)
        .await
        .expect("report succeeds");

    assert!(report.user_activity.is_none());
    assert!(report.rating_activity.is_none());
    let swap_activity = report.swap_activity.expect("swap series present");
    assert_eq!(swap_activity.len(), 1);
}

#[tokio::test]
async fn activity_report_includes_every_series_by_default() {
    let admin_id = UserId::random();

    let mut users = admin_session(admin_id);
    users
        .expect_created_timestamps()
        .times(1)
        .returning(|_| Ok(vec![registered_at()]));
    let mut swaps = MockSwapRepository::new();
    swaps
        .expect_status_timeline()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let mut ratings = MockRatingRepository::new();
    ratings.expect_score_timeline().times(1).returning(|_| {
        Ok(vec![(
            RatingScore::new(4).expect("valid score"),
            registered_at(),
        )])
    });

    let service = AdminQueryService::new(Arc::new(users), Arc::new(swaps), Arc::new(ratings));
    let report = service
        .activity_report(admin_id, ReportWindow::default(), ReportKind::All)
        .await
        .expect("report succeeds");

    assert_eq!(report.user_activity.expect("user series").len(), 1);
    assert!(report.swap_activity.expect("swap series").is_empty());
    assert_eq!(report.rating_activity.expect("rating series").len(), 1);
}
