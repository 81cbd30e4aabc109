//! Tests for report folding and broadcast validation.

use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;
use uuid::Uuid;

use super::*;

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[rstest]
#[case(0, 0, 0.0)]
#[case(9, 2, 4.5)]
#[case(13, 3, 4.3)]
#[case(25, 5, 5.0)]
#[case(4, 3, 1.3)]
fn one_decimal_average_rounds_to_one_decimal(
    #[case] total: u64,
    #[case] count: u64,
    #[case] expected: f64,
) {
    let average = one_decimal_average(total, count);
    assert!(
        (average - expected).abs() < f64::EPSILON,
        "expected {expected}, got {average}"
    );
}

#[rstest]
fn month_buckets_are_newest_first_and_capped() {
    let mut timestamps = Vec::new();
    for month_offset in 0..14_u32 {
        let year = 2023 + i32::try_from(month_offset / 12).unwrap_or_default();
        let month = month_offset % 12 + 1;
        timestamps.push(at(year, month, 3));
        timestamps.push(at(year, month, 17));
    }

    let buckets = fold_month_buckets(&timestamps);

    assert_eq!(buckets.len(), DASHBOARD_MONTH_BUCKETS);
    let newest = buckets.first().expect("buckets are non-empty");
    assert_eq!((newest.year, newest.month, newest.count), (2024, 2, 2));
    let oldest = buckets.last().expect("buckets are non-empty");
    assert_eq!((oldest.year, oldest.month), (2023, 3), "older months fall off");
}

#[rstest]
fn day_buckets_are_ascending() {
    let buckets = fold_day_buckets(&[
        at(2024, 3, 9),
        at(2024, 3, 1),
        at(2024, 3, 9),
        at(2023, 12, 31),
    ]);

    assert_eq!(
        buckets,
        vec![
            DayBucket {
                year: 2023,
                month: 12,
                day: 31,
                count: 1
            },
            DayBucket {
                year: 2024,
                month: 3,
                day: 1,
                count: 1
            },
            DayBucket {
                year: 2024,
                month: 3,
                day: 9,
                count: 2
            },
        ]
    );
}

#[rstest]
fn status_month_buckets_group_by_status_within_a_month() {
    let buckets = fold_status_month_buckets(&[
        (SwapStatus::Pending, at(2024, 4, 2)),
        (SwapStatus::Completed, at(2024, 4, 9)),
        (SwapStatus::Pending, at(2024, 4, 20)),
        (SwapStatus::Pending, at(2024, 5, 1)),
    ]);

    assert_eq!(buckets.len(), 3);
    assert_eq!(
        buckets.first(),
        Some(&StatusMonthBucket {
            status: SwapStatus::Pending,
            year: 2024,
            month: 4,
            count: 2
        })
    );
    assert_eq!(
        buckets.last(),
        Some(&StatusMonthBucket {
            status: SwapStatus::Pending,
            year: 2024,
            month: 5,
            count: 1
        })
    );
}

#[rstest]
fn score_month_buckets_group_by_score_within_a_month() {
    let buckets = fold_score_month_buckets(&[
        (5, at(2024, 4, 2)),
        (1, at(2024, 4, 9)),
        (5, at(2024, 4, 20)),
    ]);

    assert_eq!(
        buckets,
        vec![
            ScoreMonthBucket {
                score: 1,
                year: 2024,
                month: 4,
                count: 1
            },
            ScoreMonthBucket {
                score: 5,
                year: 2024,
                month: 4,
                count: 2
            },
        ]
    );
}

#[rstest]
#[case("all", ReportKind::All)]
#[case("users", ReportKind::Users)]
#[case("swaps", ReportKind::Swaps)]
#[case("ratings", ReportKind::Ratings)]
fn report_kind_round_trips_through_strings(#[case] text: &str, #[case] kind: ReportKind) {
    assert_eq!(text.parse::<ReportKind>(), Ok(kind));
    assert_eq!(kind.to_string(), text);
}

#[rstest]
fn report_kind_gates_each_series() {
    assert!(ReportKind::All.includes_users());
    assert!(ReportKind::All.includes_swaps());
    assert!(ReportKind::All.includes_ratings());
    assert!(ReportKind::Users.includes_users());
    assert!(!ReportKind::Users.includes_swaps());
    assert!(!ReportKind::Swaps.includes_ratings());
    assert!(ReportKind::Ratings.includes_ratings());
}

#[rstest]
fn report_window_bounds_are_inclusive() {
    let window = ReportWindow {
        from: Some(at(2024, 1, 1)),
        to: Some(at(2024, 6, 30)),
    };
    assert!(window.contains(at(2024, 1, 1)));
    assert!(window.contains(at(2024, 6, 30)));
    assert!(!window.contains(at(2023, 12, 31)));
    assert!(!window.contains(at(2024, 7, 1)));

    let unbounded = ReportWindow::default();
    assert!(unbounded.contains(at(1999, 1, 1)));
}

#[rstest]
fn broadcast_draft_rejects_blank_fields() {
    assert_eq!(
        BroadcastDraft::try_from_parts("  ", "body", None),
        Err(BroadcastValidationError::EmptyTitle)
    );
    assert_eq!(
        BroadcastDraft::try_from_parts("title", "", None),
        Err(BroadcastValidationError::EmptyBody)
    );
}

#[rstest]
#[case(None, "info")]
#[case(Some("  "), "info")]
#[case(Some("maintenance"), "maintenance")]
fn broadcast_kind_defaults_to_info(#[case] kind: Option<&str>, #[case] expected: &str) {
    let draft =
        BroadcastDraft::try_from_parts("Scheduled downtime", "Back at noon.", kind)
            .expect("valid draft");
    assert_eq!(draft.kind(), expected);
}

#[rstest]
fn broadcast_receipt_echoes_the_draft() {
    let sender = UserId::from_uuid(Uuid::from_u128(9));
    let receipt = BroadcastDraft::try_from_parts("Welcome", "Trade kindly.", Some("info"))
        .expect("valid draft")
        .into_receipt(sender, at(2024, 8, 1));

    assert_eq!(receipt.title, "Welcome");
    assert_eq!(receipt.body, "Trade kindly.");
    assert_eq!(receipt.sent_by, sender);
    assert_eq!(receipt.sent_at, at(2024, 8, 1));

    let rendered = serde_json::to_value(&receipt).expect("receipt serialises");
    assert_eq!(rendered["sentBy"], serde_json::json!(sender.to_string()));
}

#[rstest]
fn activity_report_omits_absent_series() {
    let report = ActivityReport {
        user_activity: Some(Vec::new()),
        ..ActivityReport::default()
    };
    let rendered = serde_json::to_value(&report).expect("report serialises");
    assert!(rendered.get("userActivity").is_some());
    assert!(rendered.get("swapActivity").is_none());
    assert!(rendered.get("ratingActivity").is_none());
}
