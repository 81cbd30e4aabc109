//! Behaviour tests for the pagination envelope.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::{Cell, RefCell};

use pagination::{MAX_LIMIT, Page, PageRequest, PageRequestError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Default)]
struct PaginationWorld {
    total_items: Cell<u64>,
    page: RefCell<Option<Page<u64>>>,
    rejection: RefCell<Option<PageRequestError>>,
}

#[fixture]
fn world() -> PaginationWorld {
    PaginationWorld::default()
}

#[given("a result set of 25 items")]
fn a_result_set_of_25_items(world: &PaginationWorld) {
    world.total_items.set(25);
}

#[when("the first page is requested with a limit of 10")]
fn the_first_page_is_requested_with_a_limit_of_10(world: &PaginationWorld) {
    let request = PageRequest::new(1, 10).expect("valid request");
    let items = (0..u64::from(request.limit())).collect();
    world
        .page
        .replace(Some(Page::new(items, request, world.total_items.get())));
}

#[when("a page is requested with a limit above the cap")]
fn a_page_is_requested_with_a_limit_above_the_cap(world: &PaginationWorld) {
    let err = PageRequest::new(1, MAX_LIMIT + 1).expect_err("limit above cap must fail");
    world.rejection.replace(Some(err));
}

#[then("the envelope reports 3 total pages")]
fn the_envelope_reports_3_total_pages(world: &PaginationWorld) {
    let page = world.page.borrow();
    let info = page.as_ref().expect("page envelope").page_info;
    assert_eq!(info.total_pages, 3);
    assert_eq!(info.total_items, 25);
}

#[then("the envelope offers a next page but no previous page")]
fn the_envelope_offers_a_next_page_but_no_previous_page(world: &PaginationWorld) {
    let page = world.page.borrow();
    let info = page.as_ref().expect("page envelope").page_info;
    assert!(info.has_next_page);
    assert!(!info.has_prev_page);
}

#[then("the request is rejected for exceeding the limit cap")]
fn the_request_is_rejected_for_exceeding_the_limit_cap(world: &PaginationWorld) {
    let rejection = world.rejection.borrow();
    assert_eq!(
        rejection.as_ref(),
        Some(&PageRequestError::LimitTooLarge {
            limit: MAX_LIMIT + 1,
            max: MAX_LIMIT,
        })
    );
}

#[scenario(path = "tests/features/page_envelope.feature")]
fn page_envelope_scenarios(world: PaginationWorld) {
    drop(world);
}
