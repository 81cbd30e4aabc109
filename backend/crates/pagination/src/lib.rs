//! Page/limit pagination primitives shared by backend list endpoints.
//!
//! Endpoints accept 1-indexed `page`/`limit` query parameters and respond
//! with a [`Page`] envelope carrying the items plus [`PageInfo`] metadata.
//! Validation happens once, at [`PageRequest`] construction, so handlers and
//! repositories can rely on the invariants instead of re-checking bounds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page number used when the caller omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound on `limit`; larger requests are rejected rather than clamped
/// so callers learn about the cap instead of silently receiving fewer rows.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero; pages are 1-indexed.
    #[error("page must be at least 1")]
    ZeroPage,
    /// `limit` was zero; an empty page is never useful.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// `limit` exceeded [`MAX_LIMIT`].
    #[error("limit must not exceed {max}, got {limit}")]
    LimitTooLarge {
        /// Requested page size.
        limit: u32,
        /// Maximum page size served.
        max: u32,
    },
}

/// Validated 1-indexed pagination window.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_LIMIT`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_params(Some(2), None).unwrap();
/// assert_eq!(request.page(), 2);
/// assert_eq!(request.limit(), pagination::DEFAULT_LIMIT);
/// assert_eq!(request.offset(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Construct a window from explicit values.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when either value is zero or `limit`
    /// exceeds [`MAX_LIMIT`].
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    /// Construct a window from optional query parameters, applying defaults
    /// for the missing ones.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when a supplied value is out of range.
    pub const fn from_params(
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip, as the `i64` SQL offsets expect.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Page size as the `i64` SQL limits expect.
    #[must_use]
    pub const fn limit_i64(&self) -> i64 {
        self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned alongside every page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-indexed page this envelope holds.
    pub current_page: u32,
    /// Total number of pages at the requested limit.
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Whether an earlier page exists.
    pub has_prev_page: bool,
}

impl PageInfo {
    /// Derive metadata for `request` given the matching item count.
    #[must_use]
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(request.limit()));
        Self {
            current_page: request.page(),
            total_pages,
            total_items,
            has_next_page: u64::from(request.page()) < total_pages,
            has_prev_page: request.page() > DEFAULT_PAGE,
        }
    }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items within the requested window, already ordered.
    pub items: Vec<T>,
    /// Position of this window within the full result set.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Assemble a page from a windowed item slice and the full-set count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page_info: PageInfo::new(request, total_items),
        }
    }

    /// Map the items into another representation, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, DEFAULT_PAGE, DEFAULT_LIMIT)]
    #[case(Some(3), None, 3, DEFAULT_LIMIT)]
    #[case(None, Some(25), DEFAULT_PAGE, 25)]
    #[case(Some(2), Some(MAX_LIMIT), 2, MAX_LIMIT)]
    fn from_params_applies_defaults(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::from_params(page, limit).expect("valid params");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::ZeroPage)]
    #[case(None, Some(0), PageRequestError::ZeroLimit)]
    #[case(None, Some(MAX_LIMIT + 1), PageRequestError::LimitTooLarge { limit: MAX_LIMIT + 1, max: MAX_LIMIT })]
    fn from_params_rejects_out_of_range(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::from_params(page, limit).expect_err("params must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    fn offset_skips_earlier_pages(#[case] page: u32, #[case] limit: u32, #[case] expected: i64) {
        let request = PageRequest::new(page, limit).expect("valid request");
        assert_eq!(request.offset(), expected);
    }

    #[rstest]
    #[case(1, 10, 0, 0, false, false)]
    #[case(1, 10, 25, 3, true, false)]
    #[case(3, 10, 25, 3, false, true)]
    #[case(2, 10, 30, 3, true, true)]
    fn page_info_reports_navigation(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] total_items: u64,
        #[case] total_pages: u64,
        #[case] has_next: bool,
        #[case] has_prev: bool,
    ) {
        let request = PageRequest::new(page, limit).expect("valid request");
        let info = PageInfo::new(request, total_items);
        assert_eq!(info.total_pages, total_pages);
        assert_eq!(info.has_next_page, has_next);
        assert_eq!(info.has_prev_page, has_prev);
    }

    #[rstest]
    fn page_map_preserves_metadata() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let page = Page::new(vec![1_u32, 2], request, 5);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1".to_owned(), "2".to_owned()]);
        assert_eq!(mapped.page_info.current_page, 2);
        assert_eq!(mapped.page_info.total_pages, 3);
    }

    #[rstest]
    fn page_serializes_camel_case() {
        let request = PageRequest::default();
        let page = Page::new(vec!["a"], request, 1);
        let json = serde_json::to_value(&page).expect("serializable page");
        let info = json.get("pageInfo").expect("pageInfo field");
        assert_eq!(
            info.get("currentPage").and_then(serde_json::Value::as_u64),
            Some(1)
        );
        assert_eq!(
            info.get("hasNextPage").and_then(serde_json::Value::as_bool),
            Some(false)
        );
    }
}
