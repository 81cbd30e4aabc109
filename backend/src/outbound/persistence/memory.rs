//! In-memory repository adapters.
//!
//! These mirror the PostgreSQL adapters' observable behaviour over plain
//! hash maps: the same filter semantics, the same newest-first ordering and
//! the same typed duplicate errors. They back the development mode that runs
//! without a database and the end-to-end suites that exercise the full HTTP
//! stack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    AdminUserFilter, DirectoryFilter, RatingRepository, RatingRepositoryError, RatingTotals,
    SwapListFilter, SwapRepository, SwapRepositoryError, SwapRole, SwapTotals, UserRepository,
    UserRepositoryError,
};
use crate::domain::rating::{Rating, RatingId, RatingScore};
use crate::domain::reporting::ReportWindow;
use crate::domain::swap::{SwapId, SwapRequest, SwapStatus};
use crate::domain::{EmailAddress, SkillDescriptor, User, UserId};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Slice one page out of a pre-sorted listing.
fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let slice = items
        .get(start..)
        .map(|rest| rest.iter().take(limit).cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    Page::new(slice, page, total)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Hash-map backed implementation of the user repository port.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_newest_first(&self) -> Vec<User> {
        let mut users: Vec<User> = lock(&self.users).values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        users
    }
}

fn matches_directory(user: &User, filter: &DirectoryFilter) -> bool {
    if !user.is_active() || !user.is_public() {
        return false;
    }
    let skill_names = || {
        user.skills_offered()
            .iter()
            .chain(user.skills_wanted().iter())
            .map(SkillDescriptor::name)
    };
    if let Some(text) = &filter.text {
        let hit = contains_ci(&user.display_name().to_string(), text)
            || skill_names().any(|name| contains_ci(name, text))
            || user
                .location()
                .is_some_and(|there| contains_ci(&String::from(there.clone()), text));
        if !hit {
            return false;
        }
    }
    if let Some(skill) = &filter.skill
        && !skill_names().any(|name| contains_ci(name, skill))
    {
        return false;
    }
    if let Some(location) = &filter.location {
        let hit = user
            .location()
            .is_some_and(|there| contains_ci(&String::from(there.clone()), location));
        if !hit {
            return false;
        }
    }
    if let Some(tag) = filter.availability
        && !user.availability().contains(&tag)
    {
        return false;
    }
    true
}

fn matches_accounts(user: &User, filter: &AdminUserFilter) -> bool {
    if let Some(search) = &filter.search {
        let hit = contains_ci(&user.display_name().to_string(), search)
            || contains_ci(&user.email().to_string(), search);
        if !hit {
            return false;
        }
    }
    filter.active.is_none_or(|active| user.is_active() == active)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = lock(&self.users);
        let duplicate = users
            .values()
            .any(|existing| existing.email() == user.email() && existing.id() != user.id());
        if duplicate {
            return Err(UserRepositoryError::duplicate_email(user.email().to_string()));
        }
        users.insert(*user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.save(user).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(lock(&self.users).get(id.as_uuid()).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(lock(&self.users)
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn search_directory(
        &self,
        filter: &DirectoryFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let matches: Vec<User> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|user| matches_directory(user, filter))
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn search_accounts(
        &self,
        filter: &AdminUserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let matches: Vec<User> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|user| matches_accounts(user, filter))
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn count_active(&self) -> Result<u64, UserRepositoryError> {
        let active = lock(&self.users)
            .values()
            .filter(|user| user.is_active())
            .count();
        Ok(u64::try_from(active).unwrap_or(u64::MAX))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self
            .sorted_newest_first()
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn created_timestamps(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<DateTime<Utc>>, UserRepositoryError> {
        Ok(lock(&self.users)
            .values()
            .map(User::created_at)
            .filter(|at| window.contains(*at))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Swap requests
// ---------------------------------------------------------------------------

/// Hash-map backed implementation of the swap repository port.
#[derive(Debug, Default, Clone)]
pub struct MemorySwapRepository {
    swaps: Arc<Mutex<HashMap<Uuid, SwapRequest>>>,
}

impl MemorySwapRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_newest_first(&self) -> Vec<SwapRequest> {
        let mut swaps: Vec<SwapRequest> = lock(&self.swaps).values().cloned().collect();
        swaps.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        swaps
    }
}

fn matches_role(swap: &SwapRequest, user_id: UserId, role: SwapRole) -> bool {
    match role {
        SwapRole::Sent => swap.requester_id() == user_id,
        SwapRole::Received => swap.recipient_id() == user_id,
        SwapRole::Either => swap.requester_id() == user_id || swap.recipient_id() == user_id,
    }
}

#[async_trait]
impl SwapRepository for MemorySwapRepository {
    async fn save(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        lock(&self.swaps).insert(*swap.id().as_uuid(), swap.clone());
        Ok(())
    }

    async fn update(&self, swap: &SwapRequest) -> Result<(), SwapRepositoryError> {
        self.save(swap).await
    }

    async fn find_by_id(&self, id: SwapId) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        Ok(lock(&self.swaps).get(id.as_uuid()).cloned())
    }

    async fn find_pending_between(
        &self,
        requester_id: UserId,
        recipient_id: UserId,
    ) -> Result<Option<SwapRequest>, SwapRepositoryError> {
        Ok(lock(&self.swaps)
            .values()
            .find(|swap| {
                swap.requester_id() == requester_id
                    && swap.recipient_id() == recipient_id
                    && swap.status() == SwapStatus::Pending
            })
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: SwapListFilter,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        let matches: Vec<SwapRequest> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|swap| matches_role(swap, user_id, filter.role))
            .filter(|swap| filter.status.is_none_or(|status| swap.status() == status))
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn list_all(
        &self,
        status: Option<SwapStatus>,
        page: PageRequest,
    ) -> Result<Page<SwapRequest>, SwapRepositoryError> {
        let matches: Vec<SwapRequest> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|swap| status.is_none_or(|wanted| swap.status() == wanted))
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn totals(&self) -> Result<SwapTotals, SwapRepositoryError> {
        let swaps = lock(&self.swaps);
        let mut totals = SwapTotals::default();
        for swap in swaps.values() {
            totals.total += 1;
            match swap.status() {
                SwapStatus::Pending => totals.pending += 1,
                SwapStatus::Accepted => totals.accepted += 1,
                SwapStatus::Rejected => totals.rejected += 1,
                SwapStatus::Completed => totals.completed += 1,
                SwapStatus::Cancelled => totals.cancelled += 1,
            }
        }
        Ok(totals)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<SwapRequest>, SwapRepositoryError> {
        Ok(self
            .sorted_newest_first()
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn status_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(SwapStatus, DateTime<Utc>)>, SwapRepositoryError> {
        Ok(lock(&self.swaps)
            .values()
            .filter(|swap| window.contains(swap.created_at()))
            .map(|swap| (swap.status(), swap.created_at()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Hash-map backed implementation of the rating repository port.
#[derive(Debug, Default, Clone)]
pub struct MemoryRatingRepository {
    ratings: Arc<Mutex<HashMap<Uuid, Rating>>>,
}

impl MemoryRatingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_newest_first(&self) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = lock(&self.ratings).values().cloned().collect();
        ratings.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        ratings
    }
}

#[async_trait]
impl RatingRepository for MemoryRatingRepository {
    async fn save(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        let mut ratings = lock(&self.ratings);
        let duplicate = ratings.values().any(|existing| {
            existing.swap_id() == rating.swap_id()
                && existing.rater_id() == rating.rater_id()
                && existing.id() != rating.id()
        });
        if duplicate {
            return Err(RatingRepositoryError::duplicate_rating(rating.swap_id()));
        }
        ratings.insert(*rating.id().as_uuid(), rating.clone());
        Ok(())
    }

    async fn update(&self, rating: &Rating) -> Result<(), RatingRepositoryError> {
        self.save(rating).await
    }

    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(lock(&self.ratings).get(id.as_uuid()).cloned())
    }

    async fn find_for_swap_and_rater(
        &self,
        swap_id: SwapId,
        rater_id: UserId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(lock(&self.ratings)
            .values()
            .find(|rating| rating.swap_id() == swap_id && rating.rater_id() == rater_id)
            .cloned())
    }

    async fn scores_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RatingScore>, RatingRepositoryError> {
        Ok(lock(&self.ratings)
            .values()
            .filter(|rating| rating.rated_user_id() == user_id)
            .map(Rating::score)
            .collect())
    }

    async fn list_received(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        let matches: Vec<Rating> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|rating| rating.rated_user_id() == user_id)
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn recent_received(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Rating>, RatingRepositoryError> {
        Ok(self
            .sorted_newest_first()
            .into_iter()
            .filter(|rating| rating.rated_user_id() == user_id)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn list_all(
        &self,
        flagged: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Rating>, RatingRepositoryError> {
        let matches: Vec<Rating> = self
            .sorted_newest_first()
            .into_iter()
            .filter(|rating| flagged.is_none_or(|wanted| rating.flagged() == wanted))
            .collect();
        Ok(paginate(&matches, page))
    }

    async fn totals(&self) -> Result<RatingTotals, RatingRepositoryError> {
        let ratings = lock(&self.ratings);
        let count = u64::try_from(ratings.len()).unwrap_or(u64::MAX);
        let score_sum = ratings
            .values()
            .map(|rating| u64::from(rating.score().value()))
            .sum();
        Ok(RatingTotals { count, score_sum })
    }

    async fn score_timeline(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<(RatingScore, DateTime<Utc>)>, RatingRepositoryError> {
        Ok(lock(&self.ratings)
            .values()
            .filter(|rating| window.contains(rating.created_at()))
            .map(|rating| (rating.score(), rating.created_at()))
            .collect())
    }
}
