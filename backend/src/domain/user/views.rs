//! Read models derived from the user aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{AvailabilityTag, User, UserId, UserRole};
use crate::domain::rating::RatingSummary;
use crate::domain::skill::SkillDescriptor;

/// Profile fields visible to any member.
///
/// Never carries the email address or credential material.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// Optional location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Optional bio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Optional photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Skills the member offers.
    pub skills_offered: Vec<SkillDescriptor>,
    /// Skills the member wants.
    pub skills_wanted: Vec<SkillDescriptor>,
    /// Availability tags.
    pub availability: Vec<AvailabilityTag>,
    /// Reputation summary.
    pub rating: RatingSummary,
    /// Completed swap count.
    pub swap_count: u32,
    /// Last recorded activity.
    #[schema(value_type = String, format = DateTime)]
    pub last_active_at: DateTime<Utc>,
}

/// Full account view returned to the profile owner and to admins.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
    /// Login identity.
    pub email: String,
    /// Authorisation role.
    pub role: UserRole,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Profile visibility flag.
    pub is_public: bool,
    /// Optional location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Optional bio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Optional photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Skills the member offers.
    pub skills_offered: Vec<SkillDescriptor>,
    /// Skills the member wants.
    pub skills_wanted: Vec<SkillDescriptor>,
    /// Availability tags.
    pub availability: Vec<AvailabilityTag>,
    /// Reputation summary.
    pub rating: RatingSummary,
    /// Completed swap count.
    pub swap_count: u32,
    /// Last recorded activity.
    #[schema(value_type = String, format = DateTime)]
    pub last_active_at: DateTime<Utc>,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Project the member into the public profile shape.
    #[must_use]
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id(),
            display_name: self.display_name().as_ref().to_owned(),
            location: self.location().map(|value| value.as_ref().to_owned()),
            bio: self.bio().map(|value| value.as_ref().to_owned()),
            photo_url: self.photo_url().map(|value| value.as_ref().to_owned()),
            skills_offered: self.skills_offered().to_vec(),
            skills_wanted: self.skills_wanted().to_vec(),
            availability: self.availability().to_vec(),
            rating: self.rating(),
            swap_count: self.swap_count(),
            last_active_at: self.last_active_at(),
        }
    }

    /// Project the member into the owner-facing account shape.
    #[must_use]
    pub fn account_view(&self) -> AccountView {
        AccountView {
            id: self.id(),
            display_name: self.display_name().as_ref().to_owned(),
            email: self.email().as_ref().to_owned(),
            role: self.role(),
            is_active: self.is_active(),
            is_public: self.is_public(),
            location: self.location().map(|value| value.as_ref().to_owned()),
            bio: self.bio().map(|value| value.as_ref().to_owned()),
            photo_url: self.photo_url().map(|value| value.as_ref().to_owned()),
            skills_offered: self.skills_offered().to_vec(),
            skills_wanted: self.skills_wanted().to_vec(),
            availability: self.availability().to_vec(),
            rating: self.rating(),
            swap_count: self.swap_count(),
            last_active_at: self.last_active_at(),
            created_at: self.created_at(),
            updated_at: self.updated_at(),
        }
    }
}
