//! User profiles and their validated building blocks.
//!
//! Purpose: represent marketplace members with validated identity, profile,
//! and reputation state. Adapters construct the newtypes here from raw input
//! so invalid data never reaches services or persistence.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::rating::RatingSummary;
use super::skill::SkillDescriptor;

mod views;

pub use views::{AccountView, PublicProfile};

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 2;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 50;
/// Maximum allowed length for a profile location.
pub const LOCATION_MAX: usize = 100;
/// Maximum allowed length for a profile bio.
pub const BIO_MAX: usize = 500;
/// Maximum allowed length for a profile photo URL.
pub const PHOTO_URL_MAX: usize = 2048;

/// Validation errors returned by the profile constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The display name was empty once trimmed.
    EmptyDisplayName,
    /// The display name was shorter than the permitted minimum.
    DisplayNameTooShort {
        /// Minimum permitted length in characters.
        min: usize,
    },
    /// The display name exceeded the permitted maximum.
    DisplayNameTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The display name contained characters outside the permitted set.
    DisplayNameInvalidCharacters,
    /// The email address was empty once trimmed.
    EmptyEmail,
    /// The email address did not match the expected shape.
    InvalidEmail,
    /// The location exceeded the permitted length.
    LocationTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The bio exceeded the permitted length.
    BioTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The photo URL was empty once trimmed.
    EmptyPhotoUrl,
    /// The photo URL exceeded the permitted length.
    PhotoUrlTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The credential hash was empty.
    EmptyCredential,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooShort { min } => {
                write!(f, "display name must be at least {min} characters")
            }
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, underscores, or hyphens",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::LocationTooLong { max } => {
                write!(f, "location must be at most {max} characters")
            }
            Self::BioTooLong { max } => write!(f, "bio must be at most {max} characters"),
            Self::EmptyPhotoUrl => write!(f, "photo URL must not be empty"),
            Self::PhotoUrlTooLong { max } => {
                write!(f, "photo URL must be at most {max} characters")
            }
            Self::EmptyCredential => write!(f, "credential hash must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a [`UserId`] directly from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9 _-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    /// Returns a [`UserValidationError`] for blank, out-of-range, or
    /// disallowed-character input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(input: String) -> Result<Self, UserValidationError> {
        let display_name = input.trim().to_owned();
        if display_name.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }

        let length = display_name.chars().count();
        if length < DISPLAY_NAME_MIN {
            return Err(UserValidationError::DisplayNameTooShort {
                min: DISPLAY_NAME_MIN,
            });
        }
        if length > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }

        if !display_name_regex().is_match(&display_name) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }

        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address used as the login identity.
///
/// ## Invariants
/// - Stored trimmed and lowercased, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, normalise, and construct an [`EmailAddress`].
    ///
    /// # Errors
    /// Returns a [`UserValidationError`] for blank or malformed input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(input: String) -> Result<Self, UserValidationError> {
        let email = input.trim().to_lowercase();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Free-text location shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// Validate and construct a [`Location`] from owned input.
    ///
    /// # Errors
    /// Returns [`UserValidationError::LocationTooLong`] when the trimmed
    /// input exceeds [`LOCATION_MAX`] characters. Blank input is permitted
    /// here; callers normalise blanks to an absent location.
    pub fn new(location: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(location.into())
    }

    fn from_owned(input: String) -> Result<Self, UserValidationError> {
        let location = input.trim().to_owned();
        if location.chars().count() > LOCATION_MAX {
            return Err(UserValidationError::LocationTooLong { max: LOCATION_MAX });
        }
        Ok(Self(location))
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl TryFrom<String> for Location {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Free-text bio shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bio(String);

impl Bio {
    /// Validate and construct a [`Bio`] from owned input.
    ///
    /// # Errors
    /// Returns [`UserValidationError::BioTooLong`] when the trimmed input
    /// exceeds [`BIO_MAX`] characters.
    pub fn new(bio: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(bio.into())
    }

    fn from_owned(input: String) -> Result<Self, UserValidationError> {
        let bio = input.trim().to_owned();
        if bio.chars().count() > BIO_MAX {
            return Err(UserValidationError::BioTooLong { max: BIO_MAX });
        }
        Ok(Self(bio))
    }
}

impl AsRef<str> for Bio {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Bio> for String {
    fn from(value: Bio) -> Self {
        value.0
    }
}

impl TryFrom<String> for Bio {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Link to a profile photo hosted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Validate and construct a [`PhotoUrl`] from owned input.
    ///
    /// # Errors
    /// Returns a [`UserValidationError`] for blank or overlong input.
    pub fn new(url: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(url.into())
    }

    fn from_owned(input: String) -> Result<Self, UserValidationError> {
        let url = input.trim().to_owned();
        if url.is_empty() {
            return Err(UserValidationError::EmptyPhotoUrl);
        }
        if url.chars().count() > PHOTO_URL_MAX {
            return Err(UserValidationError::PhotoUrlTooLong { max: PHOTO_URL_MAX });
        }
        Ok(Self(url))
    }
}

impl AsRef<str> for PhotoUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhotoUrl> for String {
    fn from(value: PhotoUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhotoUrl {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Opaque salted credential hash.
///
/// The raw password never reaches this type; hashing happens behind the
/// credential hasher port. Debug output is redacted so the hash cannot leak
/// into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an already-hashed credential.
    ///
    /// # Errors
    /// Returns [`UserValidationError::EmptyCredential`] when the hash is
    /// blank.
    pub fn new(hash: impl Into<String>) -> Result<Self, UserValidationError> {
        let stored = hash.into();
        if stored.trim().is_empty() {
            return Err(UserValidationError::EmptyCredential);
        }
        Ok(Self(stored))
    }

    /// Access the stored hash for verification.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Authorisation role attached to an account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular marketplace member.
    #[default]
    User,
    /// Moderation and reporting access.
    Admin,
}

/// Error returned when parsing a user role from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseUserRoleError;

impl UserRole {
    /// Whether this role grants moderation access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

impl fmt::Display for ParseUserRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid user role")
    }
}

impl std::error::Error for ParseUserRoleError {}

impl FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseUserRoleError),
        }
    }
}

/// Recurring windows in which a member is available to trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityTag {
    /// Monday through Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
    /// Before midday.
    Mornings,
    /// Midday to early evening.
    Afternoons,
    /// After working hours.
    Evenings,
    /// No fixed pattern.
    Flexible,
}

/// Error returned when parsing an availability tag from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAvailabilityTagError;

impl fmt::Display for AvailabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekdays => f.write_str("weekdays"),
            Self::Weekends => f.write_str("weekends"),
            Self::Mornings => f.write_str("mornings"),
            Self::Afternoons => f.write_str("afternoons"),
            Self::Evenings => f.write_str("evenings"),
            Self::Flexible => f.write_str("flexible"),
        }
    }
}

impl fmt::Display for ParseAvailabilityTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid availability tag")
    }
}

impl std::error::Error for ParseAvailabilityTagError {}

impl FromStr for AvailabilityTag {
    type Err = ParseAvailabilityTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weekdays" => Ok(Self::Weekdays),
            "weekends" => Ok(Self::Weekends),
            "mornings" => Ok(Self::Mornings),
            "afternoons" => Ok(Self::Afternoons),
            "evenings" => Ok(Self::Evenings),
            "flexible" => Ok(Self::Flexible),
            _ => Err(ParseAvailabilityTagError),
        }
    }
}

/// Validated inputs for [`User::new`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Identifier assigned by the caller.
    pub id: UserId,
    /// Display name shown to other members.
    pub display_name: DisplayName,
    /// Login identity.
    pub email: EmailAddress,
    /// Hashed credential from the hasher port.
    pub credential: CredentialHash,
    /// Creation timestamp from the caller's clock.
    pub now: DateTime<Utc>,
}

/// Partial profile update.
///
/// The outer `Option` marks whether the field was provided; for clearable
/// fields the inner `Option` distinguishes setting a value from clearing it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// Replacement display name.
    pub display_name: Option<DisplayName>,
    /// Set or clear the location.
    pub location: Option<Option<Location>>,
    /// Set or clear the bio.
    pub bio: Option<Option<Bio>>,
    /// Set or clear the photo URL.
    pub photo_url: Option<Option<PhotoUrl>>,
    /// Toggle profile visibility.
    pub is_public: Option<bool>,
    /// Replace the offered skill list.
    pub skills_offered: Option<Vec<SkillDescriptor>>,
    /// Replace the wanted skill list.
    pub skills_wanted: Option<Vec<SkillDescriptor>>,
    /// Replace the availability tags.
    pub availability: Option<Vec<AvailabilityTag>>,
}

/// Snapshot of every persisted user field.
///
/// Persistence adapters parse raw storage into validated components and
/// rebuild the aggregate through [`User::from_snapshot`].
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: DisplayName,
    /// Login identity.
    pub email: EmailAddress,
    /// Hashed credential.
    pub credential: CredentialHash,
    /// Authorisation role.
    pub role: UserRole,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Profile visibility flag.
    pub is_public: bool,
    /// Optional location.
    pub location: Option<Location>,
    /// Optional bio.
    pub bio: Option<Bio>,
    /// Optional photo URL.
    pub photo_url: Option<PhotoUrl>,
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
    pub last_active_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A marketplace member.
///
/// ## Invariants
/// - `rating` mirrors the member's stored ratings: `average` is the
///   one-decimal rounded mean and `count` the number of ratings received.
/// - `swap_count` increments once per completed swap.
/// - Mutators return an updated copy and refresh `updated_at`; `created_at`
///   never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    display_name: DisplayName,
    email: EmailAddress,
    credential: CredentialHash,
    role: UserRole,
    is_active: bool,
    is_public: bool,
    location: Option<Location>,
    bio: Option<Bio>,
    photo_url: Option<PhotoUrl>,
    skills_offered: Vec<SkillDescriptor>,
    skills_wanted: Vec<SkillDescriptor>,
    availability: Vec<AvailabilityTag>,
    rating: RatingSummary,
    swap_count: u32,
    last_active_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered member with default profile state.
    #[must_use]
    pub fn new(parts: NewUser) -> Self {
        Self {
            id: parts.id,
            display_name: parts.display_name,
            email: parts.email,
            credential: parts.credential,
            role: UserRole::User,
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
            last_active_at: parts.now,
            created_at: parts.now,
            updated_at: parts.now,
        }
    }

    /// Rebuild a member from persisted state.
    #[must_use]
    pub fn from_snapshot(snapshot: UserSnapshot) -> Self {
        Self {
            id: snapshot.id,
            display_name: snapshot.display_name,
            email: snapshot.email,
            credential: snapshot.credential,
            role: snapshot.role,
            is_active: snapshot.is_active,
            is_public: snapshot.is_public,
            location: snapshot.location,
            bio: snapshot.bio,
            photo_url: snapshot.photo_url,
            skills_offered: snapshot.skills_offered,
            skills_wanted: snapshot.skills_wanted,
            availability: snapshot.availability,
            rating: snapshot.rating,
            swap_count: snapshot.swap_count,
            last_active_at: snapshot.last_active_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Display name shown to other members.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Login identity.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Hashed credential for verification.
    #[must_use]
    pub const fn credential(&self) -> &CredentialHash {
        &self.credential
    }

    /// Authorisation role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Whether the account may log in and appear in searches.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether the profile is visible to other members.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.is_public
    }

    /// Optional location.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Optional bio.
    #[must_use]
    pub const fn bio(&self) -> Option<&Bio> {
        self.bio.as_ref()
    }

    /// Optional photo URL.
    #[must_use]
    pub const fn photo_url(&self) -> Option<&PhotoUrl> {
        self.photo_url.as_ref()
    }

    /// Skills the member offers, in submission order.
    #[must_use]
    pub fn skills_offered(&self) -> &[SkillDescriptor] {
        self.skills_offered.as_slice()
    }

    /// Skills the member wants, in submission order.
    #[must_use]
    pub fn skills_wanted(&self) -> &[SkillDescriptor] {
        self.skills_wanted.as_slice()
    }

    /// Availability tags.
    #[must_use]
    pub fn availability(&self) -> &[AvailabilityTag] {
        self.availability.as_slice()
    }

    /// Reputation summary.
    #[must_use]
    pub const fn rating(&self) -> RatingSummary {
        self.rating
    }

    /// Number of completed swaps.
    #[must_use]
    pub const fn swap_count(&self) -> u32 {
        self.swap_count
    }

    /// Last recorded activity.
    #[must_use]
    pub const fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial profile update.
    #[must_use]
    pub fn with_profile(mut self, changes: ProfileChanges, now: DateTime<Utc>) -> Self {
        if let Some(display_name) = changes.display_name {
            self.display_name = display_name;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
        if let Some(bio) = changes.bio {
            self.bio = bio;
        }
        if let Some(photo_url) = changes.photo_url {
            self.photo_url = photo_url;
        }
        if let Some(is_public) = changes.is_public {
            self.is_public = is_public;
        }
        if let Some(skills_offered) = changes.skills_offered {
            self.skills_offered = skills_offered;
        }
        if let Some(skills_wanted) = changes.skills_wanted {
            self.skills_wanted = skills_wanted;
        }
        if let Some(availability) = changes.availability {
            self.availability = availability;
        }
        self.last_active_at = now;
        self.updated_at = now;
        self
    }

    /// Replace the stored credential hash.
    #[must_use]
    pub fn with_credential(mut self, credential: CredentialHash, now: DateTime<Utc>) -> Self {
        self.credential = credential;
        self.updated_at = now;
        self
    }

    /// Toggle the soft-delete flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool, now: DateTime<Utc>) -> Self {
        self.is_active = is_active;
        self.updated_at = now;
        self
    }

    /// Replace the reputation summary after a recompute.
    #[must_use]
    pub fn with_rating(mut self, rating: RatingSummary, now: DateTime<Utc>) -> Self {
        self.rating = rating;
        self.updated_at = now;
        self
    }

    /// Record a completed swap.
    #[must_use]
    pub fn record_completed_swap(mut self, now: DateTime<Utc>) -> Self {
        self.swap_count = self.swap_count.saturating_add(1);
        self.last_active_at = now;
        self.updated_at = now;
        self
    }

    /// Refresh the activity timestamp.
    #[must_use]
    pub fn touch(mut self, now: DateTime<Utc>) -> Self {
        self.last_active_at = now;
        self.updated_at = now;
        self
    }
}
