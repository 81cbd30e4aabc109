//! Skill descriptors exchanged on the barter board.
//!
//! A skill descriptor names something a member can teach or wants to learn.
//! Descriptors appear on user profiles (offered and wanted lists) and on swap
//! requests (the offered and requested sides of a trade).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length for a skill name, in characters.
pub const SKILL_NAME_MAX: usize = 100;
/// Maximum length for a skill description, in characters.
pub const SKILL_DESCRIPTION_MAX: usize = 200;

/// Validation errors returned by [`SkillDescriptor::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillValidationError {
    /// The skill name was empty once trimmed.
    EmptyName,
    /// The skill name exceeded the permitted length.
    NameTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The skill description exceeded the permitted length.
    DescriptionTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
}

impl fmt::Display for SkillValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "skill name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "skill name must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "skill description must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for SkillValidationError {}

/// Self-assessed proficiency attached to a skill descriptor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// Still learning the basics.
    Beginner,
    /// Comfortable working unaided.
    #[default]
    Intermediate,
    /// Able to teach the skill to others.
    Advanced,
}

/// Error returned when parsing a skill level from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSkillLevelError;

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => f.write_str("beginner"),
            Self::Intermediate => f.write_str("intermediate"),
            Self::Advanced => f.write_str("advanced"),
        }
    }
}

impl fmt::Display for ParseSkillLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid skill level")
    }
}

impl std::error::Error for ParseSkillLevelError {}

impl FromStr for SkillLevel {
    type Err = ParseSkillLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ParseSkillLevelError),
        }
    }
}

/// Draft payload for a skill descriptor.
///
/// Drafts arrive from clients and from persisted JSON documents; both paths
/// funnel through [`SkillDescriptor::new`] so the invariants hold everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillDraft {
    /// Skill name, trimmed during validation.
    pub name: String,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Proficiency; defaults to [`SkillLevel::Intermediate`] when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SkillLevel>,
}

/// A validated skill descriptor.
///
/// ## Invariants
/// - `name` is non-empty once trimmed and at most [`SKILL_NAME_MAX`] characters.
/// - `description`, when present, is non-empty and at most
///   [`SKILL_DESCRIPTION_MAX`] characters. Blank descriptions are normalised
///   to absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "SkillDraft", into = "SkillDraft")]
pub struct SkillDescriptor {
    name: String,
    description: Option<String>,
    level: SkillLevel,
}

impl SkillDescriptor {
    /// Creates a validated skill descriptor from a draft.
    ///
    /// # Errors
    /// Returns a [`SkillValidationError`] when the name is blank or either
    /// text field exceeds its limit.
    pub fn new(draft: SkillDraft) -> Result<Self, SkillValidationError> {
        let name = draft.name.trim().to_owned();
        if name.is_empty() {
            return Err(SkillValidationError::EmptyName);
        }
        if name.chars().count() > SKILL_NAME_MAX {
            return Err(SkillValidationError::NameTooLong {
                max: SKILL_NAME_MAX,
            });
        }

        let description = draft
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if description
            .as_deref()
            .is_some_and(|text| text.chars().count() > SKILL_DESCRIPTION_MAX)
        {
            return Err(SkillValidationError::DescriptionTooLong {
                max: SKILL_DESCRIPTION_MAX,
            });
        }

        Ok(Self {
            name,
            description,
            level: draft.level.unwrap_or_default(),
        })
    }

    /// Returns the skill name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the self-assessed proficiency.
    #[must_use]
    pub const fn level(&self) -> SkillLevel {
        self.level
    }
}

impl TryFrom<SkillDraft> for SkillDescriptor {
    type Error = SkillValidationError;

    fn try_from(value: SkillDraft) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkillDescriptor> for SkillDraft {
    fn from(value: SkillDescriptor) -> Self {
        Self {
            name: value.name,
            description: value.description,
            level: Some(value.level),
        }
    }
}
