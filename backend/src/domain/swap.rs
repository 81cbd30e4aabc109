//! Swap requests and their status machine.
//!
//! A [`SwapRequest`] moves through `pending`, `accepted`, `rejected`,
//! `completed`, and `cancelled`. Transition methods enforce the permitted
//! edges; actor authorisation lives in the services that call them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::skill::SkillDescriptor;
use super::user::UserId;

/// Maximum allowed length for the opening message.
pub const SWAP_MESSAGE_MAX: usize = 500;
/// Maximum allowed length for the accept/reject response message.
pub const RESPONSE_MESSAGE_MAX: usize = 500;
/// Maximum allowed length for a cancellation reason.
pub const CANCEL_REASON_MAX: usize = 500;
/// Maximum allowed length for meeting details.
pub const MEETING_DETAILS_MAX: usize = 500;
/// Minimum allowed session duration in hours.
pub const DURATION_HOURS_MIN: f64 = 0.5;
/// Maximum allowed session duration in hours.
pub const DURATION_HOURS_MAX: f64 = 8.0;

/// Validation errors returned by the swap constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapValidationError {
    /// Requester and recipient were the same user.
    SelfSwap,
    /// The opening message exceeded the permitted length.
    MessageTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The response message exceeded the permitted length.
    ResponseMessageTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The cancellation reason exceeded the permitted length.
    CancelReasonTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The meeting details exceeded the permitted length.
    MeetingDetailsTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },
    /// The session duration fell outside the permitted range.
    DurationOutOfRange {
        /// Minimum permitted duration in hours.
        min: f64,
        /// Maximum permitted duration in hours.
        max: f64,
    },
}

impl fmt::Display for SwapValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfSwap => write!(f, "requester and recipient must differ"),
            Self::MessageTooLong { max } => {
                write!(f, "message must be at most {max} characters")
            }
            Self::ResponseMessageTooLong { max } => {
                write!(f, "response message must be at most {max} characters")
            }
            Self::CancelReasonTooLong { max } => {
                write!(f, "cancellation reason must be at most {max} characters")
            }
            Self::MeetingDetailsTooLong { max } => {
                write!(f, "meeting details must be at most {max} characters")
            }
            Self::DurationOutOfRange { min, max } => {
                write!(f, "duration must be between {min} and {max} hours")
            }
        }
    }
}

impl std::error::Error for SwapValidationError {}

/// Stable swap request identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "6f2c7c6e-46fb-4a62-9e17-5898e1f5d18a")]
pub struct SwapId(Uuid);

impl SwapId {
    /// Generate a new random [`SwapId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a [`SwapId`] directly from a UUID.
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

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SwapId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a swap request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    /// Awaiting an answer from the recipient.
    Pending,
    /// Agreed and awaiting completion.
    Accepted,
    /// Declined by the recipient.
    Rejected,
    /// Both sides done; counters incremented.
    Completed,
    /// Withdrawn by either participant.
    Cancelled,
}

/// Error returned when parsing a swap status from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSwapStatusError;

impl SwapStatus {
    /// Whether no further transitions are permitted from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

impl fmt::Display for ParseSwapStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid swap status")
    }
}

impl std::error::Error for ParseSwapStatusError {}

impl FromStr for SwapStatus {
    type Err = ParseSwapStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseSwapStatusError),
        }
    }
}

/// Transition attempted on a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAction {
    /// Recipient agrees to the swap.
    Accept,
    /// Recipient declines the swap.
    Reject,
    /// Either participant withdraws.
    Cancel,
    /// Either participant marks the swap done.
    Complete,
}

impl fmt::Display for SwapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Reject => f.write_str("reject"),
            Self::Cancel => f.write_str("cancel"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Rejected transition: the swap was not in a state that permits the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapTransitionError {
    /// The attempted transition.
    pub action: SwapAction,
    /// The status the swap was in at the time.
    pub status: SwapStatus,
}

impl fmt::Display for SwapTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} a swap request that is {}",
            self.action, self.status
        )
    }
}

impl std::error::Error for SwapTransitionError {}

/// Which side of a swap a user occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapParticipant {
    /// The user who sent the request.
    Requester,
    /// The user who received the request.
    Recipient,
}

impl SwapParticipant {
    /// The opposite side of the swap.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Requester => Self::Recipient,
            Self::Recipient => Self::Requester,
        }
    }
}

/// How the participants plan to meet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    /// Face to face.
    InPerson,
    /// Video call or similar.
    #[default]
    Online,
    /// A mix of both.
    Hybrid,
}

/// Error returned when parsing a meeting kind from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMeetingKindError;

impl fmt::Display for MeetingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InPerson => f.write_str("in_person"),
            Self::Online => f.write_str("online"),
            Self::Hybrid => f.write_str("hybrid"),
        }
    }
}

impl fmt::Display for ParseMeetingKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid meeting kind")
    }
}

impl std::error::Error for ParseMeetingKindError {}

impl FromStr for MeetingKind {
    type Err = ParseMeetingKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_person" => Ok(Self::InPerson),
            "online" => Ok(Self::Online),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(ParseMeetingKindError),
        }
    }
}

/// Free-text venue or call details for a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeetingDetails(String);

impl MeetingDetails {
    /// Validate and construct [`MeetingDetails`] from owned input.
    ///
    /// # Errors
    /// Returns [`SwapValidationError::MeetingDetailsTooLong`] when the
    /// trimmed input exceeds [`MEETING_DETAILS_MAX`] characters. Blank input
    /// is permitted; callers normalise blanks to absent details.
    pub fn new(details: impl Into<String>) -> Result<Self, SwapValidationError> {
        Self::from_owned(details.into())
    }

    fn from_owned(input: String) -> Result<Self, SwapValidationError> {
        let details = input.trim().to_owned();
        if details.chars().count() > MEETING_DETAILS_MAX {
            return Err(SwapValidationError::MeetingDetailsTooLong {
                max: MEETING_DETAILS_MAX,
            });
        }
        Ok(Self(details))
    }
}

impl AsRef<str> for MeetingDetails {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MeetingDetails> for String {
    fn from(value: MeetingDetails) -> Self {
        value.0
    }
}

impl TryFrom<String> for MeetingDetails {
    type Error = SwapValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Meeting arrangement attached to a swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPlan {
    /// How the participants plan to meet.
    #[serde(default)]
    pub kind: MeetingKind,
    /// Optional venue or call details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub details: Option<MeetingDetails>,
}

/// Opening message sent with a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwapMessage(String);

impl SwapMessage {
    /// Validate and construct a [`SwapMessage`] from owned input.
    ///
    /// # Errors
    /// Returns [`SwapValidationError::MessageTooLong`] when the trimmed input
    /// exceeds [`SWAP_MESSAGE_MAX`] characters. Blank input is permitted;
    /// callers normalise blanks to an absent message.
    pub fn new(message: impl Into<String>) -> Result<Self, SwapValidationError> {
        Self::from_owned(message.into())
    }

    fn from_owned(input: String) -> Result<Self, SwapValidationError> {
        let message = input.trim().to_owned();
        if message.chars().count() > SWAP_MESSAGE_MAX {
            return Err(SwapValidationError::MessageTooLong {
                max: SWAP_MESSAGE_MAX,
            });
        }
        Ok(Self(message))
    }
}

impl AsRef<str> for SwapMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SwapMessage> for String {
    fn from(value: SwapMessage) -> Self {
        value.0
    }
}

impl TryFrom<String> for SwapMessage {
    type Error = SwapValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Response message attached when answering a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResponseMessage(String);

impl ResponseMessage {
    /// Validate and construct a [`ResponseMessage`] from owned input.
    ///
    /// # Errors
    /// Returns [`SwapValidationError::ResponseMessageTooLong`] when the
    /// trimmed input exceeds [`RESPONSE_MESSAGE_MAX`] characters.
    pub fn new(message: impl Into<String>) -> Result<Self, SwapValidationError> {
        Self::from_owned(message.into())
    }

    fn from_owned(input: String) -> Result<Self, SwapValidationError> {
        let message = input.trim().to_owned();
        if message.chars().count() > RESPONSE_MESSAGE_MAX {
            return Err(SwapValidationError::ResponseMessageTooLong {
                max: RESPONSE_MESSAGE_MAX,
            });
        }
        Ok(Self(message))
    }
}

impl AsRef<str> for ResponseMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ResponseMessage> for String {
    fn from(value: ResponseMessage) -> Self {
        value.0
    }
}

impl TryFrom<String> for ResponseMessage {
    type Error = SwapValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Reason attached when cancelling a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CancelReason(String);

impl CancelReason {
    /// Validate and construct a [`CancelReason`] from owned input.
    ///
    /// # Errors
    /// Returns [`SwapValidationError::CancelReasonTooLong`] when the trimmed
    /// input exceeds [`CANCEL_REASON_MAX`] characters.
    pub fn new(reason: impl Into<String>) -> Result<Self, SwapValidationError> {
        Self::from_owned(reason.into())
    }

    fn from_owned(input: String) -> Result<Self, SwapValidationError> {
        let reason = input.trim().to_owned();
        if reason.chars().count() > CANCEL_REASON_MAX {
            return Err(SwapValidationError::CancelReasonTooLong {
                max: CANCEL_REASON_MAX,
            });
        }
        Ok(Self(reason))
    }
}

impl AsRef<str> for CancelReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CancelReason> for String {
    fn from(value: CancelReason) -> Self {
        value.0
    }
}

impl TryFrom<String> for CancelReason {
    type Error = SwapValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Session length agreed between participants, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "f64", into = "f64")]
#[schema(value_type = f64, example = 1.5)]
pub struct DurationHours(f64);

impl DurationHours {
    /// Validate and construct a [`DurationHours`].
    ///
    /// # Errors
    /// Returns [`SwapValidationError::DurationOutOfRange`] when the value is
    /// not within [`DURATION_HOURS_MIN`] to [`DURATION_HOURS_MAX`] inclusive.
    /// `NaN` is rejected.
    pub fn new(hours: f64) -> Result<Self, SwapValidationError> {
        if !(DURATION_HOURS_MIN..=DURATION_HOURS_MAX).contains(&hours) {
            return Err(SwapValidationError::DurationOutOfRange {
                min: DURATION_HOURS_MIN,
                max: DURATION_HOURS_MAX,
            });
        }
        Ok(Self(hours))
    }

    /// The duration in hours.
    #[must_use]
    pub const fn hours(self) -> f64 {
        self.0
    }
}

impl From<DurationHours> for f64 {
    fn from(value: DurationHours) -> Self {
        value.0
    }
}

impl TryFrom<f64> for DurationHours {
    type Error = SwapValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated inputs for [`SwapRequest::new`].
#[derive(Debug, Clone)]
pub struct NewSwapRequest {
    /// Identifier assigned by the caller.
    pub id: SwapId,
    /// User sending the request.
    pub requester_id: UserId,
    /// User receiving the request.
    pub recipient_id: UserId,
    /// Skill the requester offers in exchange.
    pub offered_skill: SkillDescriptor,
    /// Skill the requester wants to receive.
    pub requested_skill: SkillDescriptor,
    /// Optional opening message.
    pub message: Option<SwapMessage>,
    /// Optional proposed session time.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional agreed session length.
    pub duration_hours: Option<DurationHours>,
    /// Proposed meeting arrangement.
    pub meeting: MeetingPlan,
    /// Creation timestamp from the caller's clock.
    pub now: DateTime<Utc>,
}

/// Details the recipient may attach when accepting.
#[derive(Debug, Clone, Default)]
pub struct AcceptDetails {
    /// Optional message for the requester.
    pub response_message: Option<ResponseMessage>,
    /// Optional agreed session time.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional replacement meeting arrangement.
    pub meeting: Option<MeetingPlan>,
}

/// Snapshot of every persisted swap field.
///
/// Persistence adapters parse raw storage into validated components and
/// rebuild the aggregate through [`SwapRequest::from_snapshot`].
#[derive(Debug, Clone)]
pub struct SwapSnapshot {
    /// Stable identifier.
    pub id: SwapId,
    /// User who sent the request.
    pub requester_id: UserId,
    /// User who received the request.
    pub recipient_id: UserId,
    /// Skill offered in exchange.
    pub offered_skill: SkillDescriptor,
    /// Skill requested.
    pub requested_skill: SkillDescriptor,
    /// Optional opening message.
    pub message: Option<SwapMessage>,
    /// Current lifecycle state.
    pub status: SwapStatus,
    /// Optional accept/reject response.
    pub response_message: Option<ResponseMessage>,
    /// Optional agreed session time.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional agreed session length.
    pub duration_hours: Option<DurationHours>,
    /// Meeting arrangement.
    pub meeting: MeetingPlan,
    /// Optional cancellation reason.
    pub cancel_reason: Option<CancelReason>,
    /// Whether the requester has rated this swap.
    pub rated_by_requester: bool,
    /// Whether the recipient has rated this swap.
    pub rated_by_recipient: bool,
    /// When the swap completed, if it did.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the swap was cancelled, if it was.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A proposed exchange of skills between two members.
///
/// ## Invariants
/// - `requester_id != recipient_id`.
/// - `status` only changes along the permitted transition edges; terminal
///   states admit no further transitions.
/// - `completed_at` and `cancelled_at` are stamped exactly once, on entering
///   the matching terminal state, and never reset.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    id: SwapId,
    requester_id: UserId,
    recipient_id: UserId,
    offered_skill: SkillDescriptor,
    requested_skill: SkillDescriptor,
    message: Option<SwapMessage>,
    status: SwapStatus,
    response_message: Option<ResponseMessage>,
    scheduled_for: Option<DateTime<Utc>>,
    duration_hours: Option<DurationHours>,
    meeting: MeetingPlan,
    cancel_reason: Option<CancelReason>,
    rated_by_requester: bool,
    rated_by_recipient: bool,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// Create a pending swap request.
    ///
    /// # Errors
    /// Returns [`SwapValidationError::SelfSwap`] when requester and recipient
    /// are the same user.
    pub fn new(parts: NewSwapRequest) -> Result<Self, SwapValidationError> {
        if parts.requester_id == parts.recipient_id {
            return Err(SwapValidationError::SelfSwap);
        }
        Ok(Self {
            id: parts.id,
            requester_id: parts.requester_id,
            recipient_id: parts.recipient_id,
            offered_skill: parts.offered_skill,
            requested_skill: parts.requested_skill,
            message: parts.message,
            status: SwapStatus::Pending,
            response_message: None,
            scheduled_for: parts.scheduled_for,
            duration_hours: parts.duration_hours,
            meeting: parts.meeting,
            cancel_reason: None,
            rated_by_requester: false,
            rated_by_recipient: false,
            completed_at: None,
            cancelled_at: None,
            created_at: parts.now,
            updated_at: parts.now,
        })
    }

    /// Rebuild a swap request from persisted state.
    #[must_use]
    pub fn from_snapshot(snapshot: SwapSnapshot) -> Self {
        Self {
            id: snapshot.id,
            requester_id: snapshot.requester_id,
            recipient_id: snapshot.recipient_id,
            offered_skill: snapshot.offered_skill,
            requested_skill: snapshot.requested_skill,
            message: snapshot.message,
            status: snapshot.status,
            response_message: snapshot.response_message,
            scheduled_for: snapshot.scheduled_for,
            duration_hours: snapshot.duration_hours,
            meeting: snapshot.meeting,
            cancel_reason: snapshot.cancel_reason,
            rated_by_requester: snapshot.rated_by_requester,
            rated_by_recipient: snapshot.rated_by_recipient,
            completed_at: snapshot.completed_at,
            cancelled_at: snapshot.cancelled_at,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> SwapId {
        self.id
    }

    /// User who sent the request.
    #[must_use]
    pub const fn requester_id(&self) -> UserId {
        self.requester_id
    }

    /// User who received the request.
    #[must_use]
    pub const fn recipient_id(&self) -> UserId {
        self.recipient_id
    }

    /// Skill offered in exchange.
    #[must_use]
    pub const fn offered_skill(&self) -> &SkillDescriptor {
        &self.offered_skill
    }

    /// Skill requested.
    #[must_use]
    pub const fn requested_skill(&self) -> &SkillDescriptor {
        &self.requested_skill
    }

    /// Optional opening message.
    #[must_use]
    pub const fn message(&self) -> Option<&SwapMessage> {
        self.message.as_ref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SwapStatus {
        self.status
    }

    /// Optional accept/reject response.
    #[must_use]
    pub const fn response_message(&self) -> Option<&ResponseMessage> {
        self.response_message.as_ref()
    }

    /// Optional agreed session time.
    #[must_use]
    pub const fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        self.scheduled_for
    }

    /// Optional agreed session length.
    #[must_use]
    pub const fn duration_hours(&self) -> Option<DurationHours> {
        self.duration_hours
    }

    /// Meeting arrangement.
    #[must_use]
    pub const fn meeting(&self) -> &MeetingPlan {
        &self.meeting
    }

    /// Optional cancellation reason.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// When the swap completed, if it did.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// When the swap was cancelled, if it was.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
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

    /// The side of the swap the given user occupies, if any.
    #[must_use]
    pub fn participant_of(&self, user_id: UserId) -> Option<SwapParticipant> {
        if user_id == self.requester_id {
            Some(SwapParticipant::Requester)
        } else if user_id == self.recipient_id {
            Some(SwapParticipant::Recipient)
        } else {
            None
        }
    }

    /// The user occupying the given side of the swap.
    #[must_use]
    pub const fn id_of(&self, participant: SwapParticipant) -> UserId {
        match participant {
            SwapParticipant::Requester => self.requester_id,
            SwapParticipant::Recipient => self.recipient_id,
        }
    }

    /// Whether the given side has already rated this swap.
    #[must_use]
    pub const fn rated_by(&self, participant: SwapParticipant) -> bool {
        match participant {
            SwapParticipant::Requester => self.rated_by_requester,
            SwapParticipant::Recipient => self.rated_by_recipient,
        }
    }

    /// Accept a pending request.
    ///
    /// # Errors
    /// Returns a [`SwapTransitionError`] when the swap is not pending.
    pub fn accept(
        mut self,
        details: AcceptDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, SwapTransitionError> {
        self.require_status(SwapAction::Accept, SwapStatus::Pending)?;
        self.status = SwapStatus::Accepted;
        self.response_message = details.response_message;
        self.scheduled_for = details.scheduled_for;
        if let Some(meeting) = details.meeting {
            self.meeting = meeting;
        }
        self.updated_at = now;
        Ok(self)
    }

    /// Reject a pending request.
    ///
    /// # Errors
    /// Returns a [`SwapTransitionError`] when the swap is not pending.
    pub fn reject(
        mut self,
        response_message: Option<ResponseMessage>,
        now: DateTime<Utc>,
    ) -> Result<Self, SwapTransitionError> {
        self.require_status(SwapAction::Reject, SwapStatus::Pending)?;
        self.status = SwapStatus::Rejected;
        self.response_message = response_message;
        self.updated_at = now;
        Ok(self)
    }

    /// Cancel a pending or accepted request.
    ///
    /// # Errors
    /// Returns a [`SwapTransitionError`] when the swap is already terminal.
    pub fn cancel(
        mut self,
        reason: Option<CancelReason>,
        now: DateTime<Utc>,
    ) -> Result<Self, SwapTransitionError> {
        if !matches!(self.status, SwapStatus::Pending | SwapStatus::Accepted) {
            return Err(SwapTransitionError {
                action: SwapAction::Cancel,
                status: self.status,
            });
        }
        self.status = SwapStatus::Cancelled;
        self.cancel_reason = reason;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(self)
    }

    /// Complete an accepted request.
    ///
    /// # Errors
    /// Returns a [`SwapTransitionError`] when the swap is not accepted.
    pub fn complete(mut self, now: DateTime<Utc>) -> Result<Self, SwapTransitionError> {
        self.require_status(SwapAction::Complete, SwapStatus::Accepted)?;
        self.status = SwapStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(self)
    }

    /// Record that the given side has rated this swap.
    #[must_use]
    pub fn mark_rated_by(mut self, participant: SwapParticipant, now: DateTime<Utc>) -> Self {
        match participant {
            SwapParticipant::Requester => self.rated_by_requester = true,
            SwapParticipant::Recipient => self.rated_by_recipient = true,
        }
        self.updated_at = now;
        self
    }

    /// Project the swap into its serialisable view.
    #[must_use]
    pub fn view(&self) -> SwapView {
        SwapView {
            id: self.id,
            requester_id: self.requester_id,
            recipient_id: self.recipient_id,
            offered_skill: self.offered_skill.clone(),
            requested_skill: self.requested_skill.clone(),
            message: self.message.as_ref().map(|value| value.as_ref().to_owned()),
            status: self.status,
            response_message: self
                .response_message
                .as_ref()
                .map(|value| value.as_ref().to_owned()),
            scheduled_for: self.scheduled_for,
            duration_hours: self.duration_hours,
            meeting: self.meeting.clone(),
            cancel_reason: self
                .cancel_reason
                .as_ref()
                .map(|value| value.as_ref().to_owned()),
            rated_by_requester: self.rated_by_requester,
            rated_by_recipient: self.rated_by_recipient,
            completed_at: self.completed_at,
            cancelled_at: self.cancelled_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn require_status(
        &self,
        action: SwapAction,
        expected: SwapStatus,
    ) -> Result<(), SwapTransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(SwapTransitionError {
                action,
                status: self.status,
            })
        }
    }
}

/// Serialisable view of a swap request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapView {
    /// Stable identifier.
    pub id: SwapId,
    /// User who sent the request.
    pub requester_id: UserId,
    /// User who received the request.
    pub recipient_id: UserId,
    /// Skill offered in exchange.
    pub offered_skill: SkillDescriptor,
    /// Skill requested.
    pub requested_skill: SkillDescriptor,
    /// Optional opening message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Current lifecycle state.
    pub status: SwapStatus,
    /// Optional accept/reject response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    /// Optional agreed session time.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Optional agreed session length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<DurationHours>,
    /// Meeting arrangement.
    pub meeting: MeetingPlan,
    /// Optional cancellation reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Whether the requester has rated this swap.
    pub rated_by_requester: bool,
    /// Whether the recipient has rated this swap.
    pub rated_by_recipient: bool,
    /// When the swap completed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the swap was cancelled, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}
