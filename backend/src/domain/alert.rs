//! Alert data model.
//!
//! An alert is a community notice raised by exactly one owning user. Only the
//! owner (or an admin) may change it; soft-deleted alerts are invisible to
//! every operation.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp::stored_instant;
use super::user::UserId;

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 255;
/// Maximum postal code length in characters.
pub const POSTAL_CODE_MAX: usize = 10;

/// Validation errors returned by alert value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertValidationError {
    InvalidId,
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyDescription,
    NegativeAlertType,
    EmptyPostalCode,
    PostalCodeTooLong { max: usize },
    PostalCodeInvalidCharacters,
    UnknownStatus,
    EmptyPatch,
}

impl fmt::Display for AlertValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "alert id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::NegativeAlertType => write!(f, "alert type must not be negative"),
            Self::EmptyPostalCode => write!(f, "postal code must not be empty"),
            Self::PostalCodeTooLong { max } => {
                write!(f, "postal code must be at most {max} characters")
            }
            Self::PostalCodeInvalidCharacters => write!(
                f,
                "postal code may only contain letters, digits, spaces, or hyphens",
            ),
            Self::UnknownStatus => write!(f, "status must be one of: open, resolved"),
            Self::EmptyPatch => write!(f, "update must change at least one field"),
        }
    }
}

impl std::error::Error for AlertValidationError {}

/// Stable alert identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlertId(Uuid);

impl AlertId {
    /// Validate and construct an [`AlertId`] from textual input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AlertValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| AlertValidationError::InvalidId)
    }

    /// Generate a new random [`AlertId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AlertId> for String {
    fn from(value: AlertId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for AlertId {
    type Error = AlertValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Short headline for an alert, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTitle(String);

impl AlertTitle {
    /// Validate and construct an [`AlertTitle`].
    ///
    /// # Examples
    /// ```
    /// use communalert::domain::AlertTitle;
    ///
    /// let title = AlertTitle::new("  Broken streetlight ").unwrap();
    /// assert_eq!(title.as_ref(), "Broken streetlight");
    /// assert!(AlertTitle::new("   ").is_err());
    /// ```
    pub fn new(title: impl AsRef<str>) -> Result<Self, AlertValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AlertValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(AlertValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AlertTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Free-form alert body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDescription(String);

impl AlertDescription {
    /// Validate and construct an [`AlertDescription`]. Inner whitespace is kept.
    pub fn new(description: impl Into<String>) -> Result<Self, AlertValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(AlertValidationError::EmptyDescription);
        }
        Ok(Self(description))
    }
}

impl AsRef<str> for AlertDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Numeric alert category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertType(i32);

impl AlertType {
    /// Validate and construct an [`AlertType`].
    pub const fn new(code: i32) -> Result<Self, AlertValidationError> {
        if code < 0 {
            return Err(AlertValidationError::NegativeAlertType);
        }
        Ok(Self(code))
    }

    /// Raw category code.
    pub const fn value(self) -> i32 {
        self.0
    }
}

static POSTAL_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn postal_code_regex() -> &'static Regex {
    POSTAL_CODE_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9 -]+$")
            .unwrap_or_else(|error| panic!("postal code regex failed to compile: {error}"))
    })
}

/// Postal code the alert relates to, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCode(String);

impl PostalCode {
    /// Validate and construct a [`PostalCode`].
    pub fn new(code: impl AsRef<str>) -> Result<Self, AlertValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AlertValidationError::EmptyPostalCode);
        }
        if trimmed.chars().count() > POSTAL_CODE_MAX {
            return Err(AlertValidationError::PostalCodeTooLong {
                max: POSTAL_CODE_MAX,
            });
        }
        if !postal_code_regex().is_match(trimmed) {
            return Err(AlertValidationError::PostalCodeInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Lifecycle status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Open,
    Resolved,
}

impl AlertStatus {
    /// Stable textual representation used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = AlertValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            _ => Err(AlertValidationError::UnknownStatus),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted alert.
///
/// ## Invariants
/// - `owner` never changes after creation.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub owner: UserId,
    pub title: AlertTitle,
    pub description: AlertDescription,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<PostalCode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an alert. The owner comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDraft {
    pub title: AlertTitle,
    pub description: AlertDescription,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<PostalCode>,
}

impl AlertDraft {
    /// Materialise a new alert owned by `owner`, stamped at `now`.
    ///
    /// Instants are truncated to microseconds to match what is stored.
    pub fn into_alert(self, owner: UserId, now: DateTime<Utc>) -> Alert {
        let now = stored_instant(now);
        Alert {
            id: AlertId::random(),
            owner,
            title: self.title,
            description: self.description,
            alert_type: self.alert_type,
            status: self.status,
            closing_date: self.closing_date.map(stored_instant),
            postal_code: self.postal_code,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    pub title: Option<AlertTitle>,
    pub description: Option<AlertDescription>,
    pub alert_type: Option<AlertType>,
    pub status: Option<AlertStatus>,
    pub closing_date: Option<DateTime<Utc>>,
    pub postal_code: Option<PostalCode>,
}

impl AlertPatch {
    /// Whether the patch would leave every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.alert_type.is_none()
            && self.status.is_none()
            && self.closing_date.is_none()
            && self.postal_code.is_none()
    }

    /// Apply the patch to `alert`, bumping `updated_at` to `now`.
    ///
    /// # Errors
    /// Returns [`AlertValidationError::EmptyPatch`] when no field is set.
    pub fn apply(self, mut alert: Alert, now: DateTime<Utc>) -> Result<Alert, AlertValidationError> {
        if self.is_empty() {
            return Err(AlertValidationError::EmptyPatch);
        }
        if let Some(title) = self.title {
            alert.title = title;
        }
        if let Some(description) = self.description {
            alert.description = description;
        }
        if let Some(alert_type) = self.alert_type {
            alert.alert_type = alert_type;
        }
        if let Some(status) = self.status {
            alert.status = status;
        }
        if let Some(closing_date) = self.closing_date {
            alert.closing_date = Some(stored_instant(closing_date));
        }
        if self.postal_code.is_some() {
            alert.postal_code = self.postal_code;
        }
        alert.updated_at = stored_instant(now).max(alert.created_at);
        Ok(alert)
    }
}

/// Optional narrowing applied when listing the caller's alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub alert_type: Option<AlertType>,
}

impl AlertFilter {
    /// Whether `alert` satisfies every populated criterion.
    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.is_none_or(|status| alert.status == status)
            && self
                .alert_type
                .is_none_or(|alert_type| alert.alert_type == alert_type)
    }
}
