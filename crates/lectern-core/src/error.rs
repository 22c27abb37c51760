use std::fmt;
use std::path::PathBuf;

use crate::model::item::Level;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    ItemNotFound,
    InvalidParentReference,
    InvalidEnumValue,
    TooManyUrls,
    InvalidRating,
    FieldNotApplicable,
    InvalidSpeechIndex,
    UserNotFound,
    StoreWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::InvalidParentReference => "E2002",
            Self::InvalidEnumValue => "E2003",
            Self::TooManyUrls => "E2004",
            Self::InvalidRating => "E2005",
            Self::FieldNotApplicable => "E2006",
            Self::InvalidSpeechIndex => "E2007",
            Self::UserNotFound => "E2101",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::InvalidParentReference => "Parent reference does not resolve",
            Self::InvalidEnumValue => "Invalid level/status/role value",
            Self::TooManyUrls => "Too many URLs",
            Self::InvalidRating => "Rating out of range",
            Self::FieldNotApplicable => "Field not applicable to this level",
            Self::InvalidSpeechIndex => "Speech text index out of range",
            Self::UserNotFound => "User not found",
            Self::StoreWriteFailed => "Store write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `lec init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .lectern/config.toml and retry."),
            Self::ItemNotFound | Self::UserNotFound => None,
            Self::InvalidParentReference => {
                Some("Pass --parent with the id of an existing item one level up.")
            }
            Self::InvalidEnumValue => Some(
                "Levels: subject, training, topic, unit. \
                 Statuses: backlog, draft, ready, published. Roles: admin, author.",
            ),
            Self::TooManyUrls => Some("Keep at most five non-empty URLs per item."),
            Self::InvalidRating => Some("Use a rating between 0 and 5."),
            Self::FieldNotApplicable => {
                Some("Speech texts and explanation text exist on units only.")
            }
            Self::InvalidSpeechIndex => Some("Run `lec show unit <id>` to see speech text positions."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `lec` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors returned by store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{level} '{id}' not found")]
    NotFound { level: Level, id: String },

    #[error("{level} requires a {parent_level} parent, but '{parent_id}' does not exist")]
    InvalidParentReference {
        level: Level,
        parent_level: Level,
        parent_id: String,
    },

    #[error("{level} requires a {parent_level} parent reference")]
    MissingParentReference { level: Level, parent_level: Level },

    #[error("at most 5 URLs are allowed (got {count})")]
    TooManyUrls { count: usize },

    #[error("rating must be between 0 and 5 (got {0})")]
    InvalidRating(u8),

    #[error("field '{field}' does not exist on {level}")]
    FieldNotApplicable { level: Level, field: &'static str },

    #[error("speech text index {index} out of range (unit has {len})")]
    InvalidSpeechIndex { index: usize, len: usize },

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("failed to persist store to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ItemNotFound,
            Self::InvalidParentReference { .. } | Self::MissingParentReference { .. } => {
                ErrorCode::InvalidParentReference
            }
            Self::TooManyUrls { .. } => ErrorCode::TooManyUrls,
            Self::InvalidRating(_) => ErrorCode::InvalidRating,
            Self::FieldNotApplicable { .. } => ErrorCode::FieldNotApplicable,
            Self::InvalidSpeechIndex { .. } => ErrorCode::InvalidSpeechIndex,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::Persist { .. } => ErrorCode::StoreWriteFailed,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
