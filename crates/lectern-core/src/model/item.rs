use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{ErrorCode, StoreError};

/// Maximum number of non-empty URLs an item may carry.
pub const MAX_URLS: usize = 5;

/// Highest comment rating.
pub const MAX_RATING: u8 = 5;

/// The four hierarchy levels, in parent → child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Subject,
    Training,
    Topic,
    Unit,
}

impl Level {
    pub const ALL: [Self; 4] = [Self::Subject, Self::Training, Self::Topic, Self::Unit];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Training => "training",
            Self::Topic => "topic",
            Self::Unit => "unit",
        }
    }

    /// Name of the collection holding this level in the persisted graph.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Subject => "subjects",
            Self::Training => "trainings",
            Self::Topic => "topics",
            Self::Unit => "units",
        }
    }

    /// The level one step up, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Subject => None,
            Self::Training => Some(Self::Subject),
            Self::Topic => Some(Self::Training),
            Self::Unit => Some(Self::Topic),
        }
    }

    /// The level one step down, if any.
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Subject => Some(Self::Training),
            Self::Training => Some(Self::Topic),
            Self::Topic => Some(Self::Unit),
            Self::Unit => None,
        }
    }

    /// Serialized name of the parent reference field.
    #[must_use]
    pub const fn parent_field(self) -> Option<&'static str> {
        match self {
            Self::Subject => None,
            Self::Training => Some("subjectId"),
            Self::Topic => Some("trainingId"),
            Self::Unit => Some("topicId"),
        }
    }
}

/// Editorial status shared by every hierarchy level.
///
/// There is no transition graph: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Backlog,
    Draft,
    Ready,
    Published,
}

impl Status {
    /// Kanban column order.
    pub const ALL: [Self; 4] = [Self::Backlog, Self::Draft, Self::Ready, Self::Published];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Published => "published",
        }
    }
}

/// A comment rating in `0..=5`. Zero means "not rated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate and wrap a raw rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRating`] when `value > 5`.
    pub fn new(value: u8) -> Result<Self, StoreError> {
        if value > MAX_RATING {
            return Err(StoreError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A comment left on an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::Store::add_comment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub author: String,
    pub rating: Rating,
}

/// One spoken paragraph of a unit, optionally illustrated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeechText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SpeechText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }
}

/// Fields shared by all four hierarchy levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemFields {
    /// Fresh fields with the given id, stamped at `now`.
    #[must_use]
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            notes: None,
            urls: Vec::new(),
            image: None,
            status: Status::default(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(flatten)]
    pub fields: ItemFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[serde(flatten)]
    pub fields: ItemFields,
    #[serde(default)]
    pub subject_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(flatten)]
    pub fields: ItemFields,
    #[serde(default)]
    pub training_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(flatten)]
    pub fields: ItemFields,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub speech_texts: Vec<SpeechText>,
    #[serde(default)]
    pub explanation_text: String,
}

/// Typed access to the fields every hierarchy record shares.
pub trait Record {
    const LEVEL: Level;

    fn fields(&self) -> &ItemFields;

    fn fields_mut(&mut self) -> &mut ItemFields;

    /// The parent reference, `None` for subjects.
    fn parent_id(&self) -> Option<&str>;

    fn set_parent_id(&mut self, parent_id: String);
}

impl Record for Subject {
    const LEVEL: Level = Level::Subject;

    fn fields(&self) -> &ItemFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ItemFields {
        &mut self.fields
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn set_parent_id(&mut self, _parent_id: String) {}
}

impl Record for Training {
    const LEVEL: Level = Level::Training;

    fn fields(&self) -> &ItemFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ItemFields {
        &mut self.fields
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.subject_id)
    }

    fn set_parent_id(&mut self, parent_id: String) {
        self.subject_id = parent_id;
    }
}

impl Record for Topic {
    const LEVEL: Level = Level::Topic;

    fn fields(&self) -> &ItemFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ItemFields {
        &mut self.fields
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.training_id)
    }

    fn set_parent_id(&mut self, parent_id: String) {
        self.training_id = parent_id;
    }
}

impl Record for Unit {
    const LEVEL: Level = Level::Unit;

    fn fields(&self) -> &ItemFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ItemFields {
        &mut self.fields
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.topic_id)
    }

    fn set_parent_id(&mut self, parent_id: String) {
        self.topic_id = parent_id;
    }
}

/// An owned record of any level.
///
/// Serializes as the bare record (no level tag), which is the shape of the
/// persisted collections and of the JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Subject(Subject),
    Training(Training),
    Topic(Topic),
    Unit(Unit),
}

impl Item {
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Subject(_) => Level::Subject,
            Self::Training(_) => Level::Training,
            Self::Topic(_) => Level::Topic,
            Self::Unit(_) => Level::Unit,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &ItemFields {
        match self {
            Self::Subject(s) => s.fields(),
            Self::Training(t) => t.fields(),
            Self::Topic(t) => t.fields(),
            Self::Unit(u) => u.fields(),
        }
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Subject(s) => s.parent_id(),
            Self::Training(t) => t.parent_id(),
            Self::Topic(t) => t.parent_id(),
            Self::Unit(u) => u.parent_id(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.fields().id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields().name
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.fields().status
    }

    #[must_use]
    pub const fn as_unit(&self) -> Option<&Unit> {
        match self {
            Self::Unit(u) => Some(u),
            _ => None,
        }
    }
}

impl From<Subject> for Item {
    fn from(value: Subject) -> Self {
        Self::Subject(value)
    }
}

impl From<Training> for Item {
    fn from(value: Training) -> Self {
        Self::Training(value)
    }
}

impl From<Topic> for Item {
    fn from(value: Topic) -> Self {
        Self::Topic(value)
    }
}

impl From<Unit> for Item {
    fn from(value: Unit) -> Self {
        Self::Unit(value)
    }
}

/// Merge-patch input for creating or updating an item.
///
/// Only `Some` fields are applied. Supplying an empty string for
/// `description`, `notes`, `image` or `explanation_text` clears it.
/// `parent_id` is required on create for every level below subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub urls: Option<Vec<String>>,
    pub image: Option<String>,
    pub status: Option<Status>,
    pub parent_id: Option<String>,
    pub speech_texts: Option<Vec<SpeechText>>,
    pub explanation_text: Option<String>,
}

impl ItemPatch {
    /// A patch touching only the status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// A patch touching only the name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attach a parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject unit-only fields on other levels.
    pub(crate) fn check_level(&self, level: Level) -> Result<(), StoreError> {
        if level == Level::Unit {
            return Ok(());
        }
        if self.speech_texts.is_some() {
            return Err(StoreError::FieldNotApplicable {
                level,
                field: "speechTexts",
            });
        }
        if self.explanation_text.is_some() {
            return Err(StoreError::FieldNotApplicable {
                level,
                field: "explanationText",
            });
        }
        if level == Level::Subject && self.parent_id.is_some() {
            return Err(StoreError::FieldNotApplicable {
                level,
                field: "parentId",
            });
        }
        Ok(())
    }

    /// URLs with blanks dropped, bounded by [`MAX_URLS`].
    pub(crate) fn cleaned_urls(&self) -> Result<Option<Vec<String>>, StoreError> {
        let Some(urls) = &self.urls else {
            return Ok(None);
        };
        let cleaned: Vec<String> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        if cleaned.len() > MAX_URLS {
            return Err(StoreError::TooManyUrls {
                count: cleaned.len(),
            });
        }
        Ok(Some(cleaned))
    }

    /// Apply the shared fields. URLs must already be cleaned.
    pub(crate) fn apply_fields(&self, fields: &mut ItemFields, urls: Option<Vec<String>>) {
        if let Some(name) = &self.name {
            fields.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            fields.description = non_empty(description);
        }
        if let Some(notes) = &self.notes {
            fields.notes = non_empty(notes);
        }
        if let Some(urls) = urls {
            fields.urls = urls;
        }
        if let Some(image) = &self.image {
            fields.image = non_empty(image);
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
    }

    /// Apply the unit-only fields.
    pub(crate) fn apply_unit(&self, unit: &mut Unit) {
        if let Some(speech_texts) = &self.speech_texts {
            unit.speech_texts.clone_from(speech_texts);
        }
        if let Some(explanation) = &self.explanation_text {
            unit.explanation_text.clone_from(explanation);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Edits to a unit's ordered speech texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEdit {
    /// Append a new paragraph.
    Push(SpeechText),
    /// Replace the text at `index`, keeping its image.
    Set { index: usize, text: String },
    /// Replace or clear the image at `index`.
    SetImage { index: usize, image: Option<String> },
    /// Drop the paragraph at `index`.
    Remove { index: usize },
    /// Move the paragraph at `from` so it ends up at `to`.
    Move { from: usize, to: usize },
}

impl Unit {
    /// Apply a speech text edit in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSpeechIndex`] when an index is out of range.
    pub fn apply_speech_edit(&mut self, edit: SpeechEdit) -> Result<(), StoreError> {
        let len = self.speech_texts.len();
        let check = |index: usize| {
            if index < len {
                Ok(())
            } else {
                Err(StoreError::InvalidSpeechIndex { index, len })
            }
        };

        match edit {
            SpeechEdit::Push(speech) => self.speech_texts.push(speech),
            SpeechEdit::Set { index, text } => {
                check(index)?;
                self.speech_texts[index].text = text;
            }
            SpeechEdit::SetImage { index, image } => {
                check(index)?;
                self.speech_texts[index].image = image.filter(|i| !i.trim().is_empty());
            }
            SpeechEdit::Remove { index } => {
                check(index)?;
                self.speech_texts.remove(index);
            }
            SpeechEdit::Move { from, to } => {
                check(from)?;
                check(to)?;
                if from != to {
                    let moved = self.speech_texts.remove(from);
                    self.speech_texts.insert(to, moved);
                }
            }
        }
        Ok(())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl ParseEnumError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidEnumValue
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Level {
    type Err = ParseEnumError;

    /// Accepts singular and collection names (`unit`, `units`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "subject" | "subjects" => Ok(Self::Subject),
            "training" | "trainings" => Ok(Self::Training),
            "topic" | "topics" => Ok(Self::Topic),
            "unit" | "units" => Ok(Self::Unit),
            _ => Err(ParseEnumError {
                expected: "level",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "backlog" => Ok(Self::Backlog),
            "draft" => Ok(Self::Draft),
            "ready" => Ok(Self::Ready),
            "published" => Ok(Self::Published),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}
