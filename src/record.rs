//! Domain records kept by the [`EntityStore`](crate::EntityStore).
//!
//! Every use case reduces to one record shape: an immutable id, the
//! kind of collection it lives in, an owner, a bag of named fields and a
//! lifecycle status.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Named field values of a record or command payload.
pub type Fields = BTreeMap<String, FieldValue>;

/// Unique record identifier, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random identifier.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its hyphenated string form.
    ///
    /// Returns `None` when the input is not a valid UUID.
    pub fn parse(input: &str) -> Option<Self> {
        Uuid::parse_str(input.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// A registered tourist account
    Tourist,
    /// A cultural site tourists can review
    Site,
    /// A refreshment point (restaurant, bar) run by an operator
    RefreshmentPoint,
    /// An advertising banner attached to a refreshment point
    Banner,
    /// A tourist's vote and comment on a site
    Feedback,
    /// A site bookmarked by a tourist
    PreferredSite,
    /// A news item published by an administrator
    News,
}

impl RecordKind {
    /// Returns the stable snake_case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Tourist => "tourist",
            RecordKind::Site => "site",
            RecordKind::RefreshmentPoint => "refreshment_point",
            RecordKind::Banner => "banner",
            RecordKind::Feedback => "feedback",
            RecordKind::PreferredSite => "preferred_site",
            RecordKind::News => "news",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Whole number (votes, counters)
    Integer(i64),
    /// Flag
    Bool(bool),
    /// Non-owning reference to another record
    Reference(RecordId),
}

impl FieldValue {
    /// Returns the text content, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the referenced id, if this is a `Reference` value.
    pub fn as_reference(&self) -> Option<RecordId> {
        match self {
            FieldValue::Reference(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<RecordId> for FieldValue {
    fn from(value: RecordId) -> Self {
        FieldValue::Reference(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Reference(id) => write!(f, "{}", id),
        }
    }
}

/// Lifecycle status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Visible to lookups and natural-key checks
    Active,
    /// Soft-deleted; retained as an audit copy
    Deleted,
}

/// A record that has not been stored yet.
///
/// The store assigns the id and timestamps when it accepts the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Target collection
    pub kind: RecordKind,
    /// Principal or external id owning the record
    pub owner_id: String,
    /// Field values
    pub fields: Fields,
}

impl NewRecord {
    /// Creates an empty draft of the given kind.
    pub fn new(kind: RecordKind, owner_id: impl Into<String>) -> Self {
        Self {
            kind,
            owner_id: owner_id.into(),
            fields: Fields::new(),
        }
    }

    /// Sets a field value. Returns the draft for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    kind: RecordKind,
    owner_id: String,
    fields: Fields,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Record {
    pub(crate) fn from_draft(id: RecordId, draft: NewRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: draft.kind,
            owner_id: draft.owner_id,
            fields: draft.fields,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the record id.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the record kind.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the owner id.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Returns all field values.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns a single field value.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns a text field, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_text)
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns `true` unless the record was soft-deleted.
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub(crate) fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.status = RecordStatus::Deleted;
        self.updated_at = now;
    }
}
