use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use parking_lot::Mutex;

use crate::outcome::{OperationOutcome, ResultCode};
use crate::record::{FieldValue, Fields, NewRecord, Record, RecordId, RecordKind};

/// Error returned by fallible store lookups and inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No active record has the given id
    NotFound(RecordId),
    /// Another active record already uses the same natural key
    Duplicate {
        /// Collection the clash happened in
        kind: RecordKind,
        /// Rendered `field=value` pairs of the key
        key: String,
    },
}

impl StoreError {
    /// Returns the result code this error is reported under.
    pub fn code(&self) -> ResultCode {
        match self {
            StoreError::NotFound(_) => ResultCode::NotFound,
            StoreError::Duplicate { .. } => ResultCode::Duplicate,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "record {} not found", id),
            StoreError::Duplicate { kind, key } => {
                write!(f, "{} with {} already exists", kind, key)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for OperationOutcome {
    fn from(e: StoreError) -> Self {
        OperationOutcome::failure(e.code(), e.to_string())
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<RecordId, Record>,
    // Insertion order for deterministic listing.
    order: Vec<RecordId>,
}

impl Inner {
    fn find_key_clash(
        &self,
        kind: RecordKind,
        key_fields: &[String],
        fields: &Fields,
        except: Option<RecordId>,
    ) -> Option<String> {
        let key = natural_key(key_fields, fields)?;
        let clash = self.records.values().any(|r| {
            r.is_active()
                && r.kind() == kind
                && Some(r.id()) != except
                && natural_key(key_fields, r.fields()).as_ref() == Some(&key)
        });
        clash.then(|| render_key(key_fields, &key))
    }
}

/// Collects the natural key values of `fields`, or `None` when any key field is absent.
///
/// Keys are compared value by value, so `Integer(5)` and `Text("5")` differ.
fn natural_key<'a>(key_fields: &[String], fields: &'a Fields) -> Option<Vec<&'a FieldValue>> {
    if key_fields.is_empty() {
        return None;
    }
    key_fields.iter().map(|name| fields.get(name)).collect()
}

/// Renders a key as `field=value` pairs for error messages.
fn render_key(key_fields: &[String], key: &[&FieldValue]) -> String {
    key_fields
        .iter()
        .zip(key)
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",")
}

/// In-memory keyed collection of records.
///
/// All operations lock a single mutex, so the store can be shared between
/// handlers (behind an `Arc`) and every mutation is serialized.
///
/// Deletion is soft: the record stays readable through
/// [`find_by_id`](Self::find_by_id) with status `Deleted`, but no longer
/// takes part in natural-key checks and cannot be updated or deleted again.
///
/// # Examples
///
/// ```
/// use usecase_core::{EntityStore, NewRecord, RecordKind, ResultCode};
///
/// let store = EntityStore::new();
/// let id = store
///     .create(NewRecord::new(RecordKind::Tourist, "guest").with_field("email", "ada@example.com"))
///     .expect("first insert succeeds");
///
/// let dup = store.create(
///     NewRecord::new(RecordKind::Tourist, "guest").with_field("email", "ada@example.com"),
/// );
/// assert_eq!(dup.unwrap_err().code(), ResultCode::Duplicate);
///
/// assert!(store.delete(&id).is_success());
/// assert_eq!(store.delete(&id).code(), ResultCode::NotFound);
/// ```
#[derive(Debug)]
pub struct EntityStore {
    inner: Mutex<Inner>,
    natural_keys: HashMap<RecordKind, Vec<String>>,
}

impl EntityStore {
    /// Creates an empty store with the default natural keys.
    ///
    /// - tourists are unique by `email`
    /// - feedback and preferred sites are unique by (`tourist_id`, `site_id`)
    pub fn new() -> Self {
        Self::empty()
            .with_natural_key(RecordKind::Tourist, &["email"])
            .with_natural_key(RecordKind::Feedback, &["tourist_id", "site_id"])
            .with_natural_key(RecordKind::PreferredSite, &["tourist_id", "site_id"])
    }

    /// Creates an empty store without any natural keys.
    pub fn empty() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            natural_keys: HashMap::new(),
        }
    }

    /// Declares (or replaces) the natural key of a record kind.
    ///
    /// An empty field list removes the key.
    pub fn with_natural_key(mut self, kind: RecordKind, fields: &[&str]) -> Self {
        if fields.is_empty() {
            self.natural_keys.remove(&kind);
        } else {
            self.natural_keys
                .insert(kind, fields.iter().map(|f| f.to_string()).collect());
        }
        self
    }

    fn key_fields(&self, kind: RecordKind) -> &[String] {
        self.natural_keys
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Stores a new record and returns its generated id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if an active record of the same kind
    /// has the same natural key.
    pub fn create(&self, draft: NewRecord) -> Result<RecordId, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(key) =
            inner.find_key_clash(draft.kind, self.key_fields(draft.kind), &draft.fields, None)
        {
            return Err(StoreError::Duplicate {
                kind: draft.kind,
                key,
            });
        }

        let id = RecordId::generate();
        let record = Record::from_draft(id, draft, Utc::now());
        tracing::debug!(record_id = %id, kind = %record.kind(), "record created");
        inner.records.insert(id, record);
        inner.order.push(id);
        Ok(id)
    }

    /// Checks whether `draft` could be created without a natural-key clash.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` naming the clashing key.
    pub fn check_unique(&self, draft: &NewRecord) -> Result<(), StoreError> {
        let inner = self.inner.lock();
        match inner.find_key_clash(draft.kind, self.key_fields(draft.kind), &draft.fields, None) {
            Some(key) => Err(StoreError::Duplicate {
                kind: draft.kind,
                key,
            }),
            None => Ok(()),
        }
    }

    /// Returns a copy of the record with the given id.
    ///
    /// Soft-deleted records are returned as well.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id was never stored.
    pub fn find_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.inner
            .lock()
            .records
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    /// Returns the active record of `kind` with the given id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record is missing, deleted,
    /// or of another kind.
    pub fn find_active(&self, kind: RecordKind, id: &RecordId) -> Result<Record, StoreError> {
        match self.find_by_id(id) {
            Ok(record) if record.is_active() && record.kind() == kind => Ok(record),
            _ => Err(StoreError::NotFound(*id)),
        }
    }

    /// Returns copies of all records matching `predicate`, in insertion order.
    pub fn find_all<P>(&self, predicate: P) -> Vec<Record>
    where
        P: Fn(&Record) -> bool,
    {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Returns copies of every record, in insertion order.
    pub fn all(&self) -> Vec<Record> {
        self.find_all(|_| true)
    }

    /// Returns the active record whose natural key matches `fields`.
    ///
    /// Returns `None` if the kind has no natural key, a key field is
    /// missing from `fields`, or no record matches.
    pub fn find_by_natural_key(&self, kind: RecordKind, fields: &Fields) -> Option<Record> {
        let key_fields = self.key_fields(kind);
        let key = natural_key(key_fields, fields)?;
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .find(|r| {
                r.is_active()
                    && r.kind() == kind
                    && natural_key(key_fields, r.fields()).as_ref() == Some(&key)
            })
            .cloned()
    }

    /// Applies `mutator` to the fields of an active record.
    ///
    /// The mutation is applied to a copy first; the stored record only
    /// changes if the result does not clash with another record's natural
    /// key. Returns `NOT_FOUND` for missing or deleted records and
    /// `DUPLICATE` for a clash.
    pub fn update<F>(&self, id: &RecordId, mutator: F) -> OperationOutcome
    where
        F: FnOnce(&mut Fields),
    {
        let mut inner = self.inner.lock();
        let (kind, mut fields) = match inner.records.get(id) {
            Some(r) if r.is_active() => (r.kind(), r.fields().clone()),
            _ => return StoreError::NotFound(*id).into(),
        };

        mutator(&mut fields);

        if let Some(key) = inner.find_key_clash(kind, self.key_fields(kind), &fields, Some(*id)) {
            return StoreError::Duplicate { kind, key }.into();
        }

        match inner.records.get_mut(id) {
            Some(record) => {
                *record.fields_mut() = fields;
                record.touch(Utc::now());
                tracing::debug!(record_id = %id, "record updated");
                OperationOutcome::success(format!("{} updated", kind), Some(*id))
            }
            None => StoreError::NotFound(*id).into(),
        }
    }

    /// Soft-deletes an active record.
    ///
    /// Returns `NOT_FOUND` if the record is missing or already deleted.
    pub fn delete(&self, id: &RecordId) -> OperationOutcome {
        let mut inner = self.inner.lock();
        match inner.records.get_mut(id) {
            Some(record) if record.is_active() => {
                record.mark_deleted(Utc::now());
                tracing::debug!(record_id = %id, "record deleted");
                OperationOutcome::success(format!("{} deleted", record.kind()), Some(*id))
            }
            _ => StoreError::NotFound(*id).into(),
        }
    }

    /// Returns the number of stored records, deleted ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Returns `true` if nothing was ever stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Returns the number of active records of `kind`.
    pub fn count_active(&self, kind: RecordKind) -> usize {
        self.inner
            .lock()
            .records
            .values()
            .filter(|r| r.is_active() && r.kind() == kind)
            .count()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
