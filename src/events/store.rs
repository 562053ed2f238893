use super::publication::PublicationTargetIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Publication {0} already exists")]
    DuplicateIdentifier(Uuid),
    #[error("Publication {0} not found")]
    NotFound(Uuid),
    #[error("Publication store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted form of one event publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEntry {
    pub id: Uuid,
    /// Discriminator the serializer needs to decode `serialized_event`.
    pub event_type: String,
    pub serialized_event: Vec<u8>,
    pub target: PublicationTargetIdentifier,
    pub publication_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
}

impl PublicationEntry {
    pub fn new(
        event_type: impl Into<String>,
        serialized_event: Vec<u8>,
        target: PublicationTargetIdentifier,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            serialized_event,
            target,
            publication_date: Utc::now(),
            completion_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }
}

/// Durable storage for publication entries.
///
/// Implementations must make `insert` and `mark_completed` atomic per entry
/// and safe to call from several threads at once.
pub trait PublicationStore: Send + Sync {
    /// Persist a new entry. Fails on an id that is already stored.
    fn insert(&self, entry: PublicationEntry) -> Result<(), StoreError>;

    /// Record completion at `at`. Completing an already completed entry keeps
    /// the original completion date and succeeds.
    fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    fn find(&self, id: Uuid) -> Result<Option<PublicationEntry>, StoreError>;

    /// Ids of incomplete entries by publication date, insertion order
    /// breaking ties. Entries are fetched one at a time through `find`.
    fn find_incomplete_ids(&self) -> Result<Vec<Uuid>, StoreError>;

    /// Remove entries completed strictly before `before`; returns how many.
    fn delete_completed_before(&self, before: DateTime<Utc>) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<Uuid, (u64, PublicationEntry)>,
    next_sequence: u64,
}

/// Process-local store, primarily for tests and single-node setups.
#[derive(Debug, Default)]
pub struct InMemoryPublicationStore {
    entries: RwLock<Entries>,
}

impl InMemoryPublicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Entries>, StoreError> {
        self.entries
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Entries>, StoreError> {
        self.entries
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl PublicationStore for InMemoryPublicationStore {
    fn insert(&self, entry: PublicationEntry) -> Result<(), StoreError> {
        let mut entries = self.write()?;
        if entries.by_id.contains_key(&entry.id) {
            return Err(StoreError::DuplicateIdentifier(entry.id));
        }
        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries.by_id.insert(entry.id, (sequence, entry));
        Ok(())
    }

    fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut entries = self.write()?;
        let (_, entry) = entries.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.completion_date.get_or_insert(at);
        Ok(())
    }

    fn find(&self, id: Uuid) -> Result<Option<PublicationEntry>, StoreError> {
        Ok(self.read()?.by_id.get(&id).map(|(_, e)| e.clone()))
    }

    fn find_incomplete_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let entries = self.read()?;
        let mut incomplete: Vec<_> = entries
            .by_id
            .values()
            .filter(|(_, e)| !e.is_completed())
            .collect();
        incomplete.sort_by_key(|(sequence, e)| (e.publication_date, *sequence));
        Ok(incomplete.into_iter().map(|(_, e)| e.id).collect())
    }

    fn delete_completed_before(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut entries = self.write()?;
        let count = entries.by_id.len();
        entries
            .by_id
            .retain(|_, (_, e)| e.completion_date.is_none_or(|done| done >= before));
        Ok(count - entries.by_id.len())
    }
}
