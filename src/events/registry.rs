use super::publication::{
    CompletableEventPublication, PublicationError, PublicationTargetIdentifier,
};
use super::serializer::{EventSerializer, SerializationError};
use super::store::{PublicationEntry, PublicationStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Publication {0} not found")]
    NotFound(Uuid),
    #[error("Publication {0} already exists")]
    DuplicateIdentifier(Uuid),
    #[error("Publication {id} cannot be decoded: {source}")]
    Serialization {
        id: Uuid,
        #[source]
        source: SerializationError,
    },
    #[error("Failed to encode event: {0}")]
    Encoding(#[source] SerializationError),
    #[error("Storage error: {0}")]
    Storage(StoreError),
    #[error(transparent)]
    Publication(#[from] PublicationError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::DuplicateIdentifier(id) => Self::DuplicateIdentifier(id),
            other => Self::Storage(other),
        }
    }
}

/// Reference to a stored publication, handed back by
/// [`EventPublicationRegistry::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationHandle {
    pub id: Uuid,
    pub target: PublicationTargetIdentifier,
    pub publication_date: DateTime<Utc>,
}

/// An incomplete publication decoded from the store.
#[derive(Debug)]
pub struct IncompletePublication<E> {
    pub id: Uuid,
    pub publication: CompletableEventPublication<E>,
}

impl<E> IncompletePublication<E> {
    pub fn handle(&self) -> PublicationHandle {
        PublicationHandle {
            id: self.id,
            target: self.publication.target_identifier().clone(),
            publication_date: self.publication.publication_date(),
        }
    }
}

/// Outcome of a [`EventPublicationRegistry::recover`] sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub resubmitted: usize,
    pub completed: usize,
    pub failed: usize,
    /// Entries whose payload could not be decoded.
    pub poisoned: usize,
}

/// Records which events were handed to which targets and tracks their
/// completion, so incomplete work survives a crash and can be resubmitted.
pub struct EventPublicationRegistry<E> {
    store: Arc<dyn PublicationStore>,
    serializer: Arc<dyn EventSerializer<E>>,
}

impl<E> Clone for EventPublicationRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            serializer: Arc::clone(&self.serializer),
        }
    }
}

impl<E> fmt::Debug for EventPublicationRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublicationRegistry").finish_non_exhaustive()
    }
}

impl<E> EventPublicationRegistry<E> {
    pub fn new(store: Arc<dyn PublicationStore>, serializer: Arc<dyn EventSerializer<E>>) -> Self {
        Self { store, serializer }
    }

    /// Persist an incomplete publication of `event` for `target`.
    pub fn store(
        &self,
        event: &E,
        target: PublicationTargetIdentifier,
    ) -> Result<PublicationHandle, RegistryError> {
        let bytes = self
            .serializer
            .serialize(event)
            .map_err(RegistryError::Encoding)?;
        let entry = PublicationEntry::new(self.serializer.event_type(event), bytes, target);
        let handle = PublicationHandle {
            id: entry.id,
            target: entry.target.clone(),
            publication_date: entry.publication_date,
        };

        self.store.insert(entry)?;
        tracing::debug!(id = %handle.id, target = %handle.target, "stored event publication");
        Ok(handle)
    }

    /// Idempotent; a repeated call keeps the first completion date.
    pub fn mark_completed(&self, handle: &PublicationHandle) -> Result<(), RegistryError> {
        self.mark_completed_at(handle, Utc::now())
    }

    pub fn mark_completed_at(
        &self,
        handle: &PublicationHandle,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        self.store.mark_completed(handle.id, at)?;
        tracing::debug!(id = %handle.id, target = %handle.target, "completed event publication");
        Ok(())
    }

    /// Lazily walk incomplete publications, oldest first.
    ///
    /// Each entry is re-read right before it is yielded, so publications
    /// completed concurrently are skipped. A payload that cannot be decoded
    /// yields a [`RegistryError::Serialization`] item and iteration continues.
    pub fn find_incomplete(&self) -> Result<IncompletePublications<'_, E>, RegistryError> {
        let pending = self.store.find_incomplete_ids()?;
        Ok(IncompletePublications {
            registry: self,
            pending: pending.into_iter(),
        })
    }

    /// Remove publications completed strictly before `before`.
    pub fn delete_completed(&self, before: DateTime<Utc>) -> Result<usize, RegistryError> {
        let deleted = self.store.delete_completed_before(before)?;
        tracing::info!(deleted, cutoff = %before, "deleted completed event publications");
        Ok(deleted)
    }

    /// Resubmit every incomplete publication to `dispatch`, completing those
    /// it handles. Undecodable entries are logged and skipped.
    pub fn recover<F, D>(&self, mut dispatch: F) -> Result<RecoveryReport, RegistryError>
    where
        F: FnMut(&CompletableEventPublication<E>) -> Result<(), D>,
        D: fmt::Display,
    {
        let mut report = RecoveryReport::default();

        for item in self.find_incomplete()? {
            let incomplete = match item {
                Ok(incomplete) => incomplete,
                Err(RegistryError::Serialization { id, source }) => {
                    tracing::warn!(%id, error = %source, "skipping undecodable event publication");
                    report.poisoned += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            report.resubmitted += 1;
            match dispatch(&incomplete.publication) {
                Ok(()) => match self.mark_completed(&incomplete.handle()) {
                    Ok(()) => report.completed += 1,
                    // Removed by a concurrent cleanup, so it was completed elsewhere
                    Err(RegistryError::NotFound(id)) => {
                        tracing::debug!(%id, "publication vanished during recovery");
                    }
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    tracing::warn!(
                        id = %incomplete.id,
                        target = %incomplete.publication.target_identifier(),
                        error = %e,
                        "failed to resubmit event publication"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            resubmitted = report.resubmitted,
            completed = report.completed,
            failed = report.failed,
            poisoned = report.poisoned,
            "event publication recovery finished"
        );
        Ok(report)
    }

    fn decode(&self, entry: PublicationEntry) -> Result<IncompletePublication<E>, RegistryError> {
        let event = self
            .serializer
            .deserialize(&entry.serialized_event, &entry.event_type)
            .map_err(|source| RegistryError::Serialization {
                id: entry.id,
                source,
            })?;
        let publication = CompletableEventPublication::published_at(
            Arc::new(event),
            entry.target,
            entry.publication_date,
        )?;

        Ok(IncompletePublication {
            id: entry.id,
            publication,
        })
    }
}

/// Iterator returned by [`EventPublicationRegistry::find_incomplete`].
pub struct IncompletePublications<'r, E> {
    registry: &'r EventPublicationRegistry<E>,
    pending: std::vec::IntoIter<Uuid>,
}

impl<E> Iterator for IncompletePublications<'_, E> {
    type Item = Result<IncompletePublication<E>, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.pending.by_ref() {
            let current = match self.registry.store.find(id) {
                Ok(Some(current)) if !current.is_completed() => current,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            };
            return Some(self.registry.decode(current));
        }
        None
    }
}
