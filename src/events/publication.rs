use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublicationError {
    #[error("{0} must not be absent")]
    MissingArgument(&'static str),
}

/// Identifies the listener a publication is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationTargetIdentifier(String);

impl PublicationTargetIdentifier {
    pub fn of(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationTargetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event addressed to one target, tracked until the target has handled it.
///
/// Completion happens at most once: the first completion date sticks.
#[derive(Debug)]
pub struct CompletableEventPublication<E> {
    event: Arc<E>,
    target: PublicationTargetIdentifier,
    publication_date: DateTime<Utc>,
    completion_date: Option<DateTime<Utc>>,
}

impl<E> Clone for CompletableEventPublication<E> {
    fn clone(&self) -> Self {
        Self {
            event: Arc::clone(&self.event),
            target: self.target.clone(),
            publication_date: self.publication_date,
            completion_date: self.completion_date,
        }
    }
}

impl<E> CompletableEventPublication<E> {
    /// A new, incomplete publication dated now.
    pub fn of(
        event: impl Into<Option<Arc<E>>>,
        target: impl Into<Option<PublicationTargetIdentifier>>,
    ) -> Result<Self, PublicationError> {
        Self::published_at(event, target, Utc::now())
    }

    pub fn published_at(
        event: impl Into<Option<Arc<E>>>,
        target: impl Into<Option<PublicationTargetIdentifier>>,
        publication_date: DateTime<Utc>,
    ) -> Result<Self, PublicationError> {
        let event = event
            .into()
            .ok_or(PublicationError::MissingArgument("Event"))?;
        let target = target
            .into()
            .ok_or(PublicationError::MissingArgument("TargetIdentifier"))?;

        Ok(Self {
            event,
            target,
            publication_date,
            completion_date: None,
        })
    }

    pub fn mark_completed(self) -> Self {
        self.mark_completed_at(Utc::now())
    }

    /// Complete at `instant` unless already completed.
    pub fn mark_completed_at(mut self, instant: DateTime<Utc>) -> Self {
        if self.completion_date.is_none() {
            self.completion_date = Some(instant);
        }
        self
    }

    pub fn is_publication_completed(&self) -> bool {
        self.completion_date.is_some()
    }

    pub fn completion_date(&self) -> Option<DateTime<Utc>> {
        self.completion_date
    }

    pub fn publication_date(&self) -> DateTime<Utc> {
        self.publication_date
    }

    pub fn event(&self) -> &Arc<E> {
        &self.event
    }

    pub fn target_identifier(&self) -> &PublicationTargetIdentifier {
        &self.target
    }

    /// Whether `event` is the very instance this publication carries.
    pub fn is_identical_event(&self, event: &Arc<E>) -> bool {
        Arc::ptr_eq(&self.event, event)
    }
}
