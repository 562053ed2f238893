//! Event publication tracking.
//!
//! Every event handed to a listener is recorded as a publication until the
//! listener reports completion. Publications still incomplete after a crash
//! can be found and resubmitted with [`EventPublicationRegistry::recover`].

mod publication;
mod registry;
mod serializer;
mod store;

pub use publication::{CompletableEventPublication, PublicationError, PublicationTargetIdentifier};
pub use registry::{
    EventPublicationRegistry, IncompletePublication, IncompletePublications, PublicationHandle,
    RecoveryReport, RegistryError,
};
pub use serializer::{EventSerializer, JsonEventSerializer, SerializationError};
pub use store::{InMemoryPublicationStore, PublicationEntry, PublicationStore, StoreError};
