use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Failed to (de)serialize event: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored event type {found} does not match {expected}")]
    TypeMismatch { expected: String, found: String },
}

/// Converts events to and from the bytes a publication store persists.
pub trait EventSerializer<E>: Send + Sync {
    fn serialize(&self, event: &E) -> Result<Vec<u8>, SerializationError>;

    /// Decode `bytes` recorded under the `event_type` discriminator.
    fn deserialize(&self, bytes: &[u8], event_type: &str) -> Result<E, SerializationError>;

    /// Discriminator stored alongside serialized events.
    fn event_type(&self, event: &E) -> String;
}

/// JSON serializer keyed by the Rust type name.
pub struct JsonEventSerializer<E> {
    _event: PhantomData<fn() -> E>,
}

impl<E> JsonEventSerializer<E> {
    pub fn new() -> Self {
        Self {
            _event: PhantomData,
        }
    }
}

impl<E> Default for JsonEventSerializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventSerializer<E> for JsonEventSerializer<E>
where
    E: Serialize + DeserializeOwned,
{
    fn serialize(&self, event: &E) -> Result<Vec<u8>, SerializationError> {
        Ok(serde_json::to_vec(event)?)
    }

    fn deserialize(&self, bytes: &[u8], event_type: &str) -> Result<E, SerializationError> {
        let expected = std::any::type_name::<E>();
        if event_type != expected {
            return Err(SerializationError::TypeMismatch {
                expected: expected.to_string(),
                found: event_type.to_string(),
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    fn event_type(&self, _event: &E) -> String {
        std::any::type_name::<E>().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OrderCompleted {
        order_id: u32,
    }

    #[test]
    fn test_rejects_foreign_discriminator() {
        let serializer = JsonEventSerializer::<OrderCompleted>::new();
        let bytes = serializer.serialize(&OrderCompleted { order_id: 7 }).unwrap();

        let err = serializer.deserialize(&bytes, "other::Event").unwrap_err();
        assert!(matches!(err, SerializationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_rejects_corrupt_payload() {
        let serializer = JsonEventSerializer::<OrderCompleted>::new();
        let event_type = serializer.event_type(&OrderCompleted { order_id: 7 });

        let err = serializer.deserialize(b"{not json", &event_type).unwrap_err();
        assert!(matches!(err, SerializationError::Json(_)));
    }

    #[test]
    fn test_decodes_own_payload() {
        let serializer = JsonEventSerializer::<OrderCompleted>::new();
        let event = OrderCompleted { order_id: 7 };
        let bytes = serializer.serialize(&event).unwrap();

        let decoded = serializer
            .deserialize(&bytes, &serializer.event_type(&event))
            .unwrap();
        assert_eq!(decoded, event);
    }
}
