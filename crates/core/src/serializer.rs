//! Entity serialization capability used by the base caller

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Serializer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entity serialization failed: {0}")]
pub struct SerializationError(pub String);

/// Converts request payloads to bytes and response bodies back to values.
pub trait EntitySerializer: Send + Sync + fmt::Debug {
    /// Value of the `Content-Type` header sent with serialized payloads.
    fn content_type(&self) -> &str;

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializationError>;

    /// Decode a response body. An empty body decodes to `Value::Null`.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value, SerializationError>;
}

/// Default JSON serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEntitySerializer;

impl EntitySerializer for JsonEntitySerializer {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn serialize(&self, value: &Value) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(value).map_err(|e| SerializationError(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, SerializationError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes).map_err(|e| SerializationError(e.to_string()))
    }
}
