//! Serializer module: encodes comparison values the way documents are stored.

use crate::types::LiteralValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("value has no JSON form: {0:?}")]
    Unrepresentable(LiteralValue),
    #[error("failed to encode value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Converts a runtime value into the document store's serialized form.
///
/// Implementations must be deterministic: encoding the same value twice
/// yields identical output.
pub trait Serializer: Send + Sync {
    fn encode(&self, value: &LiteralValue) -> Result<String, SerializeError>;
}

/// Compact JSON, matching how documents land in a `jsonb` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, value: &LiteralValue) -> Result<String, SerializeError> {
        let json = value
            .to_json()
            .ok_or_else(|| SerializeError::Unrepresentable(value.clone()))?;
        Ok(serde_json::to_string(&json)?)
    }
}
