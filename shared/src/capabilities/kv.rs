use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;

pub const MAX_KEY_LENGTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyNamespace {
    Session,
}

impl KeyNamespace {
    pub fn prefix(&self) -> &str {
        match self {
            KeyNamespace::Session => "session",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey {
    namespace: KeyNamespace,
    key: String,
}

impl KvKey {
    pub fn new(namespace: KeyNamespace, key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self { namespace, key })
    }

    /// The per-user "welcome dialog already shown" flag.
    pub fn welcome(user_id: &UserId) -> Result<Self, KvError> {
        Self::new(KeyNamespace::Session, format!("welcome_{}", user_id.as_str()))
    }

    pub fn raw(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.key)
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        let invalid = |reason: &str| KvError::InvalidKey {
            key: key.chars().take(50).collect(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(invalid("key exceeds maximum length"));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(invalid("key cannot contain path segments"));
        }
        if key.chars().any(char::is_control) {
            return Err(invalid("key contains control characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },
}

pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, KvError> {
    serde_json::to_vec(value).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })
}

pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KvError> {
    serde_json::from_slice(bytes).map_err(|e| KvError::Serialization {
        message: e.to_string(),
    })
}

/// Any stored value counts as "seen"; the flag is never written false.
pub fn flag_is_set(stored: Option<&[u8]>) -> bool {
    match stored {
        None => false,
        Some(bytes) => decode_value::<bool>(bytes).unwrap_or(true),
    }
}
