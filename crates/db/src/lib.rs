//! Document store capability for KitabCorner.
//!
//! A store is addressed by collection name and assigns document ids itself.
//! Two backends are provided: [`MemoryStore`] for local development and tests,
//! and [`FirestoreStore`] speaking the Cloud Firestore REST API.

pub mod firestore;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::{MemoryStore, StoredDocument};

const AUTO_ID_LEN: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Errors that can occur while writing to a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Errors returned by the backing service.
    #[error("API error: {0}")]
    Api(String),
    /// Wrapper for `serde_json::Error`.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Credentials could not be loaded or no token could be obtained.
    #[error("authentication error: {0}")]
    Auth(String),
    /// Server time could not be rendered.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// A single field value written to a document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(serde_json::Value),
    /// Resolved by the store to its own clock at write time.
    ServerTimestamp,
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Value(value.into())
    }
}

/// Field map of a document about to be created.
pub type Fields = BTreeMap<String, FieldValue>;

/// Capability to create documents in a schemaless store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new document in `collection` and return its generated id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
}

/// Generate a 20 character alphanumeric document id.
///
/// Random bytes come from v4 UUIDs with the version (6) and variant (8)
/// bytes skipped. Bytes at or above the largest multiple of 62 are rejected
/// so every character is equally likely.
pub fn auto_id() -> String {
    let mut id = String::with_capacity(AUTO_ID_LEN);
    while id.len() < AUTO_ID_LEN {
        let uuid = uuid::Uuid::new_v4();
        let random = uuid
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 6 && *i != 8)
            .filter_map(|(_, b)| alphabet_char(*b));
        for c in random {
            if id.len() == AUTO_ID_LEN {
                break;
            }
            id.push(c);
        }
    }
    id
}

fn alphabet_char(byte: u8) -> Option<char> {
    let len = AUTO_ID_ALPHABET.len();
    let limit = 256 - 256 % len;
    let index = usize::from(byte);
    (index < limit).then(|| AUTO_ID_ALPHABET[index % len] as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_ids_are_alphanumeric_and_distinct() {
        let first = auto_id();
        let second = auto_id();

        assert_eq!(first.len(), AUTO_ID_LEN);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn bytes_above_last_full_alphabet_cycle_are_rejected() {
        assert_eq!(alphabet_char(0), Some('A'));
        assert_eq!(alphabet_char(61), Some('9'));
        assert_eq!(alphabet_char(62), Some('A'));
        assert_eq!(alphabet_char(247), Some('9'));
        assert_eq!(alphabet_char(248), None);
        assert_eq!(alphabet_char(255), None);
    }

    #[test]
    fn auto_ids_cover_the_whole_alphabet() {
        let seen: std::collections::HashSet<char> =
            (0..500).flat_map(|_| auto_id().chars().collect::<Vec<_>>()).collect();

        assert_eq!(seen.len(), AUTO_ID_ALPHABET.len());
    }

    #[test]
    fn field_value_conversions() {
        assert_eq!(
            FieldValue::from("Dune"),
            FieldValue::Value(serde_json::json!("Dune"))
        );
        assert_eq!(
            FieldValue::from(1965_i64),
            FieldValue::Value(serde_json::json!(1965))
        );
    }
}
