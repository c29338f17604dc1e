//! The owner-signed address book.
//!
//! The address book is the set of counterparties an owner has approved for
//! agent-proposed payments. It is replaced wholesale: the owner signs a
//! serialized entries payload, and the container persists the owner, the
//! *exact* signed string, the signature, and the parsed entries together.
//! A container that no longer verifies is worthless — the authorization
//! engine re-checks the signature before any monetary action.

use std::collections::BTreeMap;
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::proto::error::{AuthorizationError, StorageError};
use crate::timestamp::UnixTimestamp;

/// The persisted unit of address-book state.
///
/// Invariant: `recover_signer(signed_message, signature) == owner` held at
/// write time and is re-checked on every read that feeds a payment
/// authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBookContainer {
    /// The wallet address that signed this book.
    pub owner: Address,

    /// The exact string that was signed. Never re-serialized.
    pub signed_message: String,

    /// The 65-byte signature over `signed_message`.
    pub signature: Bytes,

    /// Approved counterparties, keyed by lowercased name.
    pub entries: BTreeMap<String, Address>,

    /// When the book was signed (from the payload) or stored (fallback).
    pub timestamp: UnixTimestamp,
}

impl AddressBookContainer {
    /// Looks up an approved counterparty by case-insensitive name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Address> {
        self.entries.get(&normalize_name(name)).copied()
    }
}

/// Lowercases and trims a lookup name.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parses a signed address-book payload into entries and an optional
/// embedded timestamp.
///
/// The payload must be a JSON object either containing an `"entries"`
/// mapping or being itself that mapping (every value an address string).
/// Callers MUST verify the signature over the raw string before calling
/// this: parsing unverified content would let unsigned structure pass
/// inspection.
///
/// # Errors
///
/// Returns [`AuthorizationError::MalformedPayload`] when the payload is not
/// a JSON object, the entries are not a mapping, or any entry value is not
/// a valid address.
pub fn parse_signed_entries(
    message: &str,
) -> Result<(BTreeMap<String, Address>, Option<UnixTimestamp>), AuthorizationError> {
    let value: serde_json::Value = serde_json::from_str(message)
        .map_err(|e| AuthorizationError::MalformedPayload(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| AuthorizationError::MalformedPayload("payload is not an object".into()))?;

    let timestamp = object
        .get("timestamp")
        .and_then(serde_json::Value::as_u64)
        .map(UnixTimestamp::from_secs);

    let raw_entries = match object.get("entries") {
        Some(entries) => entries.as_object().ok_or_else(|| {
            AuthorizationError::MalformedPayload("entries is not a mapping".into())
        })?,
        None => object,
    };

    let mut entries = BTreeMap::new();
    for (name, value) in raw_entries {
        let address = value
            .as_str()
            .and_then(|s| s.parse::<Address>().ok())
            .ok_or_else(|| {
                AuthorizationError::MalformedPayload(format!("entry '{name}' is not an address"))
            })?;
        entries.insert(normalize_name(name), address);
    }

    Ok((entries, timestamp))
}

/// Repository owning the single persisted address-book container.
///
/// Production backs this with an atomic-replace file; tests use
/// [`InMemoryBookRepository`].
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Loads the current container, if any.
    async fn load(&self) -> Result<Option<AddressBookContainer>, StorageError>;

    /// Replaces the stored container wholesale. No partial merges.
    async fn replace(&self, container: AddressBookContainer) -> Result<(), StorageError>;
}

/// In-memory book repository for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    inner: Mutex<Option<AddressBookContainer>>,
}

impl InMemoryBookRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn load(&self) -> Result<Option<AddressBookContainer>, StorageError> {
        Ok(self.inner.lock().expect("book lock poisoned").clone())
    }

    async fn replace(&self, container: AddressBookContainer) -> Result<(), StorageError> {
        *self.inner.lock().expect("book lock poisoned") = Some(container);
        Ok(())
    }
}
