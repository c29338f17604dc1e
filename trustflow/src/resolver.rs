//! Approved-recipient resolution.
//!
//! Two address-book mechanisms exist for the same "approved counterparty"
//! concept: the owner-signed local container and the threshold secret store
//! spread across vault nodes. Both sit behind [`RecipientResolver`] so the
//! authorization engine is indifferent to the deployment variant.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::proto::error::AuthorizationError;

/// Resolves an approved counterparty name to its payment address.
///
/// `Ok(None)` means the name is not approved — including the case where no
/// storage node returned data. Errors are reserved for integrity and
/// infrastructure failures, never for a plain miss.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// Resolves `name` (case-insensitive) to an address.
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError>;
}

/// Failures while resolving a recipient.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No signed address book is stored (signed-book backend only).
    #[error("no signed address book available")]
    BookUnavailable,

    /// The stored book no longer verifies against its signature.
    #[error("stored address book failed signature re-verification")]
    BookInvalid,

    /// Threshold share reconstruction failed.
    #[error("share reconstruction failed: {0}")]
    Decryption(String),

    /// The persistence layer failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<ResolveError> for AuthorizationError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::BookUnavailable => Self::AddressBookUnavailable,
            ResolveError::BookInvalid => Self::AddressBookInvalid,
            ResolveError::Decryption(msg) => Self::DecryptionFailed(msg),
            ResolveError::Storage(msg) => Self::Storage(msg),
        }
    }
}
