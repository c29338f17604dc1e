//! Recipient resolution from the owner-signed local book.
//!
//! Save-time verification is not enough for money movement: a container
//! tampered with on disk after write would still resolve. This resolver
//! re-runs signature recovery on every resolve, so a stale or corrupted
//! container denies instead of paying.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use trustflow::book::BookRepository;
use trustflow::resolver::{RecipientResolver, ResolveError};

use crate::verify::recover_personal_signer_raw;

/// [`RecipientResolver`] backed by the signed address-book container.
#[derive(Clone)]
pub struct SignedBookResolver {
    books: Arc<dyn BookRepository>,
}

impl std::fmt::Debug for SignedBookResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedBookResolver").finish_non_exhaustive()
    }
}

impl SignedBookResolver {
    /// Creates a resolver over the given book repository.
    #[must_use]
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl RecipientResolver for SignedBookResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        let container = self
            .books
            .load()
            .await
            .map_err(|e| ResolveError::Storage(e.to_string()))?
            .ok_or(ResolveError::BookUnavailable)?;

        let recovered =
            recover_personal_signer_raw(&container.signed_message, &container.signature)
                .map_err(|_| ResolveError::BookInvalid)?;
        if recovered != container.owner {
            tracing::warn!(
                owner = %container.owner,
                recovered = %recovered,
                "stored address book failed re-verification"
            );
            return Err(ResolveError::BookInvalid);
        }

        Ok(container.resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use trustflow::book::InMemoryBookRepository;
    use trustflow::timestamp::UnixTimestamp;

    use crate::verify::verify_and_build_container;

    async fn seeded_repository(message: &str) -> (PrivateKeySigner, Arc<InMemoryBookRepository>) {
        let signer = PrivateKeySigner::random();
        let signature = hex::encode_prefixed(
            signer.sign_message_sync(message.as_bytes()).unwrap().as_bytes(),
        );
        let container = verify_and_build_container(
            signer.address(),
            message,
            &signature,
            UnixTimestamp::from_secs(0),
        )
        .unwrap();

        let repo = Arc::new(InMemoryBookRepository::new());
        repo.replace(container).await.unwrap();
        (signer, repo)
    }

    #[tokio::test]
    async fn test_resolves_approved_name() {
        let message = r#"{"entries":{"designer":"0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"}}"#;
        let (_, repo) = seeded_repository(message).await;

        let resolver = SignedBookResolver::new(repo);
        let address = resolver.resolve("Designer").await.unwrap();
        assert!(address.is_some());
    }

    #[tokio::test]
    async fn test_unknown_name_is_a_miss() {
        let message = r#"{"entries":{"designer":"0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"}}"#;
        let (_, repo) = seeded_repository(message).await;

        let resolver = SignedBookResolver::new(repo);
        assert!(resolver.resolve("plumber").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_repository_is_book_unavailable() {
        let resolver = SignedBookResolver::new(Arc::new(InMemoryBookRepository::new()));
        let err = resolver.resolve("designer").await.unwrap_err();
        assert!(matches!(err, ResolveError::BookUnavailable));
    }

    #[tokio::test]
    async fn test_tampered_message_denies_with_book_invalid() {
        let message = r#"{"entries":{"designer":"0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"}}"#;
        let (_, repo) = seeded_repository(message).await;

        // Flip a byte of the stored signed message without re-signing.
        let mut container = repo.load().await.unwrap().unwrap();
        container.signed_message = container.signed_message.replace("designer", "attacker");
        repo.replace(container).await.unwrap();

        let resolver = SignedBookResolver::new(repo);
        let err = resolver.resolve("attacker").await.unwrap_err();
        assert!(matches!(err, ResolveError::BookInvalid));
    }
}
