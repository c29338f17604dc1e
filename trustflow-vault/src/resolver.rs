//! Recipient resolution from the secret-store cluster.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;

use trustflow::resolver::{RecipientResolver, ResolveError};

use crate::client::VaultClient;
use crate::threshold::combine_shares;

/// How many node responses must agree before reconstruction.
///
/// The cluster stores the same share set on every node, so a single
/// response is sufficient to reconstruct — but accepting the first responder
/// trusts that one node not to lie. `Quorum(n)` requires `n` byte-identical
/// responses; `Quorum(cluster size)` is full agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConsistency {
    /// Take the first non-empty response in configuration order.
    #[default]
    FirstAvailable,

    /// Require at least this many byte-identical non-empty responses.
    Quorum(usize),
}

/// [`RecipientResolver`] backed by the threshold secret store.
#[derive(Debug, Clone)]
pub struct VaultRecipientResolver {
    client: VaultClient,
    consistency: ReadConsistency,
}

impl VaultRecipientResolver {
    /// Creates a resolver with the given read-consistency policy.
    #[must_use]
    pub const fn new(client: VaultClient, consistency: ReadConsistency) -> Self {
        Self {
            client,
            consistency,
        }
    }

    /// Applies the consistency policy to the per-node responses.
    fn select_share_set(&self, responses: Vec<Option<String>>) -> Option<String> {
        match self.consistency {
            ReadConsistency::FirstAvailable => responses.into_iter().flatten().next(),
            ReadConsistency::Quorum(required) => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                // First pass records arrival order via the map entry; the
                // winner is whichever value reaches the quorum.
                for share_set in responses.into_iter().flatten() {
                    let count = counts.entry(share_set.clone()).or_insert(0);
                    *count += 1;
                    if *count >= required {
                        return Some(share_set);
                    }
                }
                None
            }
        }
    }
}

#[async_trait]
impl RecipientResolver for VaultRecipientResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        let responses = self.client.read_share_sets(name).await;
        let answered = responses.iter().filter(|r| r.is_some()).count();

        let Some(share_set) = self.select_share_set(responses) else {
            tracing::debug!(name, answered, "no usable share set for recipient");
            return Ok(None);
        };

        let shares: Vec<&str> = share_set.split(',').collect();
        let plaintext =
            combine_shares(&shares).map_err(|e| ResolveError::Decryption(e.to_string()))?;
        let address = plaintext.trim().parse::<Address>().map_err(|_| {
            ResolveError::Decryption("reconstructed value is not an address".into())
        })?;

        Ok(Some(address))
    }
}
