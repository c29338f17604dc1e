//! File-backed repositories.
//!
//! Two flat JSON documents, replaced wholesale on every write: the signed
//! address-book container and the policies file (which also carries the
//! spend ledger). Writes go to a temp file in the same directory followed by
//! an atomic rename, and every read-modify-write sequence holds the
//! single-writer lock, so an authorization can never observe a half-written
//! document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use trustflow::book::{AddressBookContainer, BookRepository};
use trustflow::policy::{PolicyRepository, SpendLedger, SpendState, SpendingPolicy};
use trustflow::proto::TokenAmount;
use trustflow::proto::error::StorageError;
use trustflow::timestamp::UnixTimestamp;

/// Name of the address-book document inside the data directory.
pub const ADDRESS_BOOK_FILE: &str = "addressbook.json";

/// Name of the policies document inside the data directory.
pub const POLICIES_FILE: &str = "policies.json";

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError(format!("{}: {e}", path.display()))),
    }
}

async fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| StorageError(format!("{}: {e}", path.display())))?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| StorageError(format!("{}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError(format!("{}: {e}", path.display())))
}

/// Address-book repository over `addressbook.json`.
#[derive(Debug)]
pub struct FileBookRepository {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileBookRepository {
    /// Creates a repository rooted in `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(ADDRESS_BOOK_FILE),
            lock: RwLock::new(()),
        }
    }
}

#[async_trait]
impl BookRepository for FileBookRepository {
    async fn load(&self) -> Result<Option<AddressBookContainer>, StorageError> {
        let _guard = self.lock.read().await;
        read_document(&self.path).await
    }

    async fn replace(&self, container: AddressBookContainer) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        write_document(&self.path, &container).await
    }
}

/// On-disk shape of the policies document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PolicyDocument {
    /// Agent address → spending limits.
    #[serde(default)]
    agents: BTreeMap<Address, SpendingPolicy>,

    /// Agent address → running spend windows.
    #[serde(default)]
    spend: BTreeMap<Address, SpendState>,
}

/// Policy store and spend ledger over `policies.json`.
#[derive(Debug)]
pub struct FilePolicyStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FilePolicyStore {
    /// Creates a store rooted in `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(POLICIES_FILE),
            lock: RwLock::new(()),
        }
    }

    async fn read(&self) -> Result<PolicyDocument, StorageError> {
        Ok(read_document(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl PolicyRepository for FilePolicyStore {
    async fn load(&self, agent: Address) -> Result<Option<SpendingPolicy>, StorageError> {
        let _guard = self.lock.read().await;
        Ok(self.read().await?.agents.get(&agent).copied())
    }

    async fn upsert(&self, agent: Address, policy: SpendingPolicy) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        let mut document = self.read().await?;
        document.agents.insert(agent, policy);
        write_document(&self.path, &document).await
    }
}

#[async_trait]
impl SpendLedger for FilePolicyStore {
    async fn load(&self, agent: Address, now: UnixTimestamp) -> Result<SpendState, StorageError> {
        let _guard = self.lock.read().await;
        let state = self
            .read()
            .await?
            .spend
            .get(&agent)
            .copied()
            .unwrap_or_else(|| SpendState::empty(now));
        Ok(state.rolled_to(now))
    }

    async fn record(
        &self,
        agent: Address,
        amount: TokenAmount,
        now: UnixTimestamp,
    ) -> Result<(), StorageError> {
        let _guard = self.lock.write().await;
        let mut document = self.read().await?;
        let state = document
            .spend
            .get(&agent)
            .copied()
            .unwrap_or_else(|| SpendState::empty(now))
            .rolled_to(now)
            .recorded(amount);
        document.spend.insert(agent, state);
        write_document(&self.path, &document).await
    }
}
