//! Downstream wallet-provider contract.
//!
//! The authorization engine never broadcasts. An engine-approved call is
//! handed to a wallet provider that holds the actual signing authority;
//! this trait pins down the surface that collaborator must expose.

use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;

/// A transaction identifier returned by the wallet provider.
pub type TxId = B256;

/// Minimal receipt surface the engine's callers rely on.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// The transaction this receipt belongs to.
    pub tx_id: TxId,
    /// Whether the transaction succeeded on-chain.
    pub success: bool,
}

/// The external collaborator that signs and broadcasts engine-approved calls.
///
/// Implementations live outside this workspace; the engine only ever
/// produces the `(to, calldata)` pair they consume.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Error type surfaced by the provider.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs and broadcasts a call to `to` with `calldata`.
    async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<TxId, Self::Error>;

    /// Waits for the receipt of a previously sent transaction.
    async fn wait_for_transaction_receipt(&self, tx_id: TxId) -> Result<TxReceipt, Self::Error>;
}
