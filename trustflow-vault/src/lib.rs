#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Threshold secret-store client for encrypted recipient resolution.
//!
//! Approved-counterparty addresses can be kept secret-shared across a
//! cluster of storage nodes instead of (or alongside) the owner-signed local
//! book. Each node holds an opaque share set for a `(agent, name)` key;
//! reconstruction XOR-combines the shares back into the plaintext address.
//!
//! # Modules
//!
//! - [`client`] - per-node read protocol with bounded timeouts
//! - [`threshold`] - share split/combine primitives
//! - [`resolver`] - the [`RecipientResolver`](trustflow::resolver::RecipientResolver)
//!   implementation with configurable read consistency
//!
//! A slow or unreachable node never fails a whole request: its response is
//! treated as "no share from that node" and the consistency policy decides
//! whether resolution can proceed.

pub mod client;
pub mod resolver;
pub mod threshold;

pub use client::{NodeConfig, VaultClient};
pub use resolver::{ReadConsistency, VaultRecipientResolver};
