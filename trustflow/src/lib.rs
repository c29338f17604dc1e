#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for policy-constrained agent payments.
//!
//! This crate provides the foundational types used throughout the TrustFlow
//! workspace. An autonomous agent may *propose* a stablecoin payment, but the
//! authorization engine only approves transfers to counterparties the owner
//! has signed into an address book, and only within the owner's spending
//! limits. The agent never holds signing authority; the engine's output is an
//! unsigned call description handed to an external wallet provider.
//!
//! The crate is deliberately I/O-free: persistence, networking, and chain
//! encoding live in sibling crates behind the traits defined here.
//!
//! # Modules
//!
//! - [`book`] - Owner-signed address book container and repository trait
//! - [`canonical`] - Deterministic JSON canonicalization for reproducible signatures
//! - [`policy`] - Spending policies, rolling spend windows, and their repositories
//! - [`proto`] - Wire format types and the denial taxonomy
//! - [`resolver`] - The unified approved-recipient resolution trait
//! - [`timestamp`] - Unix timestamps with day/week window helpers
//! - [`wallet`] - Downstream wallet-provider contract (broadcast is external)

pub mod book;
pub mod canonical;
pub mod policy;
pub mod proto;
pub mod resolver;
pub mod timestamp;
pub mod wallet;

pub use book::{AddressBookContainer, BookRepository};
pub use policy::{PolicyRepository, SpendLedger, SpendState, SpendingPolicy};
pub use proto::error::{AuthorizationError, DenialReason, StorageError};
pub use proto::{PaymentRequest, TokenAmount};
pub use resolver::{RecipientResolver, ResolveError};
pub use timestamp::UnixTimestamp;
