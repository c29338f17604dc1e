#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM support for TrustFlow payment authorization.
//!
//! This crate holds everything that touches Ethereum semantics:
//!
//! - [`verify`] - EIP-191 personal-message signature recovery and the
//!   verify-then-parse address-book write path
//! - [`executor`] - ABI encoding against the fixed policy-executor contract
//! - [`engine`] - the payment authorization state machine
//! - [`resolver`] - the signed-book recipient resolver (re-verifies on read)
//! - [`networks`] - known networks and stablecoin deployments
//!
//! Nothing here broadcasts. The engine's output is an unsigned
//! `(to, calldata)` pair for an external wallet provider.

pub mod engine;
pub mod executor;
pub mod networks;
pub mod resolver;
pub mod verify;

pub use engine::AuthorizationEngine;
pub use executor::{PaymentCall, encode_execute_payment};
pub use resolver::SignedBookResolver;
pub use verify::{recover_personal_signer, verify_and_build_container, verify_owner};
