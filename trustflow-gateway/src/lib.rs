#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The TrustFlow authorization gateway.
//!
//! A small axum service exposing the three owner/agent operations:
//!
//! - `POST /addressbook` — replace the owner-signed address book
//! - `POST /policy` — configure an agent's spending limits (owner-gated)
//! - `POST /authorize` — run a proposed payment through the authorization
//!   engine and return the simulated executor call
//!
//! State lives in two flat JSON documents replaced atomically on write.
//! Nothing here signs or broadcasts; the gateway's job ends at a verified,
//! policy-checked `(to, calldata)` pair.

pub mod config;
pub mod error;
pub mod handlers;
pub mod storage;
