//! The denial taxonomy for payment authorization.
//!
//! Every failure is terminal for its request and reported verbatim to the
//! caller as a structured denial. None are retried by the engine: each
//! reflects bad input or a deliberate trust-boundary refusal, not a
//! transient fault. The human-readable messages are written to drive
//! remediation (add the recipient, raise the cap) without leaking internals.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// A persistence-layer failure, surfaced verbatim from a repository.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StorageError(pub String);

impl From<StorageError> for AuthorizationError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value.0)
    }
}

/// Errors that deny a payment authorization or a store write.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthorizationError {
    /// The request body is missing fields or has the wrong shape.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The signed message does not contain an entries mapping.
    #[error("signed payload is not an entries object: {0}")]
    MalformedPayload(String),

    /// The signature could not be parsed or recovered.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// The recovered signer does not match the claimed owner.
    #[error("signature does not match owner")]
    SignatureMismatch,

    /// The caller is not the verified owner of the address book.
    #[error("owner must match the signed address book owner")]
    Unauthorized,

    /// No signed address book is currently stored.
    #[error("address book missing or unsigned")]
    AddressBookUnavailable,

    /// The stored address book no longer verifies against its signature.
    #[error("stored address book failed signature re-verification")]
    AddressBookInvalid,

    /// The recipient name is not in the approved address book.
    #[error("recipient '{0}' is not an approved counterparty")]
    RecipientNotApproved(String),

    /// No spending policy exists for the proposing agent.
    #[error("no active policy for agent {0}")]
    NoActivePolicy(Address),

    /// The amount exceeds the per-transaction ceiling.
    #[error("amount exceeds per-transaction limit")]
    PerTransactionLimitExceeded,

    /// The amount would exceed the rolling daily cap.
    #[error("amount exceeds remaining daily allowance")]
    DailyLimitExceeded,

    /// The amount would exceed the rolling weekly cap.
    #[error("amount exceeds remaining weekly allowance")]
    WeeklyLimitExceeded,

    /// Threshold share reconstruction failed.
    #[error("recipient share reconstruction failed: {0}")]
    DecryptionFailed(String),

    /// The persistence layer failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl AuthorizationError {
    /// Returns the machine-readable reason code for this denial.
    #[must_use]
    pub const fn reason(&self) -> DenialReason {
        match self {
            Self::MalformedRequest(_) => DenialReason::MalformedRequest,
            Self::MalformedPayload(_) => DenialReason::MalformedPayload,
            Self::InvalidSignatureFormat(_) => DenialReason::InvalidSignatureFormat,
            Self::SignatureMismatch => DenialReason::SignatureMismatch,
            Self::Unauthorized => DenialReason::Unauthorized,
            Self::AddressBookUnavailable => DenialReason::AddressBookUnavailable,
            Self::AddressBookInvalid => DenialReason::AddressBookInvalid,
            Self::RecipientNotApproved(_) => DenialReason::RecipientNotApproved,
            Self::NoActivePolicy(_) => DenialReason::NoActivePolicy,
            Self::PerTransactionLimitExceeded => DenialReason::PerTransactionLimitExceeded,
            Self::DailyLimitExceeded => DenialReason::DailyLimitExceeded,
            Self::WeeklyLimitExceeded => DenialReason::WeeklyLimitExceeded,
            Self::DecryptionFailed(_) => DenialReason::DecryptionFailed,
            Self::Storage(_) => DenialReason::Storage,
        }
    }
}

/// Machine-readable reason codes for denials.
///
/// These travel alongside the human-readable message so clients can handle
/// failure classes programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DenialReason {
    /// Request body missing fields or malformed.
    MalformedRequest,
    /// Signed payload did not parse as an entries object.
    MalformedPayload,
    /// Signature unparseable or unrecoverable.
    InvalidSignatureFormat,
    /// Recovered signer differs from the claimed owner.
    SignatureMismatch,
    /// Caller is not the verified book owner.
    Unauthorized,
    /// No signed address book stored.
    AddressBookUnavailable,
    /// Stored book fails re-verification.
    AddressBookInvalid,
    /// Recipient name not approved.
    RecipientNotApproved,
    /// No policy for the agent.
    NoActivePolicy,
    /// Per-transaction ceiling exceeded.
    PerTransactionLimitExceeded,
    /// Daily cap exceeded.
    DailyLimitExceeded,
    /// Weekly cap exceeded.
    WeeklyLimitExceeded,
    /// Share reconstruction failed.
    DecryptionFailed,
    /// Persistence failure.
    Storage,
}

impl DenialReason {
    /// Returns the `snake_case` string representation matching the wire format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::MalformedPayload => "malformed_payload",
            Self::InvalidSignatureFormat => "invalid_signature_format",
            Self::SignatureMismatch => "signature_mismatch",
            Self::Unauthorized => "unauthorized",
            Self::AddressBookUnavailable => "address_book_unavailable",
            Self::AddressBookInvalid => "address_book_invalid",
            Self::RecipientNotApproved => "recipient_not_approved",
            Self::NoActivePolicy => "no_active_policy",
            Self::PerTransactionLimitExceeded => "per_transaction_limit_exceeded",
            Self::DailyLimitExceeded => "daily_limit_exceeded",
            Self::WeeklyLimitExceeded => "weekly_limit_exceeded",
            Self::DecryptionFailed => "decryption_failed",
            Self::Storage => "storage",
        }
    }
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
