//! Wire format types for the TrustFlow HTTP surface.
//!
//! All monetary values travel as decimal strings in the token's smallest
//! unit. Floating point never appears in the money path.

pub mod error;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A token amount in the token's smallest unit.
///
/// # Serialization
///
/// Serialized as a decimal string (e.g. `"500000000000000000"`). For
/// compatibility with clients that send small amounts as bare JSON numbers,
/// deserialization also accepts a non-negative integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Returns the inner 256-bit value.
    #[must_use]
    pub const fn into_inner(self) -> U256 {
        self.0
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for TokenAmount {
    type Err = alloy_primitives::ruint::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s, 10).map(Self)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom("amount must be a non-negative decimal integer")),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(Self::from)
                .ok_or_else(|| serde::de::Error::custom("amount must be a non-negative integer")),
            _ => Err(serde::de::Error::custom(
                "amount must be a decimal string or non-negative integer",
            )),
        }
    }
}

/// An agent's proposed payment, as received on the wire.
///
/// Ephemeral: constructed per authorization call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Address-book name of the counterparty (case-insensitive).
    pub recipient_name: String,

    /// Amount in the token's smallest unit.
    pub amount: TokenAmount,

    /// The proposing agent's address.
    pub agent_address: Address,
}

/// Request body for replacing the owner-signed address book.
///
/// `message` is kept as a raw JSON value so the handler can reject
/// non-string payloads explicitly: the signature must be verified over the
/// exact string bytes the client claims were signed, never a re-serialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAddressBookRequest {
    /// Claimed owner address.
    pub owner: Address,

    /// The exact string that was signed (rejected if not a JSON string).
    pub message: serde_json::Value,

    /// Hex-encoded 65-byte signature over `message`.
    pub signature: String,
}

/// Request body for configuring an agent's spending policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePolicyRequest {
    /// The agent the policy binds.
    pub agent_address: Address,

    /// Per-transaction ceiling, smallest unit.
    pub max_per_tx_wei: TokenAmount,

    /// Rolling daily ceiling, smallest unit.
    pub daily_cap_wei: TokenAmount,

    /// Rolling weekly ceiling, smallest unit.
    pub weekly_cap_wei: TokenAmount,

    /// Caller claiming ownership; must match the signed book's owner.
    pub owner: Address,
}

/// Success response for an address-book write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookVerifiedResponse {
    /// Always `"verified"`.
    pub status: String,

    /// The recovered signer address.
    pub owner: Address,
}

/// Success response for a policy write, echoing the stored policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySavedResponse {
    /// Always `"saved"`.
    pub status: String,

    /// The agent the policy now binds.
    pub agent: Address,

    /// The stored limits.
    pub policy: crate::policy::SpendingPolicy,
}

/// A fully authorized, unsigned payment call.
///
/// Broadcast is the wallet provider's job; this service only ever simulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
    /// Always `"simulated"`.
    pub execution_mode: String,

    /// The policy-executor contract to call.
    pub to: Address,

    /// ABI-encoded `executePayment(recipient, amount)` calldata.
    pub calldata: Bytes,

    /// Human-readable reminder that nothing was broadcast.
    pub note: String,
}

impl AuthorizeResponse {
    /// Wraps an encoded call in the simulated-execution wire shape.
    #[must_use]
    pub fn simulated(to: Address, calldata: Bytes) -> Self {
        Self {
            execution_mode: "simulated".to_owned(),
            to,
            calldata,
            note: "This is a simulation. No transaction was broadcast.".to_owned(),
        }
    }
}
