//! ABI encoding against the policy-executor contract.
//!
//! The executor is the only contract that can actually move funds; the
//! engine hands its callers a deterministic `executePayment` call and
//! nothing else. `getSpendState` is part of the same fixed interface and is
//! how on-chain accounting mirrors the local spend ledger.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};

sol!(
    /// The on-chain policy executor.
    ///
    /// Funds only move through `executePayment`, which the contract gates by
    /// its own recorded policies; `getSpendState` exposes the rolling spend
    /// windows per agent.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IPolicyExecutor {
        function executePayment(address recipient, uint256 amount);
        function getSpendState(address agent)
            external
            view
            returns (uint256 spentToday, uint256 spentThisWeek, uint64 lastDay, uint64 lastWeek);
    }
);

/// A fully encoded, unsigned call against the policy executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCall {
    /// The policy-executor contract address.
    pub to: Address,

    /// ABI-encoded `executePayment(recipient, amount)` calldata.
    pub calldata: Bytes,
}

/// Deterministically encodes `executePayment(recipient, amount)`.
#[must_use]
pub fn encode_execute_payment(executor: Address, recipient: Address, amount: U256) -> PaymentCall {
    let call = IPolicyExecutor::executePaymentCall { recipient, amount };
    PaymentCall {
        to: executor,
        calldata: Bytes::from(call.abi_encode()),
    }
}
