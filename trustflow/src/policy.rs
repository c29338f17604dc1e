//! Spending policies and the rolling spend ledger.
//!
//! A policy binds an agent address to three ceilings: per-transaction,
//! daily, and weekly, all in the token's smallest unit. Policies are
//! owner-gated (an agent cannot self-assign one) and replaced, never merged.
//!
//! The spend ledger mirrors the executor contract's `getSpendState` shape:
//! running totals with the epoch day/week they belong to, reset when the
//! window rolls over.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::proto::TokenAmount;
use crate::proto::error::StorageError;
use crate::timestamp::UnixTimestamp;

/// An agent's spending limits, keyed externally by agent address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPolicy {
    /// Ceiling for a single payment.
    pub max_per_tx: TokenAmount,

    /// Rolling daily ceiling.
    pub daily_cap: TokenAmount,

    /// Rolling weekly ceiling.
    pub weekly_cap: TokenAmount,
}

/// Running spend totals for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendState {
    /// Total authorized in the current epoch day.
    pub spent_today: TokenAmount,

    /// Total authorized in the current epoch week.
    pub spent_this_week: TokenAmount,

    /// Epoch day number `spent_today` belongs to.
    pub last_day: u64,

    /// Epoch week number `spent_this_week` belongs to.
    pub last_week: u64,
}

impl SpendState {
    /// A zeroed state anchored at `now`.
    #[must_use]
    pub const fn empty(now: UnixTimestamp) -> Self {
        Self {
            spent_today: TokenAmount::ZERO,
            spent_this_week: TokenAmount::ZERO,
            last_day: now.epoch_day(),
            last_week: now.epoch_week(),
        }
    }

    /// Rolls the windows forward to `now`, zeroing any total whose day or
    /// week boundary has passed.
    #[must_use]
    pub const fn rolled_to(mut self, now: UnixTimestamp) -> Self {
        if now.epoch_day() != self.last_day {
            self.spent_today = TokenAmount::ZERO;
            self.last_day = now.epoch_day();
        }
        if now.epoch_week() != self.last_week {
            self.spent_this_week = TokenAmount::ZERO;
            self.last_week = now.epoch_week();
        }
        self
    }

    /// Adds an authorized amount to both windows.
    ///
    /// Saturates at the numeric ceiling; the caps are checked before this is
    /// applied, so saturation can only make future checks stricter.
    #[must_use]
    pub fn recorded(mut self, amount: TokenAmount) -> Self {
        self.spent_today = TokenAmount(self.spent_today.0.saturating_add(amount.0));
        self.spent_this_week = TokenAmount(self.spent_this_week.0.saturating_add(amount.0));
        self
    }
}

/// Repository for per-agent spending policies.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Loads the policy bound to `agent`, if any.
    async fn load(&self, agent: Address) -> Result<Option<SpendingPolicy>, StorageError>;

    /// Replaces the policy entry for `agent`.
    async fn upsert(&self, agent: Address, policy: SpendingPolicy) -> Result<(), StorageError>;
}

/// Ledger of per-agent running spend totals.
#[async_trait]
pub trait SpendLedger: Send + Sync {
    /// Loads the agent's spend state, zeroed at `now` when absent.
    async fn load(&self, agent: Address, now: UnixTimestamp) -> Result<SpendState, StorageError>;

    /// Records an authorized amount against the agent's windows at `now`.
    async fn record(
        &self,
        agent: Address,
        amount: TokenAmount,
        now: UnixTimestamp,
    ) -> Result<(), StorageError>;
}

/// In-memory policy store and spend ledger for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: Mutex<HashMap<Address, SpendingPolicy>>,
    spend: Mutex<HashMap<Address, SpendState>>,
}

impl InMemoryPolicyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyStore {
    async fn load(&self, agent: Address) -> Result<Option<SpendingPolicy>, StorageError> {
        Ok(self.policies.lock().expect("policy lock poisoned").get(&agent).copied())
    }

    async fn upsert(&self, agent: Address, policy: SpendingPolicy) -> Result<(), StorageError> {
        self.policies
            .lock()
            .expect("policy lock poisoned")
            .insert(agent, policy);
        Ok(())
    }
}

#[async_trait]
impl SpendLedger for InMemoryPolicyStore {
    async fn load(&self, agent: Address, now: UnixTimestamp) -> Result<SpendState, StorageError> {
        let state = self
            .spend
            .lock()
            .expect("spend lock poisoned")
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
        let mut spend = self.spend.lock().expect("spend lock poisoned");
        let state = spend
            .get(&agent)
            .copied()
            .unwrap_or_else(|| SpendState::empty(now))
            .rolled_to(now)
            .recorded(amount);
        spend.insert(agent, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const AGENT: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    #[test]
    fn test_spend_state_rolls_daily_window() {
        let day_one = UnixTimestamp::from_secs(86_400);
        let day_two = UnixTimestamp::from_secs(2 * 86_400);

        let state = SpendState::empty(day_one).recorded(TokenAmount::from(300u64));
        assert_eq!(state.spent_today, TokenAmount::from(300u64));

        let rolled = state.rolled_to(day_two);
        assert_eq!(rolled.spent_today, TokenAmount::ZERO);
        // Same epoch week: the weekly total survives the day boundary.
        assert_eq!(rolled.spent_this_week, TokenAmount::from(300u64));
    }

    #[test]
    fn test_spend_state_rolls_weekly_window() {
        let week_zero = UnixTimestamp::from_secs(3 * 86_400);
        let week_one = UnixTimestamp::from_secs(8 * 86_400);

        let state = SpendState::empty(week_zero).recorded(TokenAmount::from(500u64));
        let rolled = state.rolled_to(week_one);
        assert_eq!(rolled.spent_this_week, TokenAmount::ZERO);
        assert_eq!(rolled.spent_today, TokenAmount::ZERO);
    }

    #[tokio::test]
    async fn test_in_memory_ledger_accumulates_within_day() {
        let store = InMemoryPolicyStore::new();
        let now = UnixTimestamp::from_secs(100 * 86_400);

        store.record(AGENT, TokenAmount::from(200u64), now).await.unwrap();
        store.record(AGENT, TokenAmount::from(50u64), now).await.unwrap();

        let state = SpendLedger::load(&store, AGENT, now).await.unwrap();
        assert_eq!(state.spent_today, TokenAmount::from(250u64));
        assert_eq!(state.spent_this_week, TokenAmount::from(250u64));
    }

    #[tokio::test]
    async fn test_policy_upsert_replaces_entry() {
        let store = InMemoryPolicyStore::new();
        let first = SpendingPolicy {
            max_per_tx: TokenAmount::from(100u64),
            daily_cap: TokenAmount::from(1_000u64),
            weekly_cap: TokenAmount::from(5_000u64),
        };
        let second = SpendingPolicy {
            max_per_tx: TokenAmount::from(1u64),
            ..first
        };

        store.upsert(AGENT, first).await.unwrap();
        store.upsert(AGENT, second).await.unwrap();

        let loaded = PolicyRepository::load(&store, AGENT).await.unwrap().unwrap();
        assert_eq!(loaded.max_per_tx, TokenAmount::from(1u64));
    }
}
