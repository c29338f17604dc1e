//! The payment authorization engine.
//!
//! A request walks a fixed pipeline: shape check → recipient resolution →
//! policy load → limit checks → calldata encoding. Every denial is terminal
//! for that request; the caller must remediate (re-sign the book, raise a
//! cap) and resubmit. The engine holds no state of its own — it is a
//! function of the request, the current address book, and the current
//! policy, plus the spend ledger it records into on success.

use std::sync::Arc;

use alloy_primitives::Address;

use trustflow::policy::{PolicyRepository, SpendLedger};
use trustflow::proto::PaymentRequest;
use trustflow::proto::error::AuthorizationError;
use trustflow::resolver::RecipientResolver;
use trustflow::timestamp::UnixTimestamp;

use crate::executor::{PaymentCall, encode_execute_payment};

/// Authorizes agent-proposed payments against the owner's trust boundaries.
#[derive(Clone)]
pub struct AuthorizationEngine {
    recipients: Arc<dyn RecipientResolver>,
    policies: Arc<dyn PolicyRepository>,
    ledger: Arc<dyn SpendLedger>,
    executor: Address,
}

impl std::fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl AuthorizationEngine {
    /// Creates an engine over the given recipient backend, policy store,
    /// spend ledger, and policy-executor address.
    #[must_use]
    pub fn new(
        recipients: Arc<dyn RecipientResolver>,
        policies: Arc<dyn PolicyRepository>,
        ledger: Arc<dyn SpendLedger>,
        executor: Address,
    ) -> Self {
        Self {
            recipients,
            policies,
            ledger,
            executor,
        }
    }

    /// Authorizes a payment request, returning the encoded executor call.
    ///
    /// Never broadcasts. On success the authorized amount is recorded in the
    /// spend ledger so the daily and weekly windows account for it.
    ///
    /// # Errors
    ///
    /// Every variant of [`AuthorizationError`] is a terminal denial for this
    /// request; see the crate-level docs for the taxonomy.
    pub async fn authorize(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentCall, AuthorizationError> {
        if request.recipient_name.trim().is_empty() {
            return Err(AuthorizationError::MalformedRequest(
                "recipientName must not be empty".into(),
            ));
        }
        let amount = request.amount.0;
        let agent = request.agent_address;

        let recipient = self
            .recipients
            .resolve(&request.recipient_name)
            .await?
            .ok_or_else(|| {
                AuthorizationError::RecipientNotApproved(request.recipient_name.clone())
            })?;

        let policy = self
            .policies
            .load(agent)
            .await?
            .ok_or(AuthorizationError::NoActivePolicy(agent))?;

        if amount > policy.max_per_tx.0 {
            tracing::info!(%agent, %amount, limit = %policy.max_per_tx, "denied: per-transaction limit");
            return Err(AuthorizationError::PerTransactionLimitExceeded);
        }

        let now = UnixTimestamp::now();
        let spend = self.ledger.load(agent, now).await?;
        // checked_add: an overflowing running total can only mean the cap is
        // exceeded, never that the payment fits.
        match spend.spent_today.0.checked_add(amount) {
            Some(total) if total <= policy.daily_cap.0 => {}
            _ => {
                tracing::info!(%agent, %amount, cap = %policy.daily_cap, "denied: daily cap");
                return Err(AuthorizationError::DailyLimitExceeded);
            }
        }
        match spend.spent_this_week.0.checked_add(amount) {
            Some(total) if total <= policy.weekly_cap.0 => {}
            _ => {
                tracing::info!(%agent, %amount, cap = %policy.weekly_cap, "denied: weekly cap");
                return Err(AuthorizationError::WeeklyLimitExceeded);
            }
        }

        let call = encode_execute_payment(self.executor, recipient, amount);
        self.ledger.record(agent, request.amount, now).await?;

        tracing::info!(
            %agent,
            recipient = %recipient,
            %amount,
            to = %call.to,
            "payment authorized (simulated)"
        );
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address, hex};
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use alloy_sol_types::SolCall;

    use trustflow::book::{BookRepository, InMemoryBookRepository};
    use trustflow::policy::{InMemoryPolicyStore, SpendingPolicy};
    use trustflow::proto::TokenAmount;

    use crate::executor::IPolicyExecutor;
    use crate::resolver::SignedBookResolver;
    use crate::verify::verify_and_build_container;

    const EXECUTOR: Address = address!("0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08");
    const DESIGNER: Address = address!("0x8ccedbAe4916b79da7F3F612EfB2EB93A2bFD6cF");
    const AGENT: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    async fn engine_with_policy(policy: SpendingPolicy) -> AuthorizationEngine {
        let message = r#"{"entries":{"designer":"0x8ccedbAe4916b79da7F3F612EfB2EB93A2bFD6cF"}}"#;
        let signer = PrivateKeySigner::random();
        let signature = hex::encode_prefixed(
            signer.sign_message_sync(message.as_bytes()).unwrap().as_bytes(),
        );
        let container = verify_and_build_container(
            signer.address(),
            message,
            &signature,
            UnixTimestamp::from_secs(0),
        )
        .unwrap();

        let books = Arc::new(InMemoryBookRepository::new());
        books.replace(container).await.unwrap();

        let store = Arc::new(InMemoryPolicyStore::new());
        store.upsert(AGENT, policy).await.unwrap();

        AuthorizationEngine::new(
            Arc::new(SignedBookResolver::new(books)),
            Arc::clone(&store) as Arc<dyn PolicyRepository>,
            store,
            EXECUTOR,
        )
    }

    fn request(name: &str, amount: &str) -> PaymentRequest {
        PaymentRequest {
            recipient_name: name.to_owned(),
            amount: amount.parse().unwrap(),
            agent_address: AGENT,
        }
    }

    fn half_ether_policy() -> SpendingPolicy {
        SpendingPolicy {
            max_per_tx: "500000000000000000".parse().unwrap(),
            daily_cap: "2000000000000000000".parse().unwrap(),
            weekly_cap: "5000000000000000000".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_authorization_encodes_executor_call() {
        let engine = engine_with_policy(half_ether_policy()).await;

        let call = engine
            .authorize(&request("designer", "400000000000000000"))
            .await
            .unwrap();

        assert_eq!(call.to, EXECUTOR);
        let decoded = IPolicyExecutor::executePaymentCall::abi_decode(&call.calldata).unwrap();
        assert_eq!(decoded.recipient, DESIGNER);
        assert_eq!(decoded.amount, U256::from(400_000_000_000_000_000u64));
    }

    #[tokio::test]
    async fn test_amount_over_per_tx_limit_is_denied() {
        let engine = engine_with_policy(half_ether_policy()).await;

        let err = engine
            .authorize(&request("designer", "600000000000000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthorizationError::PerTransactionLimitExceeded));
    }

    #[tokio::test]
    async fn test_amount_exactly_at_limit_is_authorized() {
        let engine = engine_with_policy(SpendingPolicy {
            max_per_tx: TokenAmount::from(1000u64),
            daily_cap: TokenAmount::from(10_000u64),
            weekly_cap: TokenAmount::from(10_000u64),
        })
        .await;

        assert!(engine.authorize(&request("designer", "1000")).await.is_ok());
        let err = engine.authorize(&request("designer", "1001")).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::PerTransactionLimitExceeded));
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_denied() {
        let engine = engine_with_policy(half_ether_policy()).await;

        let err = engine.authorize(&request("plumber", "1")).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::RecipientNotApproved(name) if name == "plumber"));
    }

    #[tokio::test]
    async fn test_agent_without_policy_is_denied() {
        let engine = engine_with_policy(half_ether_policy()).await;

        let mut other = request("designer", "1");
        other.agent_address = Address::ZERO;
        let err = engine.authorize(&other).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::NoActivePolicy(_)));
    }

    #[tokio::test]
    async fn test_blank_recipient_name_is_malformed() {
        let engine = engine_with_policy(half_ether_policy()).await;

        let err = engine.authorize(&request("   ", "1")).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_daily_cap_accumulates_across_authorizations() {
        let engine = engine_with_policy(SpendingPolicy {
            max_per_tx: TokenAmount::from(500u64),
            daily_cap: TokenAmount::from(800u64),
            weekly_cap: TokenAmount::from(10_000u64),
        })
        .await;

        assert!(engine.authorize(&request("designer", "500")).await.is_ok());
        assert!(engine.authorize(&request("designer", "300")).await.is_ok());
        let err = engine.authorize(&request("designer", "1")).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::DailyLimitExceeded));
    }

    #[tokio::test]
    async fn test_weekly_cap_binds_when_daily_allows() {
        let engine = engine_with_policy(SpendingPolicy {
            max_per_tx: TokenAmount::from(500u64),
            daily_cap: TokenAmount::from(1_000u64),
            weekly_cap: TokenAmount::from(600u64),
        })
        .await;

        assert!(engine.authorize(&request("designer", "500")).await.is_ok());
        let err = engine.authorize(&request("designer", "200")).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::WeeklyLimitExceeded));
    }

    #[tokio::test]
    async fn test_denied_request_does_not_consume_allowance() {
        let engine = engine_with_policy(SpendingPolicy {
            max_per_tx: TokenAmount::from(500u64),
            daily_cap: TokenAmount::from(500u64),
            weekly_cap: TokenAmount::from(10_000u64),
        })
        .await;

        // Denied by the per-transaction limit; must not count toward caps.
        assert!(engine.authorize(&request("designer", "501")).await.is_err());
        assert!(engine.authorize(&request("designer", "500")).await.is_ok());
    }
}
