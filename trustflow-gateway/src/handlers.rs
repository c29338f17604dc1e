//! Axum route handlers for the gateway.
//!
//! Bodies are taken as raw JSON and shaped by hand so every malformed input
//! surfaces as a structured `malformed_request` denial rather than a bare
//! framework rejection.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use trustflow::book::BookRepository;
use trustflow::policy::{PolicyRepository, SpendingPolicy};
use trustflow::proto::error::AuthorizationError;
use trustflow::proto::{
    AuthorizeResponse, BookVerifiedResponse, PaymentRequest, PolicySavedResponse,
    SaveAddressBookRequest, SavePolicyRequest,
};
use trustflow::timestamp::UnixTimestamp;
use trustflow_evm::engine::AuthorizationEngine;
use trustflow_evm::verify::verify_and_build_container;

use crate::error::GatewayError;

/// Shared application state.
pub struct AppState {
    /// The address-book repository.
    pub books: Arc<dyn BookRepository>,
    /// The policy repository.
    pub policies: Arc<dyn PolicyRepository>,
    /// The payment authorization engine.
    pub engine: AuthorizationEngine,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Shared state handle for the router.
pub type SharedState = Arc<AppState>;

fn shape<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body)
        .map_err(|e| AuthorizationError::MalformedRequest(e.to_string()).into())
}

/// `POST /addressbook` — Verifies and replaces the owner-signed book.
///
/// The signature is verified over the exact message string before any
/// parsing of its content; the stored container is the unit of replacement.
///
/// # Errors
///
/// 400 on missing fields / non-string message / unparseable signature or
/// payload, 403 when the recovered signer is not the claimed owner.
pub async fn post_address_book(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<BookVerifiedResponse>, GatewayError> {
    let request: SaveAddressBookRequest = shape(body)?;
    let message = request.message.as_str().ok_or_else(|| {
        AuthorizationError::MalformedRequest("message must be a string".into())
    })?;

    let container = verify_and_build_container(
        request.owner,
        message,
        &request.signature,
        UnixTimestamp::now(),
    )?;
    let owner = container.owner;
    let entries = container.entries.len();

    state
        .books
        .replace(container)
        .await
        .map_err(AuthorizationError::from)?;

    tracing::info!(%owner, entries, "address book verified and replaced");
    Ok(Json(BookVerifiedResponse {
        status: "verified".to_owned(),
        owner,
    }))
}

/// `POST /policy` — Configures an agent's spending limits.
///
/// Owner-gated: the caller must be the owner of the currently stored,
/// already-verified address book. An agent cannot self-assign a policy.
///
/// # Errors
///
/// 400 on missing fields or when no address book is stored, 403 when the
/// caller is not the book owner.
pub async fn post_policy(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PolicySavedResponse>, GatewayError> {
    let request: SavePolicyRequest = shape(body)?;

    let book = state
        .books
        .load()
        .await
        .map_err(AuthorizationError::from)?
        .ok_or(AuthorizationError::AddressBookUnavailable)?;
    if request.owner != book.owner {
        return Err(AuthorizationError::Unauthorized.into());
    }

    let policy = SpendingPolicy {
        max_per_tx: request.max_per_tx_wei,
        daily_cap: request.daily_cap_wei,
        weekly_cap: request.weekly_cap_wei,
    };
    state
        .policies
        .upsert(request.agent_address, policy)
        .await
        .map_err(AuthorizationError::from)?;

    tracing::info!(agent = %request.agent_address, "spending policy replaced");
    Ok(Json(PolicySavedResponse {
        status: "saved".to_owned(),
        agent: request.agent_address,
        policy,
    }))
}

/// `POST /authorize` — Runs a proposed payment through the engine.
///
/// On success returns the simulated executor call; nothing is broadcast.
///
/// # Errors
///
/// Every engine denial, mapped per the gateway status table.
pub async fn post_authorize(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AuthorizeResponse>, GatewayError> {
    let request: PaymentRequest = shape(body)?;
    let call = state.engine.authorize(&request).await?;
    Ok(Json(AuthorizeResponse::simulated(call.to, call.calldata)))
}

/// `GET /health` — Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates the gateway [`axum::Router`] with all endpoints.
pub fn gateway_router(state: SharedState) -> axum::Router {
    axum::Router::new()
        .route("/addressbook", axum::routing::post(post_address_book))
        .route("/policy", axum::routing::post(post_policy))
        .route("/authorize", axum::routing::post(post_authorize))
        .route("/health", axum::routing::get(health))
        .with_state(state)
}
