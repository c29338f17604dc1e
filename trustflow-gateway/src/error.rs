//! HTTP error mapping for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use trustflow::proto::error::{AuthorizationError, DenialReason};

/// Gateway-level error: every denial from the core taxonomy, mapped to an
/// HTTP status and the structured `{error, reason}` wire shape.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A terminal denial from verification, policy, or the engine.
    #[error(transparent)]
    Denied(#[from] AuthorizationError),
}

impl From<trustflow::proto::error::StorageError> for GatewayError {
    fn from(value: trustflow::proto::error::StorageError) -> Self {
        Self::Denied(value.into())
    }
}

/// Status mapping: client input 400, trust-boundary refusals 403,
/// infrastructure 502, persistence 500.
const fn status_for(reason: DenialReason) -> StatusCode {
    match reason {
        DenialReason::MalformedRequest
        | DenialReason::MalformedPayload
        | DenialReason::InvalidSignatureFormat
        | DenialReason::AddressBookUnavailable => StatusCode::BAD_REQUEST,
        DenialReason::SignatureMismatch
        | DenialReason::Unauthorized
        | DenialReason::AddressBookInvalid
        | DenialReason::RecipientNotApproved
        | DenialReason::NoActivePolicy
        | DenialReason::PerTransactionLimitExceeded
        | DenialReason::DailyLimitExceeded
        | DenialReason::WeeklyLimitExceeded => StatusCode::FORBIDDEN,
        DenialReason::DecryptionFailed => StatusCode::BAD_GATEWAY,
        DenialReason::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let Self::Denied(denial) = self;
        let reason = denial.reason();
        let body = serde_json::json!({
            "error": denial.to_string(),
            "reason": reason,
        });
        (status_for(reason), axum::Json(body)).into_response()
    }
}
