use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::payments::webhook::{verify_signature, WebhookEvent};
use crate::AppState;

use super::offers::ApiResponse;

/// POST /api/payments/webhook — gateway payment confirmation.
///
/// The route is public; the HMAC signature over the raw body is its
/// authentication. Redeliveries of a confirmed reference are no-ops.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let Some(secret) = state.config.payment_webhook_secret.as_deref() else {
        return Err(AppError::NotFound(
            "webhook payment confirmation is not enabled".into(),
        ));
    };

    let signature = headers
        .get("x-gateway-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(secret, &body, signature) {
        tracing::warn!("Webhook rejected: bad signature");
        return Err(AppError::Forbidden("invalid webhook signature".into()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {e}")))?;

    if !event.is_paid() {
        tracing::info!(
            reference = %event.reference,
            status = %event.status,
            "Ignoring non-paid webhook event"
        );
        return Ok(ApiResponse::ok(()));
    }

    state.ledger.confirm_checkout(&event.reference).await?;

    Ok(ApiResponse::ok(()))
}
