use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Side;

use super::{Checkout, GatewayError, PaymentGateway, RefundOutcome, TransferOutcome};

/// HTTP payment gateway adapter. Every call is bounded by a timeout and
/// retried a fixed number of times; retrying is safe because the gateway
/// is idempotent per reference.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    retries: u32,
}

const RETRY_BACKOFF_MS: u64 = 250;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CheckoutRequest<'a> {
    reference: &'a str,
    bout_id: Uuid,
    fighter_id: Uuid,
    side: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    url: String,
}

#[derive(Serialize)]
struct RefundRequest<'a> {
    reference: &'a str,
}

#[derive(Deserialize)]
struct RefundResponse {
    refunded: bool,
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    reference: &'a str,
    amount: i64,
    destination: &'a str,
}

#[derive(Deserialize)]
struct TransferResponse {
    transferred: bool,
}

impl HttpGateway {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64, retries: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            timeout_secs,
            retries,
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let send = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send();

        let resp = tokio::time::timeout(Duration::from_secs(self.timeout_secs), send)
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout_secs))?
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Http(status.as_u16()));
        }

        resp.json::<R>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    /// Retry a gateway call on timeouts, transport errors and 5xx. 4xx is
    /// a definitive answer and is returned immediately.
    async fn with_retry<B, R>(&self, op: &str, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let mut attempt = 0u32;
        loop {
            match self.post_json::<B, R>(path, body).await {
                Ok(r) => return Ok(r),
                Err(e) => {
                    let retryable = matches!(
                        &e,
                        GatewayError::Timeout(_)
                            | GatewayError::Transport(_)
                            | GatewayError::Http(500..=599)
                    );
                    if !retryable || attempt >= self.retries {
                        return Err(e);
                    }
                    attempt += 1;
                    let backoff = RETRY_BACKOFF_MS * (1 << attempt.min(4));
                    tracing::warn!(
                        op,
                        attempt,
                        backoff_ms = backoff,
                        error = %e,
                        "Gateway call failed — retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_checkout(
        &self,
        reference: &str,
        bout_id: Uuid,
        fighter_id: Uuid,
        side: Side,
        amount: i64,
    ) -> Result<Checkout, GatewayError> {
        let body = CheckoutRequest {
            reference,
            bout_id,
            fighter_id,
            side: side.as_str(),
            amount,
        };
        let resp: CheckoutResponse = self.with_retry("create_checkout", "/v1/checkouts", &body).await?;

        Ok(Checkout {
            reference: reference.to_string(),
            url: resp.url,
        })
    }

    async fn refund(&self, reference: &str) -> Result<RefundOutcome, GatewayError> {
        let body = RefundRequest { reference };
        let resp: RefundResponse = self.with_retry("refund", "/v1/refunds", &body).await?;

        Ok(RefundOutcome {
            refunded: resp.refunded,
        })
    }

    async fn transfer(
        &self,
        reference: &str,
        amount: i64,
        destination: &str,
    ) -> Result<TransferOutcome, GatewayError> {
        let body = TransferRequest {
            reference,
            amount,
            destination,
        };
        let resp: TransferResponse = self.with_retry("transfer", "/v1/transfers", &body).await?;

        Ok(TransferOutcome {
            transferred: resp.transferred,
        })
    }
}
