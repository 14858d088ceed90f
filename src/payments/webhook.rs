use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Payment event delivered by the gateway webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub reference: String,
    pub status: String,
}

impl WebhookEvent {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

/// Verify the hex-encoded HMAC-SHA256 signature of the raw webhook body.
/// Comparison happens inside `verify_slice`, which is constant-time.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Sign a body the way the gateway does. Used by tests and the dry-run tooling.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
