use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Event name for a completed charge
pub const CHARGE_SUCCESS: &str = "charge.success";

/// Hex HMAC-SHA512 of `payload` keyed with the gateway secret
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a webhook signature against the raw request body.
///
/// The comparison runs in constant time. An empty secret never verifies.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let expected = match hex::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Webhook body: `{"event": "...", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// The parts of a charge payload the service uses
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeData {
    #[serde(default)]
    pub id: Option<i64>,
    pub reference: String,
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

impl WebhookEvent {
    pub fn is_charge_success(&self) -> bool {
        self.event == CHARGE_SUCCESS
    }

    /// Decode `data` as a charge; only meaningful for charge events
    pub fn charge(&self) -> Result<ChargeData, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "sk_test_webhook";

    #[test]
    fn test_signature_roundtrip() {
        let body = br#"{"event":"charge.success","data":{"reference":"rankme_1"}}"#;
        let signature = sign_payload(SECRET, body);
        assert_eq!(signature.len(), 128);
        assert!(verify_signature(SECRET, body, &signature));
        assert!(verify_signature(SECRET, body, &signature.to_uppercase()));
    }

    #[test]
    fn test_tampered_body_fails() {
        let signature = sign_payload(SECRET, b"{\"amount\":200000}");
        assert!(!verify_signature(SECRET, b"{\"amount\":100}", &signature));
    }

    #[test]
    fn test_wrong_secret_or_garbage_fails() {
        let body = b"{}";
        let signature = sign_payload("other", body);
        assert!(!verify_signature(SECRET, body, &signature));
        assert!(!verify_signature(SECRET, body, "not-hex"));
        assert!(!verify_signature("", body, &sign_payload("", body)));
    }

    #[test]
    fn test_parse_charge_event() {
        let body = r#"{
            "event": "charge.success",
            "data": {
                "id": 42,
                "reference": "rankme_x",
                "status": "success",
                "amount": 200000,
                "currency": "NGN"
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(body).unwrap();
        assert!(event.is_charge_success());
        let charge = event.charge().unwrap();
        assert_eq!(charge.reference, "rankme_x");
        assert_eq!(charge.amount, 200_000);
    }

    #[test]
    fn test_other_events_are_not_charges() {
        let event: WebhookEvent = serde_json::from_str(r#"{"event": "transfer.success"}"#).unwrap();
        assert!(!event.is_charge_success());
        assert!(event.charge().is_err());
    }
}
