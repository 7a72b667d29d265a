//! Verification of Slack request signatures.
//!
//! Slack signs every request with `v0=` + hex(HMAC-SHA256(secret,
//! `v0:{timestamp}:{body}`)) and sends the timestamp alongside it.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::SignatureError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const VERSION: &str = "v0";

/// Requests older (or newer) than this are rejected to stop replays
pub const MAX_REQUEST_AGE_SECS: u64 = 60 * 5;

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }

    /// Signature header value for `body` sent at `timestamp`
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        match self.mac(timestamp, body) {
            Ok(mac) => format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())),
            Err(_) => String::new(),
        }
    }

    /// Check a signature against `body`, with `now` in Unix seconds
    pub fn verify(
        &self,
        timestamp: &str,
        signature: &str,
        body: &[u8],
        now: u64,
    ) -> Result<(), SignatureError> {
        let sent_at: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        if now.abs_diff(sent_at) > MAX_REQUEST_AGE_SECS {
            return Err(SignatureError::StaleTimestamp);
        }

        let digest = signature
            .strip_prefix("v0=")
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(SignatureError::Mismatch)?;

        self.mac(timestamp, body)?
            .verify_slice(&digest)
            .map_err(|_| SignatureError::Mismatch)
    }

    /// Verify the signature headers of an inbound request against the clock
    pub fn verify_headers(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
        let header = |name: &'static str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .ok_or(SignatureError::MissingHeader(name))
        };

        let timestamp = header(TIMESTAMP_HEADER)?;
        let signature = header(SIGNATURE_HEADER)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        self.verify(timestamp, signature, body, now)
    }
}
