use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::TokenClaims;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token lifetime. Tokens are invalidated only by expiry; there is no
/// revocation list.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Opaque verification failure. Malformed, tampered and expired tokens are
/// indistinguishable to callers so the error is not an oracle; the concrete
/// reason goes to the debug log only.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

/// Issues and verifies signed, time-limited identity tokens. The signing key
/// is derived once from the configured secret and read-only afterwards; the
/// codec is injected into callers rather than held as ambient global state.
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Produce a compact signed token whose subject is the identity key
    /// (username for admins, email for doctors and patients). Pure
    /// computation, no store access.
    pub fn issue(&self, subject: &str) -> String {
        let now = Utc::now();
        let expiry = now + Duration::days(TOKEN_LIFETIME_DAYS);

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });
        let claims = json!({
            "sub": subject,
            "iat": now.timestamp(),
            "exp": expiry.timestamp()
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_b64)
    }

    /// Verify structure, signature and expiry, returning the subject key. Any
    /// failure collapses to `InvalidToken`.
    pub fn parse_subject(&self, token: &str) -> Result<String, InvalidToken> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            debug!("Invalid token format: expected 3 parts, got {}", parts.len());
            return Err(InvalidToken);
        }

        let header_b64 = parts[0];
        let claims_b64 = parts[1];
        let signature_b64 = parts[2];

        let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
            Ok(sig) => sig,
            Err(e) => {
                debug!("Failed to decode signature: {}", e);
                return Err(InvalidToken);
            }
        };

        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("Token signature verification failed");
            return Err(InvalidToken);
        }

        let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(json_str) => json_str,
                Err(_) => {
                    debug!("Claims are not valid UTF-8");
                    return Err(InvalidToken);
                }
            },
            Err(e) => {
                debug!("Failed to decode claims: {}", e);
                return Err(InvalidToken);
            }
        };

        let claims: TokenClaims = match serde_json::from_str(&claims_json) {
            Ok(c) => c,
            Err(e) => {
                debug!("Failed to parse claims: {}", e);
                return Err(InvalidToken);
            }
        };

        let now = Utc::now().timestamp();
        if claims.exp < now {
            debug!("Token expired at {} (now: {})", claims.exp, now);
            return Err(InvalidToken);
        }

        Ok(claims.sub)
    }
}
