use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-token-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:3001".to_string(),
            store_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Config pointed at a wiremock server.
    pub fn with_store_url(store_url: &str) -> AppConfig {
        AppConfig {
            store_url: store_url.to_string(),
            ..Self::default().to_app_config()
        }
    }
}

/// Builds raw tokens with controlled expiry and signing key, for exercising
/// the failure paths the codec itself refuses to produce.
pub struct TokenTestUtils;

impl TokenTestUtils {
    pub fn token_signed_with(subject: &str, secret: &str, exp_hours: i64) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours);

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });
        let claims = json!({
            "sub": subject,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_encoded = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header_encoded, claims_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn expired_token(subject: &str, secret: &str) -> String {
        Self::token_signed_with(subject, secret, -1)
    }

    pub fn malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned rows in the shape the data store returns, for wiremock responses.
pub struct MockStoreRows;

impl MockStoreRows {
    pub fn admin(username: &str, password: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "username": username,
            "password": password
        })
    }

    pub fn doctor(id: Uuid, email: &str, available_times: &[&str]) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Dr. Test",
            "specialty": "cardiology",
            "email": email,
            "password": "secret",
            "phone": "5551234567",
            "available_times": available_times
        })
    }

    pub fn patient(id: Uuid, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Test Patient",
            "email": email,
            "password": "secret",
            "phone": "5559876543",
            "address": "1 Clinic Way"
        })
    }

    pub fn appointment(
        id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        appointment_time: &str,
        status: i32,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "appointment_time": appointment_time,
            "status": status
        })
    }

    pub fn prescription(appointment_id: Uuid) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "patient_name": "Test Patient",
            "medication": "Ibuprofen",
            "dosage": "200mg",
            "doctor_notes": "Twice daily after meals"
        })
    }
}
