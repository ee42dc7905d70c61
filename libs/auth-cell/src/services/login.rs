use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::error::AppError;
use shared_utils::token::TokenCodec;

/// Login flows for the three identity kinds. Credential verification is a
/// comparison against the stored secret; on success the subject key is
/// wrapped in a fresh token.
pub struct LoginService {
    codec: TokenCodec,
    store: StoreClient,
}

impl LoginService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            codec: TokenCodec::new(&config.jwt_secret),
            store: StoreClient::new(config),
        }
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> Result<String, AppError> {
        debug!("Admin login attempt for {}", username);
        self.login(
            &format!("/admins?username=eq.{}&limit=1", username),
            username,
            password,
            "Admin not found.",
        )
        .await
    }

    pub async fn doctor_login(&self, email: &str, password: &str) -> Result<String, AppError> {
        debug!("Doctor login attempt for {}", email);
        self.login(
            &format!("/doctors?email=eq.{}&limit=1", email),
            email,
            password,
            "Doctor not found.",
        )
        .await
    }

    pub async fn patient_login(&self, email: &str, password: &str) -> Result<String, AppError> {
        debug!("Patient login attempt for {}", email);
        self.login(
            &format!("/patients?email=eq.{}&limit=1", email),
            email,
            password,
            "Patient not found.",
        )
        .await
    }

    async fn login(
        &self,
        path: &str,
        subject: &str,
        password: &str,
        not_found: &str,
    ) -> Result<String, AppError> {
        let rows: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let record = rows
            .first()
            .ok_or_else(|| AppError::Auth(not_found.to_string()))?;

        let stored = record["password"].as_str().unwrap_or_default();
        if stored != password {
            return Err(AppError::Auth("Invalid password.".to_string()));
        }

        Ok(self.codec.issue(subject))
    }
}
