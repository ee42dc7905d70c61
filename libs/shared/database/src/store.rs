use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Client for the clinic data store, a PostgREST-style REST API. All access
/// goes through point queries with `col=op.value` filters; the store owns
/// transaction discipline and uniqueness constraints.
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Point existence check: true when the filtered query returns at least
    /// one row.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let rows: Vec<Value> = self.request(Method::GET, path, None).await?;
        Ok(!rows.is_empty())
    }

    /// Insert that defers uniqueness to the store. The `on_conflict` columns
    /// name a unique constraint; with `resolution=ignore-duplicates` the
    /// store returns an empty representation when the row already exists,
    /// which callers interpret as losing the race.
    pub async fn insert_unless_conflict(
        &self,
        table: &str,
        on_conflict: &str,
        body: Value,
    ) -> Result<Option<Value>> {
        let path = format!("/{}?on_conflict={}", table, on_conflict);

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=ignore-duplicates,return=representation"),
        );

        let rows: Vec<Value> = self
            .request_with_headers(Method::POST, &path, Some(body), Some(headers))
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Plain insert returning the created row.
    pub async fn insert(&self, table: &str, body: Value) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("return=representation"),
        );

        let rows: Vec<Value> = self
            .request_with_headers(Method::POST, &format!("/{}", table), Some(body), Some(headers))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no representation", table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(url: &str) -> StoreClient {
        StoreClient::new(&AppConfig {
            store_url: url.to_string(),
            store_api_key: "test-api-key".to_string(),
            jwt_secret: "unused".to_string(),
        })
    }

    #[tokio::test]
    async fn requests_carry_the_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/doctors"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let rows: Vec<Value> = client(&server.uri())
            .request(Method::GET, "/doctors", None)
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn exists_reflects_row_presence() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/patients"))
            .and(query_param("email", "eq.pat@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/patients"))
            .and(query_param("email", "eq.nobody@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = client(&server.uri());
        assert!(store.exists("/patients?email=eq.pat@example.com").await.unwrap());
        assert!(!store.exists("/patients?email=eq.nobody@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn conditional_insert_reports_a_lost_race_as_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/appointments"))
            .and(query_param("on_conflict", "doctor_id,appointment_time"))
            .and(header(
                "Prefer",
                "resolution=ignore-duplicates,return=representation",
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&server)
            .await;

        let row = client(&server.uri())
            .insert_unless_conflict(
                "appointments",
                "doctor_id,appointment_time",
                json!({ "doctor_id": 1 }),
            )
            .await
            .unwrap();

        assert!(row.is_none());
    }

    #[tokio::test]
    async fn store_failures_surface_as_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/doctors"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result: Result<Vec<Value>> = client(&server.uri())
            .request(Method::GET, "/doctors", None)
            .await;

        assert!(result.is_err());
    }
}
