//! HTTP client for the support-desk API.
//!
//! Provides a minimal client with configurable auth (Bearer token or
//! X-API-Key), generic GET/POST/DELETE helpers, and domain methods for the
//! attachment services (list, delete, metadata, signed URLs). Validation
//! failures from the API map onto form fields via [`FormErrors`].

pub mod api;
pub mod events;
pub mod form_errors;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::form_errors::FormErrors;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Form-field mapping of the error payload, for status errors.
    pub fn form_errors(&self) -> Option<FormErrors> {
        match self {
            ApiError::Status { body, .. } => Some(FormErrors::from_body(body)),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// API version prefix (e.g. "/api/v1"). Set ATTACHKIT_API_VERSION to match
/// the server.
pub fn api_prefix() -> String {
    let version = std::env::var("ATTACHKIT_API_VERSION").unwrap_or_else(|_| "v1".to_string());
    format!("/api/{}", version)
}

/// HTTP client for the support-desk API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: ATTACHKIT_API_URL, ATTACHKIT_API_KEY.
    /// Uses X-API-Key auth.
    pub fn from_env() -> ApiResult<Self> {
        let base_url = std::env::var("ATTACHKIT_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let api_key = std::env::var("ATTACHKIT_API_KEY")
            .map_err(|_| ApiError::Config("Missing API key. Set ATTACHKIT_API_KEY".to_string()))?;

        Self::new(base_url, Auth::XApiKey(api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        request = self.apply_auth(request);

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.build_url(path);
        let request = self.client.post(&url).json(body);
        let request = self.apply_auth(request);

        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.build_url(path);
        let request = self.client.delete(&url);
        let request = self.apply_auth(request);

        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Raw client for custom requests. Caller must apply auth via build_url
    /// and headers.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

// Re-export domain types for convenience.
pub use api::AttachmentListResponse;
pub use events::{
    AttachmentEvents, AttachmentListChanged, BroadcastEvents, EventHandler, EventSubscription,
};
pub use attachkit_core::models::{AttachmentRecord, FileMetadata, SignedUrl};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new(
            "http://localhost:3000/".to_string(),
            Auth::XApiKey("k".into()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.build_url("/api/v1/attachments"),
            "http://localhost:3000/api/v1/attachments"
        );
    }

    #[test]
    fn status_errors_expose_form_mapping() {
        let err = ApiError::Status {
            status: 422,
            body: r#"{"data":{"details":{"name":["Name is required"]}}}"#.to_string(),
        };
        let form = err.form_errors().unwrap();
        assert_eq!(
            form.field_errors.get("name").map(String::as_str),
            Some("Name is required")
        );
    }
}
