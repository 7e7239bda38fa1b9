//! HTTP client implementation
//!
//! The orchestrator, pipeline and parameter store all speak the same JSON
//! protocol: every operation is a `POST /` whose target is named in the
//! `X-Amz-Target` header. Request signing is left to whatever sits at the
//! configured endpoint.

use std::time::Duration;

use ecs_api::ErrorResponse;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::DeployError;

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_HEADER: &str = "X-Amz-Target";

/// JSON protocol client bound to one service endpoint
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: Url,
    target_prefix: String,
}

impl HttpClient {
    /// Create a new client for the service at `endpoint`
    pub fn new(endpoint: Url, target_prefix: &str, timeout: Duration) -> Result<Self, DeployError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            target_prefix: target_prefix.to_string(),
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Invoke `operation` and decode its response
    pub async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let text = self.send(operation, body).await?;
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }

    /// Invoke `operation` and discard its response body
    pub async fn call_unit<B: Serialize>(&self, operation: &str, body: &B) -> Result<(), DeployError> {
        self.send(operation, body).await?;
        Ok(())
    }

    async fn send<B: Serialize>(&self, operation: &str, body: &B) -> Result<String, DeployError> {
        let target = format!("{}.{}", self.target_prefix, operation);
        debug!("POST {} ({})", self.endpoint, target);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(TARGET_HEADER, &target)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("{} failed: {} - {}", target, status, text);
            let message = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(ErrorResponse {
                    error_type,
                    message,
                }) => format!(
                    "{}: {}",
                    error_type
                        .as_deref()
                        .map(|t| t.rsplit('#').next().unwrap_or(t))
                        .unwrap_or("UnknownError"),
                    message.unwrap_or_default()
                ),
                Err(_) => text,
            };
            return Err(DeployError::ApiError(format!("{} ({}): {}", operation, status, message)));
        }

        Ok(text)
    }
}
