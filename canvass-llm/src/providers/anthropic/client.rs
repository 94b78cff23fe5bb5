//! Anthropic HTTP client with rate limiting

use super::types::ApiError;
use canvass_core::{CanvassError, CanvassResult, LlmError};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

const PROVIDER: &str = "anthropic";

/// Anthropic API client with rate limiting.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_request_interval: Duration,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `requests_per_minute` - Maximum requests per minute
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        let permits = (requests_per_minute as usize).max(1);
        let min_interval_ms = (60_000 / requests_per_minute.max(1) as u64).max(10);

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            rate_limiter: Arc::new(Semaphore::new(permits)),
            last_request: Arc::new(Mutex::new(None)),
            min_request_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Make an API request with automatic rate limiting.
    pub async fn request<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Req,
    ) -> CanvassResult<Res> {
        let _permit = self.rate_limiter.acquire().await.map_err(|e| {
            CanvassError::Llm(LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                status: 0,
                message: format!("Rate limiter error: {}", e),
            })
        })?;

        // Enforce minimum interval between requests. The guard is held
        // through the sleep so concurrent callers space out too.
        {
            let mut last = self.last_request.lock().await;
            if let Some(at) = *last {
                let elapsed = at.elapsed();
                if elapsed < self.min_request_interval {
                    tokio::time::sleep(self.min_request_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CanvassError::Llm(LlmError::RequestFailed {
                    provider: PROVIDER.to_string(),
                    status: 0,
                    message: format!("HTTP request failed: {}", e),
                })
            })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                CanvassError::Llm(LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: format!("Failed to parse response body: {}", e),
                })
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error_msg = if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                api_error.error.message
            } else {
                error_text
            };

            Err(match status {
                StatusCode::TOO_MANY_REQUESTS => CanvassError::Llm(LlmError::RateLimited {
                    provider: PROVIDER.to_string(),
                }),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CanvassError::Llm(LlmError::InvalidApiKey {
                        provider: PROVIDER.to_string(),
                    })
                }
                _ => CanvassError::Llm(LlmError::RequestFailed {
                    provider: PROVIDER.to_string(),
                    status: status.as_u16() as i32,
                    message: error_msg,
                }),
            })
        }
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
