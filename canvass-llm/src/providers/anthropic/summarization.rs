//! Anthropic (Claude) summarization provider implementation

use super::client::AnthropicClient;
use super::types::{extract_text, strip_code_fence, Message, MessageRequest, MessageResponse};
use crate::{SummaryProvider, SummaryRequest};
use async_trait::async_trait;
use canvass_core::{CanvassError, CanvassResult, LlmError};

/// Anthropic summarization provider using Claude models.
pub struct AnthropicSummarizer {
    client: AnthropicClient,
    model: String,
}

impl AnthropicSummarizer {
    /// Create a new Anthropic summarization provider.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: AnthropicClient::new(api_key, 50),
            model: model.into(),
        }
    }

    /// Create provider with the default Claude 3.5 Sonnet model.
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(api_key, "claude-3-5-sonnet-20241022")
    }

    fn build_system_prompt(request: &SummaryRequest) -> String {
        format!(
            "You are a survey analyst. Summarize the responses to a survey \
             about \"{}\" asking: \"{}\". \
             Follow these instructions from the survey creator: {}. \
             Respond with ONLY a JSON object. Choose keys that fit the \
             instructions; do not wrap the JSON in markdown.",
            request.area, request.question, request.summary_instructions
        )
    }

    fn build_user_message(request: &SummaryRequest) -> String {
        let mut body = String::from("Survey responses:\n");
        for (i, content) in request.responses.iter().enumerate() {
            body.push_str(&format!("\n{}. {}\n", i + 1, content));
        }
        body
    }
}

#[async_trait]
impl SummaryProvider for AnthropicSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> CanvassResult<serde_json::Value> {
        let message_request = MessageRequest {
            model: self.model.clone(),
            system: Some(Self::build_system_prompt(request)),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_user_message(request),
            }],
            max_tokens: 4000,
            temperature: Some(0.3),
        };

        let response: MessageResponse = self.client.request("messages", message_request).await?;
        let text = extract_text(response.content);

        serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            CanvassError::Llm(LlmError::InvalidResponse {
                provider: "anthropic".to_string(),
                reason: format!("summary is not valid JSON: {}", e),
            })
        })
    }
}

impl std::fmt::Debug for AnthropicSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSummarizer")
            .field("model", &self.model)
            .finish()
    }
}
