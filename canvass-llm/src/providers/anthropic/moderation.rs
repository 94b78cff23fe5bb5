//! Anthropic (Claude) moderation provider implementation

use super::client::AnthropicClient;
use super::types::{extract_text, strip_code_fence, Message, MessageRequest, MessageResponse};
use crate::{ModerationProvider, ModerationRequest, ModerationVerdict, ViolationFinding};
use async_trait::async_trait;
use canvass_core::{CanvassError, CanvassResult, LlmError};
use serde::Deserialize;
use uuid::Uuid;

/// Anthropic moderation provider using Claude models.
pub struct AnthropicModerator {
    client: AnthropicClient,
    model: String,
}

impl AnthropicModerator {
    /// Create a new Anthropic moderation provider.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `model` - Model name (e.g., "claude-3-5-sonnet-20241022")
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

    fn build_system_prompt(request: &ModerationRequest) -> String {
        format!(
            "You are a content moderator for survey responses. \
             The survey asks: \"{}\". \
             Responses must stay within these domains: {}. \
             Acceptable responses are described as: {}. \
             Review every response and flag ONLY those that violate the rules. \
             Respond with ONLY a JSON object of the form \
             {{\"violations\": [{{\"responseId\": \"<id>\", \"explanation\": \"<reason>\"}}]}}. \
             Use an empty violations array when every response complies. \
             Each explanation must be a full sentence naming the violated rule.",
            request.question, request.permitted_domains, request.permitted_responses
        )
    }

    fn build_user_message(request: &ModerationRequest) -> String {
        let mut body = String::from("Responses to review:\n");
        for response in &request.responses {
            body.push_str(&format!("\n[{}] {}\n", response.id, response.content));
        }
        body
    }
}

/// Wire shape of one finding as the model emits it.
#[derive(Debug, Deserialize)]
struct WireFinding {
    #[serde(rename = "responseId")]
    response_id: String,
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct WireVerdict {
    violations: Vec<WireFinding>,
}

#[async_trait]
impl ModerationProvider for AnthropicModerator {
    async fn review(&self, request: &ModerationRequest) -> CanvassResult<ModerationVerdict> {
        let message_request = MessageRequest {
            model: self.model.clone(),
            system: Some(Self::build_system_prompt(request)),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_user_message(request),
            }],
            max_tokens: 2000,
            temperature: Some(0.0),
        };

        let response: MessageResponse = self.client.request("messages", message_request).await?;
        let text = extract_text(response.content);

        let wire: WireVerdict =
            serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
                CanvassError::Llm(LlmError::InvalidResponse {
                    provider: "anthropic".to_string(),
                    reason: format!("moderation verdict is not valid JSON: {}", e),
                })
            })?;

        let mut violations = Vec::with_capacity(wire.violations.len());
        for finding in wire.violations {
            match Uuid::parse_str(&finding.response_id) {
                Ok(response_id) => violations.push(ViolationFinding {
                    response_id,
                    explanation: finding.explanation,
                }),
                Err(_) => {
                    tracing::warn!(
                        response_id = %finding.response_id,
                        "moderator returned a malformed response ID, skipping finding"
                    );
                }
            }
        }

        Ok(ModerationVerdict { violations })
    }
}

impl std::fmt::Debug for AnthropicModerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicModerator")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_verdict_parses_model_output() {
        let id = Uuid::now_v7();
        let text = format!(
            "```json\n{{\"violations\": [{{\"responseId\": \"{}\", \
             \"explanation\": \"Promotes a product outside the permitted domains.\"}}]}}\n```",
            id
        );
        let wire: WireVerdict = serde_json::from_str(strip_code_fence(&text)).unwrap();
        assert_eq!(wire.violations.len(), 1);
        assert_eq!(wire.violations[0].response_id, id.to_string());
    }

    #[test]
    fn test_prompt_carries_guidelines() {
        let request = ModerationRequest {
            question: "Which editor do you use daily?".to_string(),
            permitted_domains: "technology, software".to_string(),
            permitted_responses: "first-hand experiences".to_string(),
            responses: vec![],
        };
        let prompt = AnthropicModerator::build_system_prompt(&request);
        assert!(prompt.contains("technology, software"));
        assert!(prompt.contains("first-hand experiences"));
    }
}
