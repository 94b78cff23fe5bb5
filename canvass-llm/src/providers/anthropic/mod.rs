//! Anthropic (Claude) provider implementation
//!
//! One shared HTTP client, two trait adapters on top of it.

pub mod client;
pub mod moderation;
pub mod summarization;
pub mod types;

pub use client::AnthropicClient;
pub use moderation::AnthropicModerator;
pub use summarization::AnthropicSummarizer;
