//! OpenAI implementation of the language-model gateway.
//!
//! This module provides a thin wrapper around the OpenAI chat completions
//! API. It validates request constraints up front, issues exactly one call,
//! and surfaces transport failures as typed gateway errors without retrying.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{config::Config, types::GatewayError};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Check the request constraints before any network call.
    fn validate(system: &str, user: &str, temperature: f32, max_output_tokens: u32) -> Result<(), GatewayError> {
        if system.is_empty() || user.is_empty() {
            return Err(GatewayError::InvalidRequest("prompts must be non-empty".to_string()));
        }

        if !(0.0..=1.0).contains(&temperature) {
            return Err(GatewayError::InvalidRequest(format!("temperature {temperature} outside [0, 1]")));
        }

        if max_output_tokens == 0 {
            return Err(GatewayError::InvalidRequest("max output tokens must be positive".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, system: &str, user: &str, temperature: f32, max_output_tokens: u32) -> Result<String, GatewayError> {
        Self::validate(system, user, temperature, max_output_tokens)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.openai_chat_model)
            .temperature(temperature)
            .max_completion_tokens(max_output_tokens)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default().content(system).build().map_err(|e| GatewayError::Provider(e.into()))?.into(),
                ChatCompletionRequestUserMessageArgs::default().content(user).build().map_err(|e| GatewayError::Provider(e.into()))?.into(),
            ])
            .build()
            .map_err(|e| GatewayError::Provider(e.into()))?;

        let response = self.client.chat().create(request).await.map_err(|e| GatewayError::Provider(e.into()))?;

        debug!("Chat completion returned {} choices.", response.choices.len());

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(GatewayError::EmptyCompletion)?;

        Ok(text)
    }
}

// Tests.
