pub mod openai;

use crate::base::types::GatewayError;
use async_trait::async_trait;
use std::sync::Arc;
use std::ops::Deref;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the single text-completion operation shared by the
/// emergency classifier and the general responder. Implementing this trait
/// allows different model providers to be used with health-triage, and lets
/// tests substitute a mock.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate one completion from a system directive and a user prompt.
    ///
    /// Constraints: `temperature` must lie in `[0, 1]`, `max_output_tokens`
    /// must be positive, and both prompts must be non-empty. Violations fail
    /// with [`GatewayError::InvalidRequest`] before any network call.
    ///
    /// Transport or provider failures surface as [`GatewayError::Provider`];
    /// this layer does not retry. Retry policy belongs to the caller.
    async fn complete(&self, system: &str, user: &str, temperature: f32, max_output_tokens: u32) -> Result<String, GatewayError>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    /// Wrap any [`GenericLlmClient`] implementation.
    pub fn from_client(client: impl GenericLlmClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}
