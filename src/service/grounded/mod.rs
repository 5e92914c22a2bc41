pub mod engine;
pub mod graphrag;

use crate::base::types::{GroundedAnswer, GroundedError};
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

// Traits.

/// Generic grounded-answer client trait that providers must implement.
///
/// A grounded answer is synthesized from a fixed, pre-indexed knowledge base
/// plus retrieved supporting passages, as opposed to the model's
/// unconditioned generation. The provider is treated as opaque by the
/// routing layer; only this contract matters there.
#[async_trait]
pub trait GenericGroundedClient: Send + Sync + 'static {
    /// Answer a question from the knowledge base.
    ///
    /// The first invocation may perform expensive one-time setup (loading
    /// the knowledge base and building its in-memory indices). Setup failure
    /// is fatal for the provider for the process lifetime and surfaces as
    /// [`GroundedError::Init`] on this and every later call; a per-question
    /// failure surfaces as [`GroundedError::Query`] and does not poison
    /// future calls.
    async fn answer(&self, question: &str) -> Result<GroundedAnswer, GroundedError>;
}

// Structs.

/// Grounded-answer client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct GroundedClient {
    inner: Arc<dyn GenericGroundedClient>,
}

impl Deref for GroundedClient {
    type Target = dyn GenericGroundedClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl GroundedClient {
    /// Wrap any [`GenericGroundedClient`] implementation.
    pub fn from_client(client: impl GenericGroundedClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}
