//! GraphRAG-style grounded-answer provider over the local knowledge engine.
//!
//! The engine is expensive to construct (it loads and embeds the knowledge
//! base), so it is built lazily on the first emergency question and shared
//! for the lifetime of the process. Concurrent first calls are serialized by
//! the once-only initialization cell; a construction failure is stored and
//! replayed to every later call rather than retried.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::base::{
    config::Config,
    types::{GroundedAnswer, GroundedError},
};

use super::{GenericGroundedClient, GroundedClient, engine::KnowledgeEngine};

// Extra methods on `GroundedClient` applied by the graphrag implementation.

impl GroundedClient {
    pub fn graphrag(config: &Config) -> Self {
        let client = GraphRagGroundedClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Grounded-answer client backed by the lazily constructed knowledge engine.
pub struct GraphRagGroundedClient {
    config: Config,
    engine: OnceCell<Result<Arc<KnowledgeEngine>, String>>,
}

impl GraphRagGroundedClient {
    /// Create a new client. The knowledge engine is not built yet.
    #[instrument(name = "GraphRagGroundedClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            engine: OnceCell::new(),
        }
    }

    /// Get the shared engine, constructing it exactly once.
    async fn engine(&self) -> Result<Arc<KnowledgeEngine>, GroundedError> {
        let slot = self
            .engine
            .get_or_init(|| async {
                KnowledgeEngine::load(&self.config).await.map(Arc::new).map_err(|err| {
                    warn!("Knowledge engine failed to initialize: {err:#}");
                    format!("{err:#}")
                })
            })
            .await;

        match slot {
            Ok(engine) => Ok(engine.clone()),
            Err(message) => Err(GroundedError::Init(message.clone())),
        }
    }
}

#[async_trait]
impl GenericGroundedClient for GraphRagGroundedClient {
    #[instrument(name = "GraphRagGroundedClient::answer", skip_all)]
    async fn answer(&self, question: &str) -> Result<GroundedAnswer, GroundedError> {
        let engine = self.engine().await?;

        let result = engine.search(question).await.map_err(GroundedError::Query)?;

        debug!("Grounded answer synthesized from {} chars of context.", result.context_text.len());

        Ok(GroundedAnswer {
            answer: result.response,
            context: result.context_text,
        })
    }
}
