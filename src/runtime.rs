//! Runtime services and shared state for health-triage.

use tracing::{error, instrument};

use crate::{
    base::{config::Config, types::RoutingResult},
    routing::{Router, blocking},
    service::{grounded::GroundedClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the LLM client, the grounded-answer client, and the
/// configuration. It is designed to be trivially cloneable, allowing it to
/// be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The grounded-answer client instance.
    pub grounded: GroundedClient,
    /// The response router.
    router: Router,
}

impl Runtime {
    /// Create a new runtime instance with the default service clients.
    ///
    /// The grounded client defers its expensive knowledge-base setup until
    /// the first emergency question.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Self {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the grounded-answer client.
        let grounded = GroundedClient::graphrag(&config);

        Self::with_clients(config, llm, grounded)
    }

    /// Create a runtime around explicit service clients. Used by tests to
    /// substitute mocks.
    pub fn with_clients(config: Config, llm: LlmClient, grounded: GroundedClient) -> Self {
        let router = Router::new(&config, llm.clone(), grounded.clone());

        Self { config, llm, grounded, router }
    }

    /// Route one question end to end. Never returns an error; every failure
    /// is normalized into the result.
    pub async fn route(&self, question: &str) -> RoutingResult {
        self.router.route(question).await
    }

    /// Blocking entry point for callers that cannot suspend (e.g., a web
    /// request handler). Result contents are identical to [`Self::route`].
    #[instrument(skip_all)]
    pub fn route_blocking(&self, question: &str) -> RoutingResult {
        match blocking::run_blocking(self.route(question)) {
            Ok(result) => result,
            Err(err) => {
                error!("Blocking bridge failed: {err:#}");
                RoutingResult::error()
            }
        }
    }
}
