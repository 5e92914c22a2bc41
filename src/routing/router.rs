//! Classification, dispatch, and fallback for one question.

use tracing::{debug, error, instrument, warn};

use crate::{
    base::{
        config::Config,
        prompts,
        types::{AnswerSource, Classification, ResultClassification, RoutingResult},
    },
    service::{grounded::GroundedClient, llm::LlmClient},
};

use super::classifier::Classifier;

/// Response router: classify, dispatch to a backend, fall back, and
/// normalize every outcome into one result shape.
#[derive(Clone)]
pub struct Router {
    config: Config,
    llm: LlmClient,
    grounded: GroundedClient,
    classifier: Classifier,
}

impl Router {
    pub fn new(config: &Config, llm: LlmClient, grounded: GroundedClient) -> Self {
        let classifier = Classifier::new(config, llm.clone());

        Self {
            config: config.clone(),
            llm,
            grounded,
            classifier,
        }
    }

    /// Route one question end to end.
    ///
    /// Always yields exactly one [`RoutingResult`]; every failure path is
    /// caught and converted into a result value, so this never returns an
    /// error to the caller.
    #[instrument(name = "Router::route", skip_all)]
    pub async fn route(&self, question: &str) -> RoutingResult {
        let classification = self.classifier.classify(question).await;

        match classification {
            Classification::Emergency => {
                warn!("{}", prompts::EMERGENCY_ADVISORY);
                self.emergency_response(question).await
            }
            Classification::NonEmergency => self.general_response(question, false).await,
        }
    }

    /// Answer an emergency question from the grounded backend, falling back
    /// to the general responder on any grounded failure.
    #[instrument(name = "Router::emergency_response", skip_all)]
    async fn emergency_response(&self, question: &str) -> RoutingResult {
        match self.grounded.answer(question).await {
            Ok(grounded) => {
                debug!("Grounded context had {} chars; dropped from the result.", grounded.context.len());

                RoutingResult {
                    answer: grounded.answer,
                    source: AnswerSource::Grounded,
                    classification: ResultClassification::Emergency,
                }
            }
            Err(err) => {
                warn!("Error getting grounded emergency response, falling back to general responder: {err:#}");
                self.general_response(question, true).await
            }
        }
    }

    /// Answer from the general conversational model.
    ///
    /// In fallback mode the system directive is augmented with the caution
    /// notice. On failure the terminal error result is returned; the
    /// fallback invocation itself gets no further fallback.
    #[instrument(name = "Router::general_response", skip_all)]
    async fn general_response(&self, question: &str, is_fallback: bool) -> RoutingResult {
        let system = if is_fallback {
            format!("{}{}", self.config.general_system_directive, self.config.fallback_caution_directive)
        } else {
            self.config.general_system_directive.clone()
        };

        let answer = self
            .llm
            .complete(&system, question, self.config.general_temperature, self.config.general_max_tokens)
            .await;

        match answer {
            Ok(answer) => {
                let (source, classification) = if is_fallback {
                    (AnswerSource::GeneralFallback, ResultClassification::EmergencyFallback)
                } else {
                    (AnswerSource::General, ResultClassification::NonEmergency)
                };

                RoutingResult { answer, source, classification }
            }
            Err(err) => {
                error!("Error getting general response: {err:#}");
                RoutingResult::error()
            }
        }
    }
}
