//! Single-shot emergency classification of a question.

use tracing::{instrument, warn};

use crate::{
    base::{config::Config, types::Classification},
    service::llm::LlmClient,
};

/// Emergency classifier: one gateway call mapped to a binary urgency label.
#[derive(Clone)]
pub struct Classifier {
    config: Config,
    llm: LlmClient,
}

impl Classifier {
    pub fn new(config: &Config, llm: LlmClient) -> Self {
        Self {
            config: config.clone(),
            llm,
        }
    }

    /// Classify whether a question is emergency-related.
    ///
    /// Issues one completion at the classifier temperature with a one-word
    /// output budget, then applies the conservative parsing rule. A gateway
    /// failure is swallowed and defaults to non-emergency; see DESIGN.md for
    /// why this fail-open choice is preserved and flagged.
    #[instrument(name = "Classifier::classify", skip_all)]
    pub async fn classify(&self, question: &str) -> Classification {
        let raw = self
            .llm
            .complete(
                &self.config.classifier_system_directive,
                question,
                self.config.classifier_temperature,
                self.config.classifier_max_tokens,
            )
            .await;

        match raw {
            Ok(output) => parse_classification(&output),
            Err(err) => {
                warn!("Error classifying emergency, defaulting to non-emergency: {err:#}");
                Classification::NonEmergency
            }
        }
    }
}

/// Parse the model's free-text label conservatively.
///
/// The output is untrusted: trim and lower-case it, accept the safe label
/// only on a substring match, and escalate everything else (including empty
/// or malformed output) to emergency.
pub fn parse_classification(raw: &str) -> Classification {
    if raw.trim().to_lowercase().contains("non-emergency") {
        Classification::NonEmergency
    } else {
        Classification::Emergency
    }
}
