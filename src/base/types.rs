//! Common types, result aliases, and the routed error taxonomy.

use serde::{Deserialize, Serialize};

use crate::base::prompts;

/// Crate-wide error type alias.
pub type Err = anyhow::Error;
/// Crate-wide result alias over [`Err`].
pub type Res<T> = Result<T, Err>;
/// Result alias for operations that return no value.
pub type Void = Res<()>;

/// Binary urgency label produced by the emergency classifier.
///
/// Produced exactly once per question and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// The question describes an emergency.
    Emergency,
    /// The question does not describe an emergency.
    NonEmergency,
}

/// Provenance tag for the backend that produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerSource {
    /// Answer synthesized from the pre-indexed knowledge base.
    Grounded,
    /// Answer from the general conversational model.
    General,
    /// Answer from the general model, taken as a degraded path after the
    /// grounded backend failed.
    GeneralFallback,
    /// Total failure; the answer is the fixed apology text.
    Error,
}

/// Classification as recorded on the final result.
///
/// Distinct from [`Classification`] in that it also records whether a
/// fallback path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultClassification {
    /// The question classified as an emergency.
    Emergency,
    /// The question classified as a non-emergency.
    NonEmergency,
    /// The question classified as an emergency, but the grounded backend
    /// failed and the general model answered instead.
    EmergencyFallback,
    /// Total failure; the answer is the fixed apology text.
    Error,
}

impl std::fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Grounded => "grounded",
            Self::General => "general",
            Self::GeneralFallback => "general-fallback",
            Self::Error => "error",
        })
    }
}

impl std::fmt::Display for ResultClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Emergency => "emergency",
            Self::NonEmergency => "non-emergency",
            Self::EmergencyFallback => "emergency-fallback",
            Self::Error => "error",
        })
    }
}

/// The single result shape returned for every routing invocation.
///
/// Invariants: `Grounded` implies `Emergency`, `GeneralFallback` implies
/// `EmergencyFallback`, and `Error` implies the answer is the fixed apology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// The answer text returned to the caller.
    pub answer: String,
    /// Which backend produced the answer.
    pub source: AnswerSource,
    /// The classification recorded on the result.
    pub classification: ResultClassification,
}

impl RoutingResult {
    /// Terminal result for total failure: a fixed, non-alarming apology
    /// rather than a raw error.
    pub fn error() -> Self {
        Self {
            answer: prompts::APOLOGY.to_string(),
            source: AnswerSource::Error,
            classification: ResultClassification::Error,
        }
    }
}

/// Answer plus supporting source context from the grounded provider.
///
/// Ephemeral; consumed immediately into a [`RoutingResult`].
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    /// The synthesized answer text.
    pub answer: String,
    /// The supporting source context the answer was grounded in.
    pub context: String,
}

/// Failures at the language-model gateway boundary.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request violated an input constraint before any network call.
    #[error("invalid completion request: {0}")]
    InvalidRequest(String),
    /// The provider returned a response with no usable text.
    #[error("model returned an empty completion")]
    EmptyCompletion,
    /// Transport or provider failure, carrying the underlying cause.
    /// Retry policy belongs to the caller, not this layer.
    #[error("completion provider call failed")]
    Provider(#[source] Err),
}

/// Failures at the grounded-answer provider boundary.
#[derive(Debug, thiserror::Error)]
pub enum GroundedError {
    /// One-time knowledge-engine construction failed. Fatal for the
    /// provider for the process lifetime; replayed to every later call.
    #[error("knowledge engine initialization failed: {0}")]
    Init(String),
    /// A single answer-synthesis call failed. Does not poison future calls.
    #[error("grounded answer synthesis failed")]
    Query(#[source] Err),
}
