//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;
use tracing::warn;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI chat model to use.
fn default_openai_chat_model() -> String {
    "gpt-4o".to_string()
}

/// Default OpenAI embedding model to use.
fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Default knowledge-base directory holding the indexed text units.
fn default_knowledge_base_dir() -> String {
    "./knowledge".to_string()
}

/// Default sampling temperature for the emergency classifier.
fn default_classifier_temperature() -> f32 {
    0.0
}

/// Default max output tokens for the classifier; one word, no more.
fn default_classifier_max_tokens() -> u32 {
    20
}

/// Default sampling temperature for the general responder.
fn default_general_temperature() -> f32 {
    0.7
}

/// Default max output tokens for the general responder.
fn default_general_max_tokens() -> u32 {
    1024
}

/// Default system directive for the emergency classifier.
fn default_classifier_system_directive() -> String {
    prompts::CLASSIFIER_SYSTEM_DIRECTIVE.to_string()
}

/// Default system directive for the general responder.
fn default_general_system_directive() -> String {
    prompts::GENERAL_SYSTEM_DIRECTIVE.to_string()
}

/// Default caution addendum for the fallback path.
fn default_fallback_caution_directive() -> String {
    prompts::FALLBACK_CAUTION_DIRECTIVE.to_string()
}

/// Configuration for the health-triage application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared, immutable configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The concrete configuration values behind [`Config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`HEALTH_TRIAGE_OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI chat model to use for classification and answers (`HEALTH_TRIAGE_OPENAI_CHAT_MODEL`).
    #[serde(default = "default_openai_chat_model")]
    pub openai_chat_model: String,
    /// OpenAI embedding model used by the knowledge engine (`HEALTH_TRIAGE_OPENAI_EMBEDDING_MODEL`).
    #[serde(default = "default_openai_embedding_model")]
    pub openai_embedding_model: String,
    /// Directory containing the pre-indexed knowledge-base text units (`HEALTH_TRIAGE_KNOWLEDGE_BASE_DIR`).
    #[serde(default = "default_knowledge_base_dir")]
    pub knowledge_base_dir: String,
    /// Optional custom classifier system directive to override the default (`HEALTH_TRIAGE_CLASSIFIER_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_classifier_system_directive")]
    pub classifier_system_directive: String,
    /// Optional custom general-responder system directive to override the default (`HEALTH_TRIAGE_GENERAL_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_general_system_directive")]
    pub general_system_directive: String,
    /// Optional custom fallback caution addendum to override the default (`HEALTH_TRIAGE_FALLBACK_CAUTION_DIRECTIVE`).
    #[serde(default = "default_fallback_caution_directive")]
    pub fallback_caution_directive: String,
    /// Sampling temperature for the classifier (`HEALTH_TRIAGE_CLASSIFIER_TEMPERATURE`).
    /// Value between 0 and 1; zero keeps the one-word label deterministic.
    #[serde(default = "default_classifier_temperature")]
    pub classifier_temperature: f32,
    /// Max output tokens for the classifier (`HEALTH_TRIAGE_CLASSIFIER_MAX_TOKENS`).
    #[serde(default = "default_classifier_max_tokens")]
    pub classifier_max_tokens: u32,
    /// Sampling temperature for the general responder (`HEALTH_TRIAGE_GENERAL_TEMPERATURE`).
    /// Value between 0 and 1.
    #[serde(default = "default_general_temperature")]
    pub general_temperature: f32,
    /// Max output tokens for the general responder (`HEALTH_TRIAGE_GENERAL_MAX_TOKENS`).
    #[serde(default = "default_general_max_tokens")]
    pub general_max_tokens: u32,
}

impl Config {
    /// Load configuration from the environment and, if present, a TOML file
    /// (the explicit path when given, otherwise `.hidden/config.toml`).
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("HEALTH_TRIAGE"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.classifier_temperature < 0.0 || result.classifier_temperature > 1.0 {
            return Err(anyhow::anyhow!("Classifier temperature must be between 0 and 1."));
        }

        if result.general_temperature < 0.0 || result.general_temperature > 1.0 {
            return Err(anyhow::anyhow!("General responder temperature must be between 0 and 1."));
        }

        if result.classifier_max_tokens < 1 || result.general_max_tokens < 1 {
            return Err(anyhow::anyhow!("Max output tokens must be at least 1."));
        }

        // Missing credentials or knowledge base should be loud at startup,
        // not a silent failure deep inside a routing invocation.
        if result.openai_api_key.is_empty() {
            warn!("HEALTH_TRIAGE_OPENAI_API_KEY is not set; every model call will fail.");
        }

        if !std::path::Path::new(&result.knowledge_base_dir).is_dir() {
            warn!("Knowledge-base directory `{}` does not exist; grounded answers will fall back.", result.knowledge_base_dir);
        }

        Ok(result)
    }
}
