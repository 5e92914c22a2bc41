#![cfg(test)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use health_triage::{
    Runtime,
    base::{
        config::{Config, ConfigInner},
        prompts,
        types::{AnswerSource, GatewayError, GroundedAnswer, GroundedError, ResultClassification},
    },
    service::{
        grounded::{GenericGroundedClient, GroundedClient},
        llm::{GenericLlmClient, LlmClient},
    },
};
use mockall::mock;

// Mocks.

// Mock LLM client for testing.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, system: &str, user: &str, temperature: f32, max_output_tokens: u32) -> Result<String, GatewayError>;
    }
}

// Mock grounded-answer client for testing.

mock! {
    pub Grounded {}

    #[async_trait]
    impl GenericGroundedClient for Grounded {
        async fn answer(&self, question: &str) -> Result<GroundedAnswer, GroundedError>;
    }
}

// Helpers.

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            classifier_system_directive: prompts::CLASSIFIER_SYSTEM_DIRECTIVE.to_string(),
            general_system_directive: prompts::GENERAL_SYSTEM_DIRECTIVE.to_string(),
            fallback_caution_directive: prompts::FALLBACK_CAUTION_DIRECTIVE.to_string(),
            classifier_temperature: 0.0,
            classifier_max_tokens: 20,
            general_temperature: 0.7,
            general_max_tokens: 256,
            ..Default::default()
        }),
    }
}

fn is_classifier_call(system: &str) -> bool {
    system == prompts::CLASSIFIER_SYSTEM_DIRECTIVE
}

fn runtime_with(llm: MockLlm, grounded: MockGrounded) -> Runtime {
    Runtime::with_clients(test_config(), LlmClient::from_client(llm), GroundedClient::from_client(grounded))
}

/// An LLM mock whose classifier call returns `label` and whose general call
/// returns `answer`.
fn llm_returning(label: &'static str, answer: &'static str) -> MockLlm {
    let mut llm = MockLlm::new();

    llm.expect_complete().returning(move |system, _, _, _| {
        if is_classifier_call(system) {
            Ok(label.to_string())
        } else {
            Ok(answer.to_string())
        }
    });

    llm
}

// Routing scenarios.

#[tokio::test]
async fn emergency_question_gets_a_grounded_answer() {
    let llm = llm_returning("emergency", "unused");

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| {
        Ok(GroundedAnswer {
            answer: "Call 911 and chew an aspirin while you wait.".to_string(),
            context: "passage about chest pain".to_string(),
        })
    });

    let result = runtime_with(llm, grounded).route("What should I do if I'm having chest pain?").await;

    assert_eq!(result.answer, "Call 911 and chew an aspirin while you wait.");
    assert_eq!(result.source, AnswerSource::Grounded);
    assert_eq!(result.classification, ResultClassification::Emergency);
}

#[tokio::test]
async fn grounded_query_failure_falls_back_with_a_caution_prompt() {
    let saw_caution = Arc::new(AtomicBool::new(false));
    let saw_caution_clone = saw_caution.clone();

    let mut llm = MockLlm::new();
    llm.expect_complete().returning(move |system, _, _, _| {
        if is_classifier_call(system) {
            Ok("emergency".to_string())
        } else {
            if system.contains(prompts::FALLBACK_CAUTION_DIRECTIVE) {
                saw_caution_clone.store(true, Ordering::SeqCst);
            }
            Ok("Please seek care promptly.".to_string())
        }
    });

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| Err(GroundedError::Query(anyhow::anyhow!("synthesis failed"))));

    let result = runtime_with(llm, grounded).route("What should I do if I'm having chest pain?").await;

    assert_eq!(result.source, AnswerSource::GeneralFallback);
    assert_eq!(result.classification, ResultClassification::EmergencyFallback);
    assert!(saw_caution.load(Ordering::SeqCst), "fallback must augment the system prompt with the caution notice");
}

#[tokio::test]
async fn grounded_init_failure_also_falls_back() {
    let llm = llm_returning("emergency", "Please seek care promptly.");

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| Err(GroundedError::Init("knowledge base missing".to_string())));

    let result = runtime_with(llm, grounded).route("Severe bleeding, what do I do?").await;

    assert_eq!(result.source, AnswerSource::GeneralFallback);
    assert_eq!(result.classification, ResultClassification::EmergencyFallback);
}

#[tokio::test]
async fn non_emergency_question_never_reaches_the_grounded_backend() {
    let llm = llm_returning("non-emergency", "Plenty of vegetables and regular checkups.");

    // No expectation on the grounded mock: any call panics the test.
    let grounded = MockGrounded::new();

    let result = runtime_with(llm, grounded).route("What's a good diet for diabetes?").await;

    assert_eq!(result.answer, "Plenty of vegetables and regular checkups.");
    assert_eq!(result.source, AnswerSource::General);
    assert_eq!(result.classification, ResultClassification::NonEmergency);
}

#[tokio::test]
async fn general_failure_yields_the_fixed_apology() {
    let mut llm = MockLlm::new();
    llm.expect_complete().returning(|system, _, _, _| {
        if is_classifier_call(system) {
            Ok("non-emergency".to_string())
        } else {
            Err(GatewayError::Provider(anyhow::anyhow!("provider down")))
        }
    });

    let result = runtime_with(llm, MockGrounded::new()).route("What's a good diet for diabetes?").await;

    assert_eq!(result.answer, prompts::APOLOGY);
    assert_eq!(result.source, AnswerSource::Error);
    assert_eq!(result.classification, ResultClassification::Error);
}

#[tokio::test]
async fn failed_fallback_still_yields_the_error_result() {
    let mut llm = MockLlm::new();
    llm.expect_complete().returning(|system, _, _, _| {
        if is_classifier_call(system) {
            Ok("emergency".to_string())
        } else {
            Err(GatewayError::Provider(anyhow::anyhow!("provider down")))
        }
    });

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| Err(GroundedError::Query(anyhow::anyhow!("synthesis failed"))));

    let result = runtime_with(llm, grounded).route("What should I do if I'm having chest pain?").await;

    assert_eq!(result.answer, prompts::APOLOGY);
    assert_eq!(result.source, AnswerSource::Error);
    assert_eq!(result.classification, ResultClassification::Error);
}

#[tokio::test]
async fn classifier_transport_failure_fails_open_to_the_general_path() {
    let mut llm = MockLlm::new();
    llm.expect_complete().returning(|system, _, _, _| {
        if is_classifier_call(system) {
            Err(GatewayError::Provider(anyhow::anyhow!("timeout")))
        } else {
            Ok("General advice.".to_string())
        }
    });

    let result = runtime_with(llm, MockGrounded::new()).route("Is this mole normal?").await;

    assert_eq!(result.source, AnswerSource::General);
    assert_eq!(result.classification, ResultClassification::NonEmergency);
}

#[tokio::test]
async fn malformed_classifier_output_routes_to_the_grounded_backend() {
    let llm = llm_returning("maybe", "unused");

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| {
        Ok(GroundedAnswer {
            answer: "Grounded answer.".to_string(),
            context: String::new(),
        })
    });

    let result = runtime_with(llm, grounded).route("Something hurts.").await;

    assert_eq!(result.source, AnswerSource::Grounded);
    assert_eq!(result.classification, ResultClassification::Emergency);
}

#[tokio::test]
async fn noisy_safe_label_still_routes_to_the_general_path() {
    let llm = llm_returning("Non-Emergency!!", "General advice.");

    let result = runtime_with(llm, MockGrounded::new()).route("Should I stretch before running?").await;

    assert_eq!(result.source, AnswerSource::General);
    assert_eq!(result.classification, ResultClassification::NonEmergency);
}

#[tokio::test]
async fn classifier_runs_at_zero_temperature_with_a_one_word_budget() {
    let mut llm = MockLlm::new();
    llm.expect_complete().returning(|system, _, temperature, max_output_tokens| {
        if is_classifier_call(system) {
            assert_eq!(temperature, 0.0);
            assert!(max_output_tokens <= 20, "classifier budget should fit one word");
            Ok("non-emergency".to_string())
        } else {
            Ok("General advice.".to_string())
        }
    });

    let result = runtime_with(llm, MockGrounded::new()).route("What's a good diet for diabetes?").await;

    assert_eq!(result.source, AnswerSource::General);
}

// Blocking adapter scenarios.

#[test]
fn route_blocking_works_without_a_runtime() {
    let llm = llm_returning("non-emergency", "General advice.");

    let result = runtime_with(llm, MockGrounded::new()).route_blocking("What's a good diet for diabetes?");

    assert_eq!(result.answer, "General advice.");
    assert_eq!(result.source, AnswerSource::General);
    assert_eq!(result.classification, ResultClassification::NonEmergency);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn route_blocking_works_inside_a_multi_thread_runtime() {
    let llm = llm_returning("non-emergency", "General advice.");
    let runtime = runtime_with(llm, MockGrounded::new());

    let result = tokio::task::spawn_blocking(move || runtime.route_blocking("What's a good diet for diabetes?")).await.unwrap();

    assert_eq!(result.source, AnswerSource::General);
}

#[tokio::test]
async fn route_blocking_works_inside_a_current_thread_runtime() {
    let llm = llm_returning("emergency", "unused");

    let mut grounded = MockGrounded::new();
    grounded.expect_answer().times(1).returning(|_| {
        Ok(GroundedAnswer {
            answer: "Call 911 and stay on the line.".to_string(),
            context: "passages".to_string(),
        })
    });

    let result = runtime_with(llm, grounded).route_blocking("What should I do if I'm having chest pain?");

    assert_eq!(result.answer, "Call 911 and stay on the line.");
    assert_eq!(result.source, AnswerSource::Grounded);
    assert_eq!(result.classification, ResultClassification::Emergency);
}
