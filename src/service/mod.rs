//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the two answer-generation
//! backends used by health-triage:
//! - LLM services (e.g., OpenAI) for classification and general answers
//! - Grounded-answer services (the knowledge-base-backed engine)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod grounded;
pub mod llm;
