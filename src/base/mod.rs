//! Core components, types, and utilities for health-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System directives and fixed prompt text for LLM interactions.
//! - Common types, the routed error taxonomy, and result handling.

pub mod config;
pub mod prompts;
pub mod types;
