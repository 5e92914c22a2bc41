//! Library root for `health-triage`.
//!
//! Health-triage is an OpenAI-powered router for free-text health questions
//! designed to:
//! - Classify each question as emergency or non-emergency
//! - Answer emergencies from a grounded, pre-indexed knowledge base
//! - Answer everything else with a general conversational model
//! - Fall back to the general model (with an explicit caution) when the
//!   grounded backend fails
//!
//! The architecture is built around extensible traits that allow for
//! different implementations of each service, and every failure path is
//! contained: a routing invocation always yields exactly one result.

#[deny(missing_docs)]
pub mod base;
pub mod routing;
pub mod runtime;
pub mod service;

pub use base::types::RoutingResult;
pub use runtime::Runtime;
