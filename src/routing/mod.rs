//! Classification and routing of health questions.
//!
//! This module holds the decision engine:
//! - Single-shot emergency classification of a question
//! - Routing to the grounded or general backend, with fallback
//! - The blocking bridge for callers that cannot suspend

pub mod blocking;
pub mod classifier;
pub mod router;

pub use classifier::Classifier;
pub use router::Router;
