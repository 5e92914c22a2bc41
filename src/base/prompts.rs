//! Fixed prompt text and directives for LLM usage.

/// System directive for the emergency classifier.
///
/// Restricts the model to a single-word answer so that a tiny output-token
/// budget suffices.
pub const CLASSIFIER_SYSTEM_DIRECTIVE: &str = "You are a medical triage assistant. Your task is to classify whether a question is related to a medical emergency that requires immediate or urgent care. Only classify as emergency questions about injuries, severe symptoms, or situations requiring first aid or emergency treatment. Respond with ONLY one word: 'emergency' or 'non-emergency'.";

/// System directive for the general conversational responder.
pub const GENERAL_SYSTEM_DIRECTIVE: &str = "You are a helpful assistant answering general health questions.";

/// Appended to the general directive when the grounded backend has failed
/// and the general model is answering an emergency-classified question.
pub const FALLBACK_CAUTION_DIRECTIVE: &str = " NOTE: This is a fallback response because the emergency answering system failed. Add appropriate caution.";

/// System directive for grounded answer synthesis over retrieved passages.
///
/// The response shape placeholder is filled from the engine's search
/// parameters (e.g. "single paragraph").
pub const GROUNDED_SYNTHESIS_DIRECTIVE: &str = "You are an emergency medical answering assistant. Answer the user's question using ONLY the reference passages provided below. If the passages do not contain the answer, say so plainly and recommend contacting emergency services. Respond as a {response_type}.";

/// Human-directed advisory emitted when a question classifies as an
/// emergency. Not part of the returned result.
pub const EMERGENCY_ADVISORY: &str = "This question is classified as an emergency. Please contact emergency services if you think you need medical assistance. (USA: call 911.)";

/// Fixed, non-alarming apology returned on total failure.
pub const APOLOGY: &str = "I apologize, but I'm having trouble providing a response at the moment. Please try again later.";
