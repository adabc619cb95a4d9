//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the provider client and the persona. Nothing in it changes
//! after startup, so every relay request runs independently of the others.

use std::sync::Arc;

use crate::llm::LlmStream;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmStream>>,
    /// System instruction prepended to every provider request.
    pub persona: Arc<str>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmStream>>, persona: impl Into<Arc<str>>) -> Self {
        Self { llm, persona: persona.into() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
