// src/fetch/outcome.rs
// =============================================================================
// What a run hands back: one terminal outcome per unique endpoint.
//
// A failure is its own variant carrying every error seen, so an endpoint
// that legitimately returned "{}" can't be mistaken for one that gave up.
// Callers that want the old "{}" marker can still ask for it.
// =============================================================================

use serde::Serialize;
use std::collections::HashMap;

/// The bytes older consumers used to mean "this endpoint failed".
pub const LEGACY_FAILURE_PAYLOAD: &[u8] = b"{}";

/// Terminal outcome for a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Response body of the successful attempt
    Success { payload: Vec<u8> },
    /// One description per failed attempt, in order
    Failed { errors: Vec<String> },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            FetchOutcome::Success { payload } => Some(payload),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            FetchOutcome::Success { .. } => &[],
            FetchOutcome::Failed { errors } => errors,
        }
    }

    /// Body on success, `b"{}"` on failure.
    pub fn legacy_payload(&self) -> &[u8] {
        self.payload().unwrap_or(LEGACY_FAILURE_PAYLOAD)
    }
}

/// Endpoint -> outcome, one entry per unique endpoint of the run.
pub type ResultMapping = HashMap<String, FetchOutcome>;
