//! Static degraded answer, the last stage of the chain.

use crate::model::{CanonicalResponse, Stage, DEGRADED_LABEL};

pub const DEGRADED_ANSWER: &str =
    "I'm sorry, system is currently under high load. Please try again later.";

/// The canned response. Infallible.
pub fn degraded_response() -> CanonicalResponse {
    CanonicalResponse {
        answer_text: DEGRADED_ANSWER.to_string(),
        backend_used: DEGRADED_LABEL.to_string(),
        stage: Stage::Degraded,
    }
}
