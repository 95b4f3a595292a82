//! Outbound contract and error mapping.
//!
//! # Design Decisions
//! - Success is always `{"answer", "model_used"}`, whichever stage answered
//! - Errors are `{"error": message}` with a status per error kind
//! - Budget exhaustion maps to 504 Gateway Timeout

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CanonicalResponse, ValidationError};
use crate::resilience::ChainError;

/// Header naming the stage that produced the answer.
pub const X_ANSWER_STAGE: &str = "x-answer-stage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerBody {
    pub answer: String,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&CanonicalResponse> for AnswerBody {
    fn from(response: &CanonicalResponse) -> Self {
        Self {
            answer: response.answer_text.clone(),
            model_used: response.model_used(),
        }
    }
}

/// A successful answer.
pub struct Answer(pub CanonicalResponse);

impl IntoResponse for Answer {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(AnswerBody::from(&self.0))).into_response();
        response
            .headers_mut()
            .insert(X_ANSWER_STAGE, HeaderValue::from_static(self.0.stage.as_str()));
        response
    }
}

/// Failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Chain(ChainError::BudgetExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Chain(ChainError::Exhausted) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
