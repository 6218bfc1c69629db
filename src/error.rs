//! Error taxonomy for the orchestration layer.
//!
//! Four families: generation (AI call failed or returned a structurally
//! invalid payload), persistence (entity store write failed), validation
//! (malformed local input, rejected before any network call), and unknown
//! entity lookups. Cosmetic generation failures (greetings, feedback) are
//! handled with fallbacks at the call site and never reach this type.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("unknown {kind}: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("AI provider is not configured")]
    AiUnavailable,
}

impl TutorError {
    fn status(&self) -> StatusCode {
        match self {
            TutorError::Validation(_) => StatusCode::BAD_REQUEST,
            TutorError::NotFound { .. } => StatusCode::NOT_FOUND,
            TutorError::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            TutorError::Generation(_) | TutorError::Persistence(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for TutorError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(TutorError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TutorError::NotFound { kind: "topic", id: "zzz".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(TutorError::Generation("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(TutorError::AiUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
