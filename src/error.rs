// Error kinds shared by the validator, the store mutator and the gateway.

use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PalError {
    /// A required request field is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid pal name: {0}")]
    UnknownSpecies(String),

    /// Carries the first trait name that failed the catalog lookup.
    #[error("Invalid passive skill: {0}")]
    UnknownTrait(String),

    #[error("Invalid gender: {token}. Must be {expected}")]
    InvalidGender { token: String, expected: &'static str },

    #[error("Pal not found: {name} #{id}")]
    RecordNotFound { name: String, id: u32 },

    /// The store gateway could not complete a read or a write.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type PalResult<T> = Result<T, PalError>;

impl PalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PalError::InvalidInput(_)
            | PalError::UnknownSpecies(_)
            | PalError::UnknownTrait(_)
            | PalError::InvalidGender { .. } => StatusCode::BAD_REQUEST,
            PalError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            PalError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PalError::InvalidInput(_) => "invalid_input",
            PalError::UnknownSpecies(_) => "unknown_species",
            PalError::UnknownTrait(_) => "unknown_trait",
            PalError::InvalidGender { .. } => "invalid_gender",
            PalError::RecordNotFound { .. } => "record_not_found",
            PalError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<sqlx::Error> for PalError {
    fn from(e: sqlx::Error) -> Self {
        PalError::StoreUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for PalError {
    fn from(e: serde_json::Error) -> Self {
        PalError::StoreUnavailable(format!("malformed stored JSON: {e}"))
    }
}

impl From<JsonRejection> for PalError {
    fn from(rejection: JsonRejection) -> Self {
        PalError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for PalError {
    fn into_response(self) -> axum::response::Response {
        if let PalError::StoreUnavailable(msg) = &self {
            tracing::error!("Store error: {msg}");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PalError::UnknownTrait("Bogus".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PalError::RecordNotFound {
                name: "Lamball".into(),
                id: 3
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PalError::StoreUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_messages_name_offending_input() {
        assert_eq!(
            PalError::UnknownSpecies("Pikachu".into()).to_string(),
            "Invalid pal name: Pikachu"
        );
        assert_eq!(
            PalError::InvalidGender {
                token: "x".into(),
                expected: "'m' or 'f'"
            }
            .to_string(),
            "Invalid gender: x. Must be 'm' or 'f'"
        );
    }
}
