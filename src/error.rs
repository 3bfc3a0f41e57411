use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The unified failure taxonomy for every service operation. All failures are caught
/// at the request boundary and converted into the JSON error envelope
/// `{"success": false, "message": ..., "error": ...}` via the `IntoResponse` impl below.
///
/// Store-level failures are classified on entry: the `From<sqlx::Error>` impl
/// translates the known Postgres constraint-violation codes into the matching
/// taxonomy variants, and anything unrecognized stays in `Database` with the raw
/// cause preserved for the diagnostic field.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session / invalid or expired credentials (401).
    #[error("{0}")]
    Unauthorized(String),
    /// Role, ownership, or email-verification failure (403).
    #[error("{0}")]
    Forbidden(String),
    /// A referenced entity does not exist (404).
    #[error("{0}")]
    NotFound(String),
    /// Malformed or rejected input, including foreign-key and not-null violations (400).
    #[error("{0}")]
    Validation(String),
    /// Uniqueness violation surfaced to the caller (409).
    #[error("{0}")]
    Conflict(String),
    /// A business-rule rejection, e.g. a redundant moderation transition (400).
    #[error("{0}")]
    DomainRule(String),
    /// An unclassified error from the persistent store (500).
    #[error("database operation failed")]
    Database(sqlx::Error),
}

impl ApiError {
    /// Convenience constructor for the standard "no session" rejection.
    pub fn unauthorized() -> Self {
        Self::Unauthorized("You are not authorized".to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    /// Resolves the (status, user-facing message, raw diagnostic) triple.
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            Self::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone(), None),
            Self::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone(), None),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m.clone(), None),
            Self::Validation(m) => (StatusCode::BAD_REQUEST, m.clone(), None),
            Self::Conflict(m) => (StatusCode::CONFLICT, m.clone(), None),
            Self::DomainRule(m) => (StatusCode::BAD_REQUEST, m.clone(), None),
            Self::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database operation failed".to_string(),
                Some(err.to_string()),
            ),
        }
    }
}

/// Classifies store errors into the taxonomy. Known constraint-violation codes
/// are translated into sanitized messages here: 23505 (unique) -> Conflict,
/// 23503 (foreign key) -> Validation, 23502 (not null) -> Validation,
/// RowNotFound -> NotFound. Everything else is an unclassified Database error.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound("Record not found".to_string());
        }

        let code = match &err {
            sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
            _ => None,
        };

        match code.as_deref() {
            Some("23505") => {
                Self::Conflict("A record with these values already exists".to_string())
            }
            Some("23503") => Self::Validation("Referenced record does not exist".to_string()),
            Some("23502") => Self::Validation("A required value was missing".to_string()),
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = %status, message = %message, detail = ?detail, "request failed");
        }

        let body = json!({
            "success": false,
            "message": message,
            "error": detail,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(
            ApiError::unauthorized().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("bad ref".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DomainRule("redundant".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn row_not_found_from_store_becomes_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Record not found");
    }

    #[test]
    fn unclassified_store_errors_keep_the_raw_cause_in_the_diagnostic_field() {
        let err: ApiError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, ApiError::Database(_)));
        let (status, message, detail) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Database operation failed");
        assert!(detail.is_some());
    }
}
