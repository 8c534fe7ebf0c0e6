use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced by the API layer.
///
/// The core signals misses through sentinel returns; this type maps
/// them to HTTP status codes at the boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing private hash or recovery key for user {0}")]
    MissingCredentials(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_maps_to_404() {
        let error = ApiError::MissingCredentials("u1".to_string());

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.to_string().contains("u1"));
    }
}
