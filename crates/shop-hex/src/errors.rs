use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shop_types::ports::repository::RepoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => AppError::NotFound(e.to_string()),
            RepoError::Validation(v) => AppError::Unprocessable(v.to_string()),
            RepoError::Storage(s) => AppError::Internal(anyhow::Error::new(s)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::domain::entity::ValidationError;
    use shop_types::ports::repository::StoreError;

    #[test]
    fn repo_errors_map_to_status_codes() {
        let cases = [
            (
                AppError::from(RepoError::NotFound { kind: "user", id: 9 }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(RepoError::Validation(ValidationError::invalid("bad"))),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(RepoError::Storage(StoreError::Io(std::io::Error::other(
                    "disk",
                )))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(err.into_response().status(), code);
        }
    }
}
