use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ActivityError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Everything a handler can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error("{0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Activity(ActivityError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Activity(ActivityError::AlreadySignedUp | ActivityError::NotSignedUp) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
