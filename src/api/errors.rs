use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::errors::DataUnavailable;
use crate::services::quiz::{AnswerError, StoreError, SubmitRejection};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::ServiceUnavailable(message) => {
                tracing::warn!(error = %message, "Service unavailable");
                message
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                message
            }
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::UnprocessableEntity(message) => message,
        };

        (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
    }
}

impl From<DataUnavailable> for ApiError {
    fn from(err: DataUnavailable) -> Self {
        ApiError::ServiceUnavailable(err.to_string())
    }
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::NotAnswering(_) => ApiError::Conflict(err.to_string()),
            AnswerError::UnknownQuestion(_) | AnswerError::UnknownChoice { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<SubmitRejection> for ApiError {
    fn from(err: SubmitRejection) -> Self {
        match err {
            SubmitRejection::Incomplete { .. } => ApiError::UnprocessableEntity(err.to_string()),
            SubmitRejection::NotStarted
            | SubmitRejection::InFlight
            | SubmitRejection::AlreadyGraded => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(err.to_string()),
            StoreError::AtCapacity(_) => ApiError::ServiceUnavailable(err.to_string()),
            StoreError::Rejected(rejection) => rejection.into(),
            StoreError::GradingTask(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_map_to_statuses() {
        let incomplete: ApiError = SubmitRejection::Incomplete { answered: 1, total: 2 }.into();
        assert_eq!(incomplete.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let in_flight: ApiError = StoreError::Rejected(SubmitRejection::InFlight).into();
        assert_eq!(in_flight.status(), StatusCode::CONFLICT);

        let missing: ApiError = StoreError::NotFound.into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let full: ApiError = StoreError::AtCapacity(3).into();
        assert_eq!(full.status(), StatusCode::SERVICE_UNAVAILABLE);

        let crashed: ApiError = StoreError::GradingTask("task panicked".to_string()).into();
        assert_eq!(crashed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
