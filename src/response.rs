use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::engine::error::EngineError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<SuccessResponse<T>> {
    Json(SuccessResponse {
        success: true,
        data,
    })
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    fn operational(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        let (status, code) = match &err {
            EngineError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            EngineError::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS"),
            EngineError::UnknownPerk(_) => (StatusCode::NOT_FOUND, "UNKNOWN_PERK"),
            EngineError::AlreadySubmitted(_) => (StatusCode::CONFLICT, "ALREADY_SUBMITTED"),
            EngineError::UnknownQuiz(_) => (StatusCode::NOT_FOUND, "UNKNOWN_QUIZ"),
            EngineError::InsufficientQuestions { .. } => {
                (StatusCode::CONFLICT, "INSUFFICIENT_QUESTIONS")
            }
            EngineError::DailyLimitExceeded { .. } => {
                (StatusCode::FORBIDDEN, "DAILY_LIMIT_EXCEEDED")
            }
            EngineError::UnknownStudent(_) => (StatusCode::NOT_FOUND, "UNKNOWN_STUDENT"),
            EngineError::Persistence(inner) => {
                // Durable write failed mid-operation. The transaction never
                // committed, so callers may retry; everything else is terminal.
                tracing::error!(error = %inner, "persistence failure");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "PERSISTENCE_FAILURE".to_string(),
                    message,
                    is_operational: false,
                };
            }
        };

        Self::operational(status, code, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            "internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}
