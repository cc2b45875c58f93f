use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::Error;
use crate::invite::InviteError;

#[derive(Debug)]
pub enum ApiError {
    /// A failure from the invite flow, rendered under its taxonomy code.
    Invite(InviteError),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invite(err) => match err {
                InviteError::MissingToken
                | InviteError::InvalidToken
                | InviteError::Revoked
                | InviteError::Expired
                | InviteError::Exhausted
                | InviteError::EmailMismatch
                | InviteError::MemberNotFound => StatusCode::BAD_REQUEST,
                InviteError::Unauthenticated => StatusCode::UNAUTHORIZED,
                InviteError::AssignmentFailed(_) | InviteError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Invite(err) => err.code(),
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error = self.code();

        // Server-side detail stays in the logs.
        let message = match self {
            ApiError::Invite(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg,
            ApiError::Internal(_) => "internal server error".to_string(),
        };

        (status, Json(ErrorBody { success: false, error, message })).into_response()
    }
}

impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        ApiError::Invite(err)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message, .. } => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
