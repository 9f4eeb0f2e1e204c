use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, complaint::ComplaintError, emergency::EmergencyError, fir::FirError,
    notification::NotificationError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Fir(#[from] FirError),
    #[error(transparent)]
    Complaint(#[from] ComplaintError),
    #[error(transparent)]
    Emergency(#[from] EmergencyError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Access token required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Admin access required")]
    StaffOnly,
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Database unavailable")]
    Unavailable,
    /// A server-side failure reported to the client as `operation` only.
    #[error("{operation}: {source}")]
    Failed {
        operation: &'static str,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::MissingFields | AuthError::UserExists => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::Database(_)
                | AuthError::Password(_)
                | AuthError::Token(_)
                | AuthError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Fir(err) => match err {
                FirError::Validation(_) => StatusCode::BAD_REQUEST,
                FirError::NotFound => StatusCode::NOT_FOUND,
                FirError::AccessDenied => StatusCode::FORBIDDEN,
                FirError::Database(_) | FirError::NumberExhausted => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Complaint(err) => match err {
                ComplaintError::Validation(_) => StatusCode::BAD_REQUEST,
                ComplaintError::NotFound => StatusCode::NOT_FOUND,
                ComplaintError::AccessDenied => StatusCode::FORBIDDEN,
                ComplaintError::Database(_) | ComplaintError::NumberExhausted => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Emergency(err) => match err {
                EmergencyError::Validation(_) => StatusCode::BAD_REQUEST,
                EmergencyError::NotFound => StatusCode::NOT_FOUND,
                EmergencyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Notification(err) => match err {
                NotificationError::NotFound => StatusCode::NOT_FOUND,
                NotificationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken | ApiError::StaffOnly => StatusCode::FORBIDDEN,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Failed { operation, source } => {
                error!(error = %source, "{operation}");
                operation.to_string()
            }
            _ if status.is_server_error() => {
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Attach the client-facing message used if the error turns out to be a server-side failure.
pub trait Operation<T> {
    fn during(self, operation: &'static str) -> Result<T, ApiError>;
}

impl<T, E> Operation<T> for Result<T, E>
where
    E: Into<ApiError>,
{
    fn during(self, operation: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| {
            let err = err.into();
            if err.status().is_server_error() {
                ApiError::Failed {
                    operation,
                    source: Box::new(err),
                }
            } else {
                err
            }
        })
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
