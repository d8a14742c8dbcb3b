use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use bookshelf_dal::validation::InvalidBook;
use http::StatusCode;
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

/// Errors returned from handlers; rendered as plain text bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidBook(#[from] InvalidBook),

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("{0} not found.")]
    ResourceNotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<bookshelf_dal::Error> for ApiError {
    fn from(value: bookshelf_dal::Error) -> Self {
        match value {
            bookshelf_dal::Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            e @ bookshelf_dal::Error::DuplicateBook => ApiError::Conflict(e.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBook(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidUrl(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
            (status, "Internal server error").into_response()
        } else {
            debug!(status = status.as_u16(), "Request rejected: {self}");
            (status, self.to_string()).into_response()
        }
    }
}
