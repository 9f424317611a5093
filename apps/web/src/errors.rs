use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::flash::{redirect_with_flash, Flash};
use crate::sheet::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant ends in a redirect to the form with a flash message; internal
/// details are logged and never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed form submission: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let flash = match &self {
            AppError::Validation(e) => {
                tracing::info!("Rejected sheet request: {e}");
                Flash::from(e)
            }
            AppError::Multipart(e) => {
                tracing::error!("Multipart error: {e}");
                Flash::GenerationFailed
            }
            AppError::Internal(e) => {
                tracing::error!("Error generating OMR sheet: {e:?}");
                Flash::GenerationFailed
            }
        };

        redirect_with_flash(flash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    fn flash_cookie_of(response: &Response) -> &str {
        response.headers()[header::SET_COOKIE].to_str().unwrap()
    }

    #[test]
    fn test_validation_error_redirects_with_specific_flash() {
        let response = AppError::from(ValidationError::NoSubjects).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(flash_cookie_of(&response).starts_with("omr_flash=subjects_required;"));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response =
            AppError::from(anyhow::anyhow!("disk full at /tmp/secret-path")).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = flash_cookie_of(&response);
        assert!(cookie.starts_with("omr_flash=generation_failed;"));
        assert!(!cookie.contains("secret"));
    }
}
