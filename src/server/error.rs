use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_core::{ErrorClass, RelayError};
use serde::Serialize;

/// `RelayError` rendered as `{"error", "kind"}` with a status from its class.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.class() {
            ErrorClass::Input => StatusCode::BAD_REQUEST,
            ErrorClass::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorClass::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.0.class() {
            ErrorClass::Input => tracing::info!("[http] {} {}", status.as_u16(), self.0),
            ErrorClass::Upstream | ErrorClass::Timeout => {
                tracing::error!("[http] {} {}", status.as_u16(), self.0)
            }
        }

        let body = Json(ErrorBody {
            error: self.0.public_message(),
            kind: self.0.kind(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        assert_eq!(
            ApiError(RelayError::MissingInput("url".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(RelayError::UnsupportedPlatform("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(RelayError::NoMediaFound("u".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(RelayError::timeout("u", 30)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
