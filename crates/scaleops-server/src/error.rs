use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scaleops_core::error::ScaleOpsError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(ScaleOpsError::Validation(msg.into()).into())
    }
}

pub fn status_for(e: &ScaleOpsError) -> StatusCode {
    match e {
        ScaleOpsError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        ScaleOpsError::NotInitialized
        | ScaleOpsError::InvalidItemId(_)
        | ScaleOpsError::InvalidTab(_)
        | ScaleOpsError::InvalidFormat(_)
        | ScaleOpsError::Validation(_) => StatusCode::BAD_REQUEST,
        ScaleOpsError::Storage(_) => StatusCode::INSUFFICIENT_STORAGE,
        ScaleOpsError::Network(_) => StatusCode::BAD_GATEWAY,
        ScaleOpsError::LibraryUnavailable(_)
        | ScaleOpsError::Io(_)
        | ScaleOpsError::Yaml(_)
        | ScaleOpsError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<ScaleOpsError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: ScaleOpsError) -> StatusCode {
        AppError(e.into()).into_response().status()
    }

    #[test]
    fn item_not_found_maps_to_404() {
        assert_eq!(status(ScaleOpsError::ItemNotFound("1-1".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status(ScaleOpsError::Validation("missing who".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invalid_item_id_maps_to_400() {
        assert_eq!(
            status(ScaleOpsError::InvalidItemId("BAD".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_maps_to_507() {
        assert_eq!(
            status(ScaleOpsError::Storage("quota exceeded".into())),
            StatusCode::INSUFFICIENT_STORAGE
        );
    }

    #[test]
    fn network_maps_to_502() {
        assert_eq!(
            status(ScaleOpsError::Network("refused".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        assert_eq!(status(ScaleOpsError::Io(io_err)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let response = AppError(anyhow::anyhow!("something unexpected")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError::bad_request("nothing to save").into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
