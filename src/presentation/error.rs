// API error mapping
use crate::application::dashboard_service::DashboardError;
use crate::domain::facility::UnknownSortOrder;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    InvalidSort(#[from] UnknownSortOrder),
    #[error("refresh failed: {0:#}")]
    Refresh(anyhow::Error),
    #[error("failed to encode response")]
    Encoding(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Dashboard(DashboardError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Dashboard(DashboardError::UnknownPark(_))
            | ApiError::Dashboard(DashboardError::UnknownFacility(_)) => StatusCode::NOT_FOUND,
            ApiError::InvalidSort(_) => StatusCode::BAD_REQUEST,
            ApiError::Refresh(_) => StatusCode::BAD_GATEWAY,
            ApiError::Encoding(status) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(DashboardError::NotReady).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(DashboardError::UnknownFacility("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UnknownSortOrder("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Refresh(anyhow::anyhow!("down")).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::from(DashboardError::UnknownPark("USJ".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
