//! Error types for the signfield API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use signfield_core::PlacementError;
use signfield_render::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Document already exists: {0}")]
    DocumentExists(String),

    #[error("Signed document not available: {0}")]
    SignedNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Placements the user cannot act on are dropped quietly
        if let ApiError::Placement(e) = &self {
            if e.is_suppressed() {
                tracing::warn!("Suppressed: {}", e);
                return StatusCode::NO_CONTENT.into_response();
            }
        }

        let status = match &self {
            ApiError::SessionNotFound(_) | ApiError::SignedNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DocumentExists(_) => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Placement(e) => placement_status(e),
            ApiError::Render(RenderError::ParseError(_)) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) | ApiError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let ApiError::Placement(PlacementError::IncompleteField { field_ids }) = &self {
            body["fieldIds"] = json!(field_ids);
        }

        (status, Json(body)).into_response()
    }
}

fn placement_status(e: &PlacementError) -> StatusCode {
    match e {
        PlacementError::NotReady { .. }
        | PlacementError::TransformDegenerate { .. }
        | PlacementError::OutOfBounds { .. } => StatusCode::NO_CONTENT,
        PlacementError::IncompleteField { .. } | PlacementError::EmptyFieldSet => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PlacementError::BackendFailure(_) => StatusCode::BAD_GATEWAY,
        PlacementError::FieldNotFound(_) => StatusCode::NOT_FOUND,
        PlacementError::UnknownFieldType(_) | PlacementError::UnknownFont(_) => {
            StatusCode::BAD_REQUEST
        }
        PlacementError::SessionLocked
        | PlacementError::FinalizationInProgress
        | PlacementError::NoInteraction
        | PlacementError::NotFinalizing => StatusCode::CONFLICT,
    }
}
