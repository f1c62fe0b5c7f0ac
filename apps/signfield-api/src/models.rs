//! Request and response models for the signfield API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signfield_core::{Field, FieldId, FieldType, SessionState};
use signfield_render::PageSize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub document_id: Option<String>,
    /// Original PDF; required for the local renderer to produce output
    #[serde(default)]
    pub pdf_base64: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentResponse {
    pub document_id: String,
    /// Hex SHA-256 of the uploaded PDF
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_hash: Option<String>,
    pub pages: Vec<PageSize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub document_id: String,
    #[serde(flatten)]
    pub state: SessionState,
    pub fields: Vec<Field>,
    pub selected_field_id: Option<FieldId>,
    pub placement_mode: Option<FieldType>,
    pub complete: bool,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Measured size of a rendered page
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportRequest {
    pub rendered_width: f64,
    pub rendered_height: f64,
    pub native_width: f64,
    pub native_height: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceFieldRequest {
    #[serde(rename = "type")]
    pub field_type: String,
    pub page: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct MoveFieldRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct ResizeFieldRequest {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct SetContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFontRequest {
    pub font: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub signed_file_url: String,
}
