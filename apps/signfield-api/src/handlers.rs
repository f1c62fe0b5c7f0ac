//! HTTP handlers for the signfield API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use signfield_core::{
    Field, FieldId, FieldType, FontId, PageViewport, RenderBackend, RenderRequest, RenderResponse,
};
use signfield_render::page_sizes;
use signfield_render::store::signed_file_name;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Start an edit session, optionally uploading the original PDF
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), ApiError> {
    let document_id = match req.document_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let pdf_data = req
        .pdf_base64
        .map(|encoded| {
            BASE64
                .decode(encoded.trim())
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))
        })
        .transpose()?;
    let pages = match &pdf_data {
        Some(bytes) => page_sizes(bytes)?,
        None => Vec::new(),
    };

    state.create_session(&document_id).await?;
    let document_hash = match pdf_data {
        Some(bytes) => Some(state.store.insert_original(&document_id, bytes).await),
        None => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            document_id,
            document_hash,
            pages,
        }),
    ))
}

/// Current state of a session
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let entry = state.session(&id).await?;
    let entry = entry.lock().await;
    let session = &entry.session;

    Ok(Json(SessionSnapshot {
        document_id: session.document_id().to_string(),
        state: session.state().clone(),
        fields: session.fields().to_vec(),
        selected_field_id: session.selected(),
        placement_mode: session.placement_mode(),
        complete: session.is_complete(),
        last_error: session.last_error().map(str::to_string),
        created_at: entry.created_at,
    }))
}

/// Record the measured size of a rendered page
///
/// A zero or non-finite size marks the page as not rendered.
pub async fn report_viewport(
    State(state): State<Arc<AppState>>,
    Path((id, page)): Path<(String, u32)>,
    Json(req): Json<ViewportRequest>,
) -> Result<Json<PageViewport>, ApiError> {
    let entry = state.session(&id).await?;
    let viewport = PageViewport::new(
        page,
        req.rendered_width,
        req.rendered_height,
        req.native_width,
        req.native_height,
    );
    entry.lock().await.viewports.update(viewport)?;
    Ok(Json(viewport))
}

/// Place a new field at a click on a page
pub async fn place_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PlaceFieldRequest>,
) -> Result<(StatusCode, Json<Field>), ApiError> {
    let field_type: FieldType = req.field_type.parse()?;
    let entry = state.session(&id).await?;
    let mut guard = entry.lock().await;
    let entry = &mut *guard;

    let field = entry
        .session
        .place(field_type, req.page, req.x, req.y, &entry.viewports)?;
    Ok((StatusCode::CREATED, Json(field.clone())))
}

pub async fn move_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, FieldId)>,
    Json(req): Json<MoveFieldRequest>,
) -> Result<Json<Field>, ApiError> {
    let entry = state.session(&id).await?;
    let mut guard = entry.lock().await;
    let entry = &mut *guard;

    let field = entry
        .session
        .move_field(field_id, req.x, req.y, &entry.viewports)?;
    Ok(Json(field.clone()))
}

pub async fn resize_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, FieldId)>,
    Json(req): Json<ResizeFieldRequest>,
) -> Result<Json<Field>, ApiError> {
    let entry = state.session(&id).await?;
    let mut guard = entry.lock().await;
    let entry = &mut *guard;

    let field = entry
        .session
        .resize_field(field_id, req.width, req.height, &entry.viewports)?;
    Ok(Json(field.clone()))
}

pub async fn set_content(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, FieldId)>,
    Json(req): Json<SetContentRequest>,
) -> Result<Json<Field>, ApiError> {
    let entry = state.session(&id).await?;
    let mut entry = entry.lock().await;
    let field = entry.session.set_content(field_id, &req.content)?;
    Ok(Json(field.clone()))
}

pub async fn set_font(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, FieldId)>,
    Json(req): Json<SetFontRequest>,
) -> Result<Json<Field>, ApiError> {
    let font: FontId = req.font.parse()?;
    let entry = state.session(&id).await?;
    let mut entry = entry.lock().await;
    let field = entry.session.set_font(field_id, font)?;
    Ok(Json(field.clone()))
}

pub async fn remove_field(
    State(state): State<Arc<AppState>>,
    Path((id, field_id)): Path<(String, FieldId)>,
) -> Result<StatusCode, ApiError> {
    let entry = state.session(&id).await?;
    entry.lock().await.session.remove(field_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hand the session to the rendering backend
///
/// The session lock is not held during the backend call, so concurrent
/// requests see the `finalizing` state instead of waiting. The call and its
/// outcome run on their own task: a dropped request still leaves the session
/// either finalized or back in editing.
pub async fn finalize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let entry = state.session(&id).await?;
    let request = entry.lock().await.session.begin_finalize()?;

    let backend = Arc::clone(&state.backend);
    let task = tokio::spawn(async move {
        let outcome = backend.render(&request).await;
        entry.lock().await.session.complete_finalize(outcome)
    });
    let signed_file_url = task
        .await
        .map_err(|e| anyhow::anyhow!("finalization task for {} failed: {}", id, e))??;

    Ok(Json(FinalizeResponse { signed_file_url }))
}

/// Download a document signed by the local renderer
pub async fn get_signed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let signed = state
        .store
        .signed(&id)
        .await
        .ok_or_else(|| ApiError::SignedNotFound(id.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", signed_file_name(&id)),
            ),
            (header::ETAG, format!("\"{}\"", signed.document_hash)),
        ],
        signed.bytes.as_ref().clone(),
    )
        .into_response())
}

/// Rendering backend contract served by the local renderer
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Json<RenderResponse> {
    let response = state
        .local
        .render(&request)
        .await
        .unwrap_or_else(|e| RenderResponse::failure(e.to_string()));
    Json(response)
}
