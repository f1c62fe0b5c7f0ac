//! Finalization assembler
//!
//! Converts the edited fields into the page-indexed, PDF-point-space
//! annotation list consumed by the rendering backend. No clamping happens
//! here; the backend keeps drawn text inside the page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::RenderRequest;
use crate::coords::to_pdf_point;
use crate::error::PlacementError;
use crate::field::{Field, FieldType, FontId};

/// One annotation in PDF point space
///
/// `x`/`y` are the field's top-left corner in PDF points. `width`, `height`
/// and `font_size` are passed through as measured in the field's rendered
/// viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedAnnotation {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub content: String,
    pub font: Option<FontId>,
    pub font_size: f64,
}

/// Check that a field set may be finalized
pub fn ensure_finalizable(fields: &[Field]) -> Result<(), PlacementError> {
    if fields.is_empty() {
        return Err(PlacementError::EmptyFieldSet);
    }

    let incomplete: Vec<_> = fields
        .iter()
        .filter(|f| !f.is_complete())
        .map(|f| f.id())
        .collect();
    if !incomplete.is_empty() {
        return Err(PlacementError::IncompleteField {
            field_ids: incomplete,
        });
    }

    Ok(())
}

/// Express one field in PDF point space using the viewport it was measured in
pub fn to_annotation(field: &Field) -> Result<PlacedAnnotation, PlacementError> {
    let viewport = field.viewport_snapshot();
    let (x, y) = to_pdf_point(field.x(), field.y(), viewport)?;

    debug!(
        "Field {} page {}: rendered ({:.2}, {:.2}) -> pdf ({:.2}, {:.2})",
        field.id(),
        field.page(),
        field.x(),
        field.y(),
        x,
        y
    );

    Ok(PlacedAnnotation {
        page: field.page(),
        x,
        y,
        width: field.width(),
        height: field.height(),
        field_type: field.field_type(),
        content: field.content().to_string(),
        font: field.font(),
        font_size: field.font_size(),
    })
}

/// Build the backend request for a document, ordered by page
pub fn assemble(document_id: &str, fields: &[Field]) -> Result<RenderRequest, PlacementError> {
    ensure_finalizable(fields)?;

    let mut signatures = fields
        .iter()
        .map(to_annotation)
        .collect::<Result<Vec<_>, _>>()?;
    // Stable: fields keep placement order within a page
    signatures.sort_by_key(|a| a.page);

    Ok(RenderRequest {
        document_id: document_id.to_string(),
        signatures,
    })
}

/// Group annotations by page number
pub fn by_page(annotations: &[PlacedAnnotation]) -> BTreeMap<u32, Vec<&PlacedAnnotation>> {
    let mut pages: BTreeMap<u32, Vec<&PlacedAnnotation>> = BTreeMap::new();
    for annotation in annotations {
        pages.entry(annotation.page).or_default().push(annotation);
    }
    pages
}
