//! Coordinate transformation between rendered-page pixels and PDF points
//!
//! Rendered space: origin top-left, Y grows downward, pixels.
//! PDF space: origin bottom-left, Y grows upward, points.

use crate::error::PlacementError;
use crate::viewport::PageViewport;

/// Convert a rendered-pixel point to PDF points for the viewport's page
pub fn to_pdf_point(
    px: f64,
    py: f64,
    viewport: &PageViewport,
) -> Result<(f64, f64), PlacementError> {
    viewport.ensure_measured()?;

    let pdf_x = px * viewport.scale_x();
    // Flip Y axis
    let pdf_y = viewport.native_height - (py * viewport.scale_y());

    finite_or_degenerate(pdf_x, pdf_y, viewport.page_number)
}

/// Convert a PDF point back to rendered pixels for the viewport's page
pub fn to_rendered_point(
    pdf_x: f64,
    pdf_y: f64,
    viewport: &PageViewport,
) -> Result<(f64, f64), PlacementError> {
    viewport.ensure_measured()?;

    let px = pdf_x / viewport.scale_x();
    let py = (viewport.native_height - pdf_y) / viewport.scale_y();

    finite_or_degenerate(px, py, viewport.page_number)
}

fn finite_or_degenerate(x: f64, y: f64, page: u32) -> Result<(f64, f64), PlacementError> {
    if x.is_finite() && y.is_finite() {
        Ok((x, y))
    } else {
        Err(PlacementError::TransformDegenerate { page })
    }
}
