//! Field placement, dragging and resizing with bounds enforcement
//!
//! Every operation takes the live viewport of the field's page and returns a
//! new [`Field`]. When the live viewport is a different render of the page
//! than the one the field was last measured in (the user zoomed), the field is
//! first projected into the live pixel space so the requested coordinates and
//! the stored ones agree.

use chrono::Local;
use tracing::debug;

use crate::error::PlacementError;
use crate::field::{normalize_content, Field, FieldBox, FieldId, FieldType, FontId};
use crate::viewport::PageViewport;

/// Gap kept between a newly placed field and the right/bottom page edge
pub const PLACE_PADDING: f64 = 10.0;

/// Gap kept between a dragged field and the right/bottom page edge
pub const MOVE_PADDING: f64 = 5.0;

/// Gap kept between a resized field and the right/bottom page edge
pub const RESIZE_PADDING: f64 = 10.0;

pub const MIN_FIELD_WIDTH: f64 = 60.0;
pub const MIN_FIELD_HEIGHT: f64 = 20.0;

/// Date format used for auto-filled date fields
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Clamp into `[min, max]`, letting `min` win when the range is empty
fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Shift a box back onto the page if it hangs past the right or bottom edge
fn contain(mut bounds: FieldBox, viewport: &PageViewport) -> FieldBox {
    bounds.x = clamp_range(bounds.x, 0.0, viewport.rendered_width - bounds.width);
    bounds.y = clamp_range(bounds.y, 0.0, viewport.rendered_height - bounds.height);
    bounds
}

/// Require a measured page that can hold a minimum-size field
///
/// A page drawn narrower than 60px or shorter than 20px is treated like an
/// unrendered one.
fn ensure_fits(viewport: &PageViewport) -> Result<(), PlacementError> {
    viewport.ensure_measured()?;
    if viewport.rendered_width < MIN_FIELD_WIDTH || viewport.rendered_height < MIN_FIELD_HEIGHT {
        return Err(PlacementError::NotReady {
            page: viewport.page_number,
        });
    }
    Ok(())
}

/// Today's date for auto-filled date fields
pub fn today(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// Place a new field with its top-left corner at the click point
pub fn place(
    field_type: FieldType,
    click_x: f64,
    click_y: f64,
    viewport: &PageViewport,
) -> Result<Field, PlacementError> {
    place_with_date(
        field_type,
        click_x,
        click_y,
        viewport,
        &today(DEFAULT_DATE_FORMAT),
    )
}

/// Place a new field, filling date fields with `date_text`
pub fn place_with_date(
    field_type: FieldType,
    click_x: f64,
    click_y: f64,
    viewport: &PageViewport,
    date_text: &str,
) -> Result<Field, PlacementError> {
    ensure_fits(viewport)?;
    if !viewport.contains(click_x, click_y) {
        return Err(PlacementError::OutOfBounds {
            page: viewport.page_number,
            x: click_x,
            y: click_y,
        });
    }

    let (default_width, default_height) = field_type.default_dimensions();
    // A page drawn smaller than the default box gets a box that fits it
    let width = default_width
        .min(viewport.rendered_width - PLACE_PADDING)
        .max(MIN_FIELD_WIDTH);
    let height = default_height
        .min(viewport.rendered_height - PLACE_PADDING)
        .max(MIN_FIELD_HEIGHT);

    let bounds = contain(
        FieldBox {
            x: clamp_range(
                click_x,
                0.0,
                viewport.rendered_width - width - PLACE_PADDING,
            ),
            y: clamp_range(
                click_y,
                0.0,
                viewport.rendered_height - height - PLACE_PADDING,
            ),
            width,
            height,
        },
        viewport,
    );

    let content = match field_type {
        FieldType::Date => normalize_content(date_text),
        _ => String::new(),
    };

    let field = Field::new(field_type, bounds, content, *viewport);
    debug!(
        "Placed {} field {} on page {} at ({:.1}, {:.1}) size {:.0}x{:.0}",
        field_type,
        field.id(),
        field.page(),
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height
    );
    Ok(field)
}

/// Express a field in the pixel space of `viewport`
///
/// Returns the field unchanged when it was last measured in the same render.
/// A box scaled down by zooming out is grown back to the minimum size.
pub fn project(field: &Field, viewport: &PageViewport) -> Result<Field, PlacementError> {
    ensure_fits(viewport)?;
    if field.page() != viewport.page_number {
        return Err(PlacementError::NotReady { page: field.page() });
    }
    if field.viewport_snapshot().same_render(viewport) {
        return Ok(field.clone());
    }
    let mut bounds = field.display_box(viewport);
    bounds.width = bounds.width.max(MIN_FIELD_WIDTH);
    bounds.height = bounds.height.max(MIN_FIELD_HEIGHT);
    Ok(field.with_bounds(contain(bounds, viewport), *viewport))
}

/// Move a field so its top-left corner sits at `(new_x, new_y)`
pub fn move_to(
    field: &Field,
    new_x: f64,
    new_y: f64,
    viewport: &PageViewport,
) -> Result<Field, PlacementError> {
    let current = project(field, viewport)?;
    let mut bounds = current.bounds();
    bounds.x = clamp_range(
        new_x,
        0.0,
        viewport.rendered_width - bounds.width - MOVE_PADDING,
    );
    bounds.y = clamp_range(
        new_y,
        0.0,
        viewport.rendered_height - bounds.height - MOVE_PADDING,
    );

    let moved = current.with_bounds(contain(bounds, viewport), *viewport);
    debug!(
        "Moved field {} to ({:.1}, {:.1})",
        moved.id(),
        moved.x(),
        moved.y()
    );
    Ok(moved)
}

/// Resize a field, keeping its top-left corner where it is
pub fn resize_to(
    field: &Field,
    new_width: f64,
    new_height: f64,
    viewport: &PageViewport,
) -> Result<Field, PlacementError> {
    let current = project(field, viewport)?;
    let mut bounds = current.bounds();
    bounds.width = clamp_range(
        new_width,
        MIN_FIELD_WIDTH,
        viewport.rendered_width - bounds.x - RESIZE_PADDING,
    );
    bounds.height = clamp_range(
        new_height,
        MIN_FIELD_HEIGHT,
        viewport.rendered_height - bounds.y - RESIZE_PADDING,
    );

    let resized = current.with_bounds(contain(bounds, viewport), *viewport);
    debug!(
        "Resized field {} to {:.0}x{:.0}, font size {}",
        resized.id(),
        resized.width(),
        resized.height(),
        resized.font_size()
    );
    Ok(resized)
}

/// Replace a field's text with the single-line form of `raw`
pub fn set_content(field: &Field, raw: &str) -> Field {
    field.with_content(normalize_content(raw))
}

pub fn set_font(field: &Field, font: FontId) -> Field {
    field.with_font(font)
}

/// Drop a field from a collection
///
/// Returns the remaining fields as a new collection along with the removed
/// field; `fields` is left as it was.
pub fn remove(fields: &[Field], id: FieldId) -> Result<(Vec<Field>, Field), PlacementError> {
    let removed = fields
        .iter()
        .find(|f| f.id() == id)
        .cloned()
        .ok_or(PlacementError::FieldNotFound(id))?;
    let remaining = fields.iter().filter(|f| f.id() != id).cloned().collect();
    Ok((remaining, removed))
}
