//! Page viewport measurements
//!
//! A viewport pairs the size a page is currently drawn at (pixels) with the
//! page's own size (points). Both halves must come from the same render pass;
//! when the zoom changes the page surface reports a fresh viewport.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;

/// A4 page size in points
pub const A4: (f64, f64) = (595.0, 842.0);

/// US Letter page size in points
pub const LETTER: (f64, f64) = (612.0, 792.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewport {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Width of the rendered page in pixels at the current zoom
    pub rendered_width: f64,
    /// Height of the rendered page in pixels at the current zoom
    pub rendered_height: f64,
    /// Page width in points
    pub native_width: f64,
    /// Page height in points
    pub native_height: f64,
}

impl PageViewport {
    pub fn new(
        page_number: u32,
        rendered_width: f64,
        rendered_height: f64,
        native_width: f64,
        native_height: f64,
    ) -> Self {
        Self {
            page_number,
            rendered_width,
            rendered_height,
            native_width,
            native_height,
        }
    }

    /// Viewport for an A4 page drawn at the given pixel size
    pub fn a4(page_number: u32, rendered_width: f64, rendered_height: f64) -> Self {
        Self::new(page_number, rendered_width, rendered_height, A4.0, A4.1)
    }

    /// True when every dimension is finite and positive
    pub fn is_measured(&self) -> bool {
        [
            self.rendered_width,
            self.rendered_height,
            self.native_width,
            self.native_height,
        ]
        .iter()
        .all(|d| d.is_finite() && *d > 0.0)
    }

    /// Fail with `NotReady` unless the viewport can be used for geometry
    pub fn ensure_measured(&self) -> Result<(), PlacementError> {
        if self.is_measured() {
            Ok(())
        } else {
            Err(PlacementError::NotReady {
                page: self.page_number,
            })
        }
    }

    /// Points per rendered pixel along X
    pub fn scale_x(&self) -> f64 {
        self.native_width / self.rendered_width
    }

    /// Points per rendered pixel along Y
    pub fn scale_y(&self) -> f64 {
        self.native_height / self.rendered_height
    }

    /// Whether a rendered-pixel point lies on the rendered page (edges included)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.rendered_width).contains(&x) && (0.0..=self.rendered_height).contains(&y)
    }

    /// Same page drawn at the same size
    pub fn same_render(&self, other: &PageViewport) -> bool {
        self.page_number == other.page_number
            && self.rendered_width == other.rendered_width
            && self.rendered_height == other.rendered_height
            && self.native_width == other.native_width
            && self.native_height == other.native_height
    }
}

/// Source of live viewports for the pages of one document
///
/// The page rendering surface sits behind this trait so geometry can be
/// exercised without a real canvas.
pub trait ViewportProvider {
    fn viewport(&self, page: u32) -> Result<PageViewport, PlacementError>;
}

/// Latest measured viewport per page
#[derive(Debug, Clone, Default)]
pub struct PageViewports {
    pages: HashMap<u32, PageViewport>,
}

impl PageViewports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh measurement. An unmeasured viewport drops whatever was
    /// known for that page, so later lookups report `NotReady`.
    pub fn update(&mut self, viewport: PageViewport) -> Result<(), PlacementError> {
        if let Err(e) = viewport.ensure_measured() {
            self.pages.remove(&viewport.page_number);
            return Err(e);
        }
        self.pages.insert(viewport.page_number, viewport);
        Ok(())
    }

    /// Forget the measurement for a page (page unmounted or re-rendering)
    pub fn invalidate(&mut self, page: u32) {
        self.pages.remove(&page);
    }

    pub fn get(&self, page: u32) -> Option<&PageViewport> {
        self.pages.get(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl ViewportProvider for PageViewports {
    fn viewport(&self, page: u32) -> Result<PageViewport, PlacementError> {
        let viewport = self
            .pages
            .get(&page)
            .copied()
            .ok_or(PlacementError::NotReady { page })?;
        viewport.ensure_measured()?;
        Ok(viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_viewport() {
        let vp = PageViewport::a4(1, 600.0, 800.0);
        assert!(vp.is_measured());
        assert!(vp.ensure_measured().is_ok());
    }

    #[test]
    fn test_zero_rendered_size_is_not_ready() {
        let vp = PageViewport::a4(2, 0.0, 800.0);
        assert!(!vp.is_measured());
        assert_eq!(
            vp.ensure_measured(),
            Err(PlacementError::NotReady { page: 2 })
        );
    }

    #[test]
    fn test_nan_dimension_is_not_ready() {
        let vp = PageViewport::new(1, 600.0, f64::NAN, 595.0, 842.0);
        assert!(!vp.is_measured());
    }

    #[test]
    fn test_contains_includes_edges() {
        let vp = PageViewport::a4(1, 600.0, 800.0);
        assert!(vp.contains(0.0, 0.0));
        assert!(vp.contains(600.0, 800.0));
        assert!(!vp.contains(-0.1, 10.0));
        assert!(!vp.contains(10.0, 800.1));
    }

    #[test]
    fn test_registry_lookup() {
        let mut viewports = PageViewports::new();
        assert_eq!(
            viewports.viewport(1),
            Err(PlacementError::NotReady { page: 1 })
        );

        viewports.update(PageViewport::a4(1, 600.0, 800.0)).unwrap();
        assert_eq!(viewports.viewport(1).unwrap().rendered_width, 600.0);
        assert_eq!(viewports.len(), 1);
    }

    #[test]
    fn test_registry_drops_unmeasured_update() {
        let mut viewports = PageViewports::new();
        viewports.update(PageViewport::a4(1, 600.0, 800.0)).unwrap();

        let result = viewports.update(PageViewport::a4(1, 0.0, 0.0));
        assert!(result.is_err());
        assert!(viewports.viewport(1).is_err());
        assert!(viewports.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let mut viewports = PageViewports::new();
        viewports.update(PageViewport::a4(3, 600.0, 800.0)).unwrap();
        viewports.invalidate(3);
        assert!(viewports.get(3).is_none());
    }
}
