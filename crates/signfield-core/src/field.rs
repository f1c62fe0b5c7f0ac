use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PlacementError;
use crate::font_fit::estimate_font_size;
use crate::viewport::PageViewport;

pub type FieldId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Initials,
    Name,
    Date,
    Text,
    Company,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Signature,
        FieldType::Initials,
        FieldType::Name,
        FieldType::Date,
        FieldType::Text,
        FieldType::Company,
    ];

    /// Get default dimensions for a field type (width, height) in rendered pixels
    pub fn default_dimensions(&self) -> (f64, f64) {
        match self {
            FieldType::Signature => (180.0, 50.0),
            FieldType::Initials => (80.0, 35.0),
            FieldType::Name => (150.0, 30.0),
            FieldType::Date | FieldType::Text | FieldType::Company => (120.0, 30.0),
        }
    }

    /// Font assigned when the field is placed
    pub fn default_font(&self) -> FontId {
        match self {
            FieldType::Signature => FontId::DancingScript,
            FieldType::Initials => FontId::GreatVibes,
            FieldType::Name | FieldType::Date | FieldType::Text | FieldType::Company => {
                FontId::Helvetica
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Initials => "initials",
            FieldType::Name => "name",
            FieldType::Date => "date",
            FieldType::Text => "text",
            FieldType::Company => "company",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlacementError::UnknownFieldType(s.to_string()))
    }
}

/// Logical font identifiers understood by the rendering backend
///
/// These name a font choice, not a font file. The backend decides which glyph
/// source each one maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontId {
    DancingScript,
    GreatVibes,
    Pacifico,
    Allura,
    Helvetica,
    TimesRoman,
}

impl FontId {
    pub const ALL: [FontId; 6] = [
        FontId::DancingScript,
        FontId::GreatVibes,
        FontId::Pacifico,
        FontId::Allura,
        FontId::Helvetica,
        FontId::TimesRoman,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontId::DancingScript => "dancing-script",
            FontId::GreatVibes => "great-vibes",
            FontId::Pacifico => "pacifico",
            FontId::Allura => "allura",
            FontId::Helvetica => "helvetica",
            FontId::TimesRoman => "times-roman",
        }
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontId {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontId::ALL
            .into_iter()
            .find(|font| font.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlacementError::UnknownFont(s.to_string()))
    }
}

/// Axis-aligned box in rendered pixels, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FieldBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Rescale a box measured in `from` into the pixel space of `to`
    pub fn rescaled(&self, from: &PageViewport, to: &PageViewport) -> FieldBox {
        let fx = to.rendered_width / from.rendered_width;
        let fy = to.rendered_height / from.rendered_height;
        FieldBox {
            x: self.x * fx,
            y: self.y * fy,
            width: self.width * fx,
            height: self.height * fy,
        }
    }
}

/// A placed annotation field
///
/// Geometry is expressed in the rendered-pixel space of `viewport_snapshot`.
/// Fields are never edited in place: every operation in
/// [`geometry`](crate::geometry) returns a new value that replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    id: FieldId,
    #[serde(rename = "type")]
    field_type: FieldType,
    page: u32,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    content: String,
    font: Option<FontId>,
    font_size: f64,
    viewport_snapshot: PageViewport,
}

impl Field {
    pub(crate) fn new(
        field_type: FieldType,
        bounds: FieldBox,
        content: String,
        viewport: PageViewport,
    ) -> Self {
        let font_size =
            estimate_font_size(field_type, bounds.width, bounds.height, &content);
        Self {
            id: Uuid::new_v4(),
            field_type,
            page: viewport.page_number,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            content,
            font: Some(field_type.default_font()),
            font_size,
            viewport_snapshot: viewport,
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font(&self) -> Option<FontId> {
        self.font
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn viewport_snapshot(&self) -> &PageViewport {
        &self.viewport_snapshot
    }

    /// Eligible for finalization
    pub fn is_complete(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn bounds(&self) -> FieldBox {
        FieldBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Where the field should be drawn in another render of the same page
    pub fn display_box(&self, viewport: &PageViewport) -> FieldBox {
        if self.viewport_snapshot.same_render(viewport) {
            return self.bounds();
        }
        self.bounds().rescaled(&self.viewport_snapshot, viewport)
    }

    pub(crate) fn with_bounds(&self, bounds: FieldBox, viewport: PageViewport) -> Field {
        let mut next = self.clone();
        next.x = bounds.x;
        next.y = bounds.y;
        if next.width != bounds.width || next.height != bounds.height {
            next.width = bounds.width;
            next.height = bounds.height;
            next.refit();
        }
        next.viewport_snapshot = viewport;
        next
    }

    pub(crate) fn with_content(&self, content: String) -> Field {
        let mut next = self.clone();
        next.content = content;
        next.refit();
        next
    }

    pub(crate) fn with_font(&self, font: FontId) -> Field {
        let mut next = self.clone();
        next.font = Some(font);
        next
    }

    fn refit(&mut self) {
        self.font_size =
            estimate_font_size(self.field_type, self.width, self.height, &self.content);
    }
}

/// Collapse line breaks and whitespace runs to single spaces, then trim
pub fn normalize_content(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
