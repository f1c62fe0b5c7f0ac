//! Single-line font size estimation for field boxes
//!
//! Exact glyph metrics are not available while editing, so text width is
//! approximated as `characters * font_size * GLYPH_WIDTH_RATIO`. The rendering
//! backend uses the estimated size as-is.

use crate::field::FieldType;

/// Average glyph advance as a fraction of the font size
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Total horizontal padding inside a field box (both sides)
pub const HORIZONTAL_PADDING: f64 = 16.0;

/// Floor applied when shrinking text to fit the box width
pub const MIN_FONT_SIZE: f64 = 8.0;

/// Character count assumed for a field that has no content yet
pub const PLACEHOLDER_LENGTH: usize = 10;

/// Height-driven sizing rule for one field type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRule {
    pub fraction: f64,
    pub min: f64,
    pub max: f64,
}

pub fn height_rule(field_type: FieldType) -> HeightRule {
    match field_type {
        FieldType::Signature => HeightRule {
            fraction: 0.70,
            min: 12.0,
            max: 36.0,
        },
        FieldType::Initials => HeightRule {
            fraction: 0.65,
            min: 10.0,
            max: 28.0,
        },
        FieldType::Name => HeightRule {
            fraction: 0.60,
            min: 8.0,
            max: 24.0,
        },
        FieldType::Date | FieldType::Text | FieldType::Company => HeightRule {
            fraction: 0.55,
            min: 8.0,
            max: 20.0,
        },
    }
}

/// Font size derived from box height alone
pub fn base_font_size(field_type: FieldType, height: f64) -> f64 {
    let rule = height_rule(field_type);
    (height * rule.fraction).clamp(rule.min, rule.max)
}

/// Font size that fills the box height without overflowing its width
pub fn estimate_font_size(field_type: FieldType, width: f64, height: f64, content: &str) -> f64 {
    let length = match content.chars().count() {
        0 => PLACEHOLDER_LENGTH,
        n => n,
    } as f64;

    let mut size = base_font_size(field_type, height);

    let available = width - HORIZONTAL_PADDING;
    let estimated_width = length * size * GLYPH_WIDTH_RATIO;
    if estimated_width > available {
        size = (available / (length * GLYPH_WIDTH_RATIO)).max(MIN_FONT_SIZE);
    }

    size.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_capped_at_max() {
        // 60 * 0.7 = 42, capped at 36; 5 chars * 36 * 0.6 = 108 fits in 184
        assert_eq!(estimate_font_size(FieldType::Signature, 200.0, 60.0, "Alice"), 36.0);
    }

    #[test]
    fn test_small_signature_box() {
        // 20 * 0.7 = 14; 5 * 14 * 0.6 = 42 fits in 44
        let size = estimate_font_size(FieldType::Signature, 60.0, 20.0, "Alice");
        assert_eq!(size, 14.0);
        assert!(size <= 20.0);
    }

    #[test]
    fn test_width_correction_shrinks_long_text() {
        // base 30 * 0.6 = 18; 20 chars * 18 * 0.6 = 216 > 134
        // 134 / (20 * 0.6) = 11.17 -> 11
        let size = estimate_font_size(FieldType::Name, 150.0, 30.0, "Jonathan Q. Mcallist");
        assert_eq!(size, 11.0);
    }

    #[test]
    fn test_width_correction_floors_at_minimum() {
        let long = "x".repeat(200);
        assert_eq!(estimate_font_size(FieldType::Signature, 180.0, 50.0, &long), MIN_FONT_SIZE);
        // Box narrower than its padding
        assert_eq!(estimate_font_size(FieldType::Text, 10.0, 30.0, "a"), MIN_FONT_SIZE);
    }

    #[test]
    fn test_empty_content_uses_placeholder_length() {
        let empty = estimate_font_size(FieldType::Text, 120.0, 30.0, "");
        let ten = estimate_font_size(FieldType::Text, 120.0, 30.0, "0123456789");
        assert_eq!(empty, ten);
    }

    #[test]
    fn test_type_specific_minimums() {
        assert_eq!(base_font_size(FieldType::Signature, 1.0), 12.0);
        assert_eq!(base_font_size(FieldType::Initials, 1.0), 10.0);
        assert_eq!(base_font_size(FieldType::Name, 1.0), 8.0);
        assert_eq!(base_font_size(FieldType::Date, 1.0), 8.0);
    }

    #[test]
    fn test_type_specific_maximums() {
        assert_eq!(base_font_size(FieldType::Signature, 500.0), 36.0);
        assert_eq!(base_font_size(FieldType::Initials, 500.0), 28.0);
        assert_eq!(base_font_size(FieldType::Name, 500.0), 24.0);
        assert_eq!(base_font_size(FieldType::Company, 500.0), 20.0);
    }

    #[test]
    fn test_multibyte_content_counts_characters() {
        let ascii = estimate_font_size(FieldType::Name, 100.0, 30.0, "Zoe Muller");
        let accented = estimate_font_size(FieldType::Name, 100.0, 30.0, "Zoë Müller");
        assert_eq!(ascii, accented);
    }
}
