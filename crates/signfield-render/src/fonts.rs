//! Logical font to PDF standard font mapping
//!
//! Only the standard 14 fonts are used so the output needs no embedded font
//! programs. Script fonts fall back to the closest italic face.

use signfield_core::font_fit::GLYPH_WIDTH_RATIO;
use signfield_core::{FieldType, FontId};

/// A standard Type1 font and the resource name it is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StandardFont {
    pub resource_name: &'static str,
    pub base_font: &'static str,
}

const HELVETICA: StandardFont = StandardFont {
    resource_name: "SFHelv",
    base_font: "Helvetica",
};
const HELVETICA_BOLD_OBLIQUE: StandardFont = StandardFont {
    resource_name: "SFHeBO",
    base_font: "Helvetica-BoldOblique",
};
const TIMES_ROMAN: StandardFont = StandardFont {
    resource_name: "SFTiRo",
    base_font: "Times-Roman",
};
const TIMES_ITALIC: StandardFont = StandardFont {
    resource_name: "SFTiIt",
    base_font: "Times-Italic",
};
const TIMES_BOLD_ITALIC: StandardFont = StandardFont {
    resource_name: "SFTiBI",
    base_font: "Times-BoldItalic",
};

pub fn standard_font(font: FontId) -> StandardFont {
    match font {
        FontId::Helvetica => HELVETICA,
        FontId::TimesRoman => TIMES_ROMAN,
        FontId::DancingScript | FontId::Allura => TIMES_ITALIC,
        FontId::GreatVibes => TIMES_BOLD_ITALIC,
        FontId::Pacifico => HELVETICA_BOLD_OBLIQUE,
    }
}

/// Font to draw with when an annotation carries none
pub fn resolve_font(font: Option<FontId>, field_type: FieldType) -> FontId {
    font.unwrap_or_else(|| field_type.default_font())
}

/// Estimated advance of `text` at `font_size`, same heuristic as editing
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO
}

/// Encode text for a WinAnsiEncoding simple font
///
/// Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
