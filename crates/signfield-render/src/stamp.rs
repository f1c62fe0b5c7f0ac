//! Burn placed annotations into PDF page content
//!
//! Each annotation becomes a single line of text drawn with a standard font.
//! The incoming coordinates are the field's top-left corner in PDF points; the
//! text is clamped into a safe margin and shifted left when it would run off
//! the right edge of the page.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use signfield_core::finalize::by_page;
use signfield_core::PlacedAnnotation;
use tracing::{debug, info};

use crate::error::RenderError;
use crate::fonts::{encode_win_ansi, resolve_font, standard_font, text_width, StandardFont};

/// Distance kept between drawn text and every page edge, in points
pub const SAFE_MARGIN: f64 = 10.0;

/// Page tree depth searched for inherited attributes
const MAX_TREE_DEPTH: usize = 32;

/// Where one annotation's text is drawn, relative to the page origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub x: f64,
    pub baseline: f64,
}

/// Clamp an annotation's text into the drawable area of a page
pub fn text_placement(
    annotation: &PlacedAnnotation,
    page_width: f64,
    page_height: f64,
) -> TextPlacement {
    let size = annotation.font_size;
    let right = page_width - SAFE_MARGIN;
    let width = text_width(&annotation.content, size);

    let mut x = annotation.x.min(right).max(SAFE_MARGIN);
    if x + width > right {
        x = (right - width).max(SAFE_MARGIN);
    }

    // Baseline one font size below the field's top edge
    let baseline = (annotation.y - size)
        .min(page_height - SAFE_MARGIN - size)
        .max(SAFE_MARGIN);

    TextPlacement { x, baseline }
}

/// Stamp every annotation onto its page and return the new document bytes
pub fn stamp_annotations(
    pdf_bytes: &[u8],
    annotations: &[PlacedAnnotation],
) -> Result<Vec<u8>, RenderError> {
    if annotations.is_empty() {
        return Err(RenderError::NothingToRender);
    }

    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| RenderError::ParseError(e.to_string()))?;
    let pages = doc.get_pages();

    for (page, group) in by_page(annotations) {
        let page_id = *pages.get(&page).ok_or(RenderError::PageNotFound(page))?;
        let [x0, y0, x1, y1] = media_box(&doc, page_id);

        let mut fonts = BTreeSet::new();
        let mut operations = vec![Operation::new("Q", vec![])];
        for annotation in group {
            let font = standard_font(resolve_font(annotation.font, annotation.field_type));
            fonts.insert(font);

            let placement = text_placement(annotation, x1 - x0, y1 - y0);
            debug!(
                "Page {}: {} '{}' at ({:.2}, {:.2}) in {} {}pt",
                page,
                annotation.field_type,
                annotation.content,
                placement.x,
                placement.baseline,
                font.base_font,
                annotation.font_size
            );
            operations.extend(text_operations(
                &annotation.content,
                font,
                annotation.font_size,
                x0 + placement.x,
                y0 + placement.baseline,
            ));
        }

        register_fonts(&mut doc, page_id, &fonts)?;
        let content = Content { operations }.encode()?;
        append_content(&mut doc, page_id, content)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| RenderError::OperationError(e.to_string()))?;

    info!(
        "Stamped {} annotation(s), output {} bytes",
        annotations.len(),
        output.len()
    );
    Ok(output)
}

fn text_operations(
    text: &str,
    font: StandardFont,
    font_size: f64,
    x: f64,
    y: f64,
) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font.resource_name.as_bytes().to_vec()),
                Object::Real(font_size as f32),
            ],
        ),
        Operation::new("Td", vec![Object::Real(x as f32), Object::Real(y as f32)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Follow one level of indirection
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up a page attribute, walking up the page tree when it is inherited
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page MediaBox as `[x0, y0, x1, y1]`, US Letter when absent or malformed
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

    let Some(Ok(array)) = inherited(doc, page_id, b"MediaBox").map(Object::as_array) else {
        return LETTER;
    };
    if array.len() != 4 {
        return LETTER;
    }

    let mut result = [0.0; 4];
    for (slot, obj) in result.iter_mut().zip(array) {
        *slot = match resolve(doc, obj) {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => return LETTER,
        };
    }
    result
}

/// Give the page its own Resources dictionary containing `fonts`
///
/// Inherited resources are copied onto the page so the original content
/// keeps resolving its own names.
fn register_fonts(
    doc: &mut Document,
    page_id: ObjectId,
    fonts: &BTreeSet<StandardFont>,
) -> Result<(), RenderError> {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default();
    let mut font_dict = resources
        .get(b"Font")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    for font in fonts {
        if font_dict.has(font.resource_name.as_bytes()) {
            continue;
        }
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(font.resource_name, Object::Reference(font_id));
    }
    resources.set("Font", Object::Dictionary(font_dict));

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Append a content stream, isolating the original content in `q`/`Q`
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
) -> Result<(), RenderError> {
    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));

    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, RenderError> {
    Ok(doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?)
}
