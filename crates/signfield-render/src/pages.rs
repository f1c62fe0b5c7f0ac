//! Native page sizes of an uploaded document

use lopdf::Document;
use serde::Serialize;

use crate::error::RenderError;
use crate::stamp::media_box;

/// Size of one page in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub native_width: f64,
    pub native_height: f64,
}

pub fn page_sizes(pdf_bytes: &[u8]) -> Result<Vec<PageSize>, RenderError> {
    let doc =
        Document::load_mem(pdf_bytes).map_err(|e| RenderError::ParseError(e.to_string()))?;

    Ok(doc
        .get_pages()
        .into_iter()
        .map(|(page_number, page_id)| {
            let [x0, y0, x1, y1] = media_box(&doc, page_id);
            PageSize {
                page_number,
                native_width: x1 - x0,
                native_height: y1 - y0,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::test_pdf::create_test_pdf;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_sizes() {
        let sizes = page_sizes(&create_test_pdf(2, 595, 842)).unwrap();
        assert_eq!(
            sizes,
            vec![
                PageSize {
                    page_number: 1,
                    native_width: 595.0,
                    native_height: 842.0
                },
                PageSize {
                    page_number: 2,
                    native_width: 595.0,
                    native_height: 842.0
                },
            ]
        );
    }

    #[test]
    fn test_page_sizes_rejects_garbage() {
        assert!(matches!(
            page_sizes(b"%PDF-garbage"),
            Err(RenderError::ParseError(_))
        ));
    }
}
