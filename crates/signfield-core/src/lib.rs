//! Field placement engine for document signing
//!
//! This crate converts between the on-screen rendered page (pixels, top-left
//! origin) and the PDF page (points, bottom-left origin), keeps placed fields
//! inside the rendered page while they are dragged and resized, sizes their
//! text to fit, and assembles the annotation list handed to a rendering
//! backend when the document is finalized.
//!
//! Editing always happens in rendered-pixel space. PDF point space is only
//! produced at finalization, from the viewport captured on each field.

pub mod backend;
pub mod coords;
pub mod error;
pub mod field;
pub mod finalize;
pub mod font_fit;
pub mod geometry;
pub mod session;
pub mod viewport;

pub use backend::{BackendError, RenderBackend, RenderRequest, RenderResponse};
pub use coords::{to_pdf_point, to_rendered_point};
pub use error::PlacementError;
pub use field::{Field, FieldBox, FieldId, FieldType, FontId};
pub use finalize::{assemble, PlacedAnnotation};
pub use font_fit::estimate_font_size;
pub use session::{EditSession, Interaction, SessionState};
pub use viewport::{PageViewport, PageViewports, ViewportProvider};
