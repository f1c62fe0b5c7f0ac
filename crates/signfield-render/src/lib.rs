//! Local rendering backend for signfield
//!
//! Takes the annotation list produced at finalization and draws each field's
//! text directly into the page content of the original PDF using the
//! standard 14 fonts.

pub mod backend;
pub mod error;
pub mod fonts;
pub mod pages;
pub mod stamp;
pub mod store;

pub use backend::LocalRenderBackend;
pub use error::RenderError;
pub use pages::{page_sizes, PageSize};
pub use stamp::{stamp_annotations, text_placement, TextPlacement, SAFE_MARGIN};
pub use store::{DocumentStore, SignedDocument};
