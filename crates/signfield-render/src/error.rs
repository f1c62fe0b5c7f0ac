use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Page {0} does not exist in the document")]
    PageNotFound(u32),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    #[error("No fields to render")]
    NothingToRender,

    #[error("Failed to write signed document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for RenderError {
    fn from(e: lopdf::Error) -> Self {
        RenderError::OperationError(e.to_string())
    }
}
