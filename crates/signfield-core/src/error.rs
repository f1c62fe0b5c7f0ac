use thiserror::Error;

use crate::backend::BackendError;
use crate::field::FieldId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Page {page} has not been measured yet")]
    NotReady { page: u32 },

    #[error("Page {page} has degenerate dimensions")]
    TransformDegenerate { page: u32 },

    #[error("Point ({x}, {y}) is outside page {page}")]
    OutOfBounds { page: u32, x: f64, y: f64 },

    #[error("{} field(s) still need content before finishing", field_ids.len())]
    IncompleteField { field_ids: Vec<FieldId> },

    #[error("Add at least one field before finishing")]
    EmptyFieldSet,

    #[error("Rendering failed: {0}")]
    BackendFailure(#[from] BackendError),

    #[error("Field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Unknown font: {0}")]
    UnknownFont(String),

    #[error("Document is finalized and can no longer be edited")]
    SessionLocked,

    #[error("Finalization is already in progress")]
    FinalizationInProgress,

    #[error("No drag or resize is in progress")]
    NoInteraction,

    #[error("Finalization has not been started")]
    NotFinalizing,
}

impl PlacementError {
    /// Errors the user cannot act on. Callers log these and carry on.
    pub fn is_suppressed(&self) -> bool {
        matches!(
            self,
            PlacementError::NotReady { .. }
                | PlacementError::TransformDegenerate { .. }
                | PlacementError::OutOfBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppressed_errors() {
        assert!(PlacementError::NotReady { page: 1 }.is_suppressed());
        assert!(PlacementError::TransformDegenerate { page: 1 }.is_suppressed());
        assert!(PlacementError::OutOfBounds {
            page: 1,
            x: -1.0,
            y: 0.0
        }
        .is_suppressed());
        assert!(!PlacementError::EmptyFieldSet.is_suppressed());
        assert!(!PlacementError::SessionLocked.is_suppressed());
    }

    #[test]
    fn test_incomplete_field_message_counts_fields() {
        let err = PlacementError::IncompleteField {
            field_ids: vec![uuid::Uuid::new_v4(), uuid::Uuid::new_v4()],
        };
        assert_eq!(
            err.to_string(),
            "2 field(s) still need content before finishing"
        );
    }
}
