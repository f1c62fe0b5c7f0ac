//! Edit session for placing fields on one document
//!
//! The session owns everything that changes while a user prepares a
//! document: the field collection, the selected field, the armed field type,
//! an in-flight drag or resize, and the finalization state.
//!
//! ## States
//! - `Editing`: fields may be placed, moved, resized, filled and removed
//! - `Finalizing`: the backend call is in flight; every mutation is rejected
//! - `Finalized`: terminal; fields are read-only
//!
//! A failed backend call returns the session to `Editing` with the fields
//! exactly as they were.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::backend::{BackendError, RenderBackend, RenderRequest, RenderResponse};
use crate::error::PlacementError;
use crate::field::{Field, FieldId, FieldType, FontId};
use crate::finalize::assemble;
use crate::geometry::{self, DEFAULT_DATE_FORMAT};
use crate::viewport::ViewportProvider;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Editing,
    Finalizing,
    Finalized {
        #[serde(rename = "signedFileUrl")]
        signed_file_url: String,
    },
}

/// A drag or resize between its start and end events
///
/// `preview` is what the user sees; it only replaces the stored field when
/// the interaction ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Drag { origin: Field, preview: Field },
    Resize { origin: Field, preview: Field },
}

impl Interaction {
    pub fn field_id(&self) -> FieldId {
        self.preview().id()
    }

    pub fn preview(&self) -> &Field {
        match self {
            Interaction::Drag { preview, .. } | Interaction::Resize { preview, .. } => preview,
        }
    }

    fn origin(&self) -> &Field {
        match self {
            Interaction::Drag { origin, .. } | Interaction::Resize { origin, .. } => origin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditSession {
    document_id: String,
    fields: Arc<Vec<Field>>,
    selected: Option<FieldId>,
    placement_mode: Option<FieldType>,
    interaction: Option<Interaction>,
    state: SessionState,
    date_format: String,
    last_error: Option<String>,
}

impl EditSession {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            fields: Arc::new(Vec::new()),
            selected: None,
            placement_mode: None,
            interaction: None,
            state: SessionState::Editing,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            last_error: None,
        }
    }

    /// Use a chrono format string for auto-filled date fields
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Cheap snapshot of the committed fields; later edits do not affect it
    pub fn snapshot(&self) -> Arc<Vec<Field>> {
        Arc::clone(&self.fields)
    }

    pub fn field(&self, id: FieldId) -> Result<&Field, PlacementError> {
        self.fields
            .iter()
            .find(|f| f.id() == id)
            .ok_or(PlacementError::FieldNotFound(id))
    }

    /// Fields on one page, with any in-flight preview in place of its field
    pub fn fields_on_page(&self, page: u32) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| f.page() == page)
            .map(|f| match &self.interaction {
                Some(i) if i.field_id() == f.id() => i.preview(),
                _ => f,
            })
            .collect()
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn placement_mode(&self) -> Option<FieldType> {
        self.placement_mode
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Message for the most recent user-facing failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(Field::is_complete)
    }

    fn ensure_editing(&self) -> Result<(), PlacementError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Finalizing => Err(PlacementError::FinalizationInProgress),
            SessionState::Finalized { .. } => Err(PlacementError::SessionLocked),
        }
    }

    fn replace(&mut self, field: Field) -> Result<&Field, PlacementError> {
        let id = field.id();
        let fields = Arc::make_mut(&mut self.fields);
        let slot = fields
            .iter_mut()
            .find(|f| f.id() == id)
            .ok_or(PlacementError::FieldNotFound(id))?;
        *slot = field;
        Ok(slot)
    }

    /// Drop an open drag or resize of `id`; a direct move or resize replaces it
    fn supersede_interaction(&mut self, id: FieldId) {
        if self.interaction.as_ref().map(Interaction::field_id) == Some(id) {
            debug!("Direct edit of field {} replaces its open interaction", id);
            self.interaction = None;
        }
    }

    /// Log suppressed errors so callers can drop them without losing them
    fn note<T>(&self, result: Result<T, PlacementError>) -> Result<T, PlacementError> {
        if let Err(e) = &result {
            if e.is_suppressed() {
                warn!("Ignoring interaction on {}: {}", self.document_id, e);
            }
        }
        result
    }

    /// Arm (or disarm) a field type for the next page click
    pub fn arm_placement(&mut self, field_type: Option<FieldType>) -> Result<(), PlacementError> {
        self.ensure_editing()?;
        self.placement_mode = field_type;
        Ok(())
    }

    pub fn select(&mut self, id: Option<FieldId>) -> Result<(), PlacementError> {
        if let Some(id) = id {
            self.field(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Place a field at a click on `page`
    pub fn place(
        &mut self,
        field_type: FieldType,
        page: u32,
        click_x: f64,
        click_y: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let placed = viewports.viewport(page).and_then(|viewport| {
            geometry::place_with_date(
                field_type,
                click_x,
                click_y,
                &viewport,
                &geometry::today(&self.date_format),
            )
        });
        let field = self.note(placed)?;

        let id = field.id();
        Arc::make_mut(&mut self.fields).push(field);
        self.selected = Some(id);
        self.field(id)
    }

    /// Place the armed field type at a click, disarming afterwards
    ///
    /// Returns `Ok(None)` when nothing is armed.
    pub fn click(
        &mut self,
        page: u32,
        click_x: f64,
        click_y: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<Option<&Field>, PlacementError> {
        let Some(field_type) = self.placement_mode else {
            return Ok(None);
        };
        let id = self.place(field_type, page, click_x, click_y, viewports)?.id();
        self.placement_mode = None;
        self.field(id).map(Some)
    }

    pub fn move_field(
        &mut self,
        id: FieldId,
        new_x: f64,
        new_y: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let field = self.field(id)?;
        let moved = viewports
            .viewport(field.page())
            .and_then(|vp| geometry::move_to(field, new_x, new_y, &vp));
        let moved = self.note(moved)?;
        self.supersede_interaction(id);
        self.replace(moved)
    }

    pub fn resize_field(
        &mut self,
        id: FieldId,
        new_width: f64,
        new_height: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let field = self.field(id)?;
        let resized = viewports
            .viewport(field.page())
            .and_then(|vp| geometry::resize_to(field, new_width, new_height, &vp));
        let resized = self.note(resized)?;
        self.supersede_interaction(id);
        self.replace(resized)
    }

    pub fn set_content(&mut self, id: FieldId, raw: &str) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let updated = geometry::set_content(self.field(id)?, raw);
        debug!(
            "Field {} content set ({} chars), font size {}",
            id,
            updated.content().chars().count(),
            updated.font_size()
        );
        self.replace(updated)
    }

    pub fn set_font(&mut self, id: FieldId, font: FontId) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let updated = geometry::set_font(self.field(id)?, font);
        self.replace(updated)
    }

    /// Delete a field, clearing selection and any interaction that used it
    pub fn remove(&mut self, id: FieldId) -> Result<Field, PlacementError> {
        self.ensure_editing()?;
        let (remaining, removed) = geometry::remove(&self.fields, id)?;
        self.fields = Arc::new(remaining);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.interaction.as_ref().map(Interaction::field_id) == Some(id) {
            self.interaction = None;
        }
        debug!("Removed field {} from {}", id, self.document_id);
        Ok(removed)
    }

    /// Start dragging a field. Any unfinished interaction is committed first.
    pub fn begin_drag(&mut self, id: FieldId) -> Result<(), PlacementError> {
        self.begin(id, |origin| Interaction::Drag {
            preview: origin.clone(),
            origin,
        })
    }

    /// Start resizing a field. Any unfinished interaction is committed first.
    pub fn begin_resize(&mut self, id: FieldId) -> Result<(), PlacementError> {
        self.begin(id, |origin| Interaction::Resize {
            preview: origin.clone(),
            origin,
        })
    }

    fn begin(
        &mut self,
        id: FieldId,
        start: impl FnOnce(Field) -> Interaction,
    ) -> Result<(), PlacementError> {
        self.ensure_editing()?;
        if self.interaction.is_some() {
            self.end_interaction()?;
        }
        let origin = self.field(id)?.clone();
        self.interaction = Some(start(origin));
        self.selected = Some(id);
        Ok(())
    }

    /// Update the drag preview. The stored field is not changed.
    pub fn update_drag(
        &mut self,
        new_x: f64,
        new_y: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let Some(Interaction::Drag { origin, .. }) = &self.interaction else {
            return Err(PlacementError::NoInteraction);
        };
        let preview = viewports
            .viewport(origin.page())
            .and_then(|vp| geometry::move_to(origin, new_x, new_y, &vp));
        let preview = self.note(preview)?;
        self.set_preview(preview)
    }

    /// Update the resize preview. The stored field is not changed.
    pub fn update_resize(
        &mut self,
        new_width: f64,
        new_height: f64,
        viewports: &dyn ViewportProvider,
    ) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let Some(Interaction::Resize { origin, .. }) = &self.interaction else {
            return Err(PlacementError::NoInteraction);
        };
        let preview = viewports
            .viewport(origin.page())
            .and_then(|vp| geometry::resize_to(origin, new_width, new_height, &vp));
        let preview = self.note(preview)?;
        self.set_preview(preview)
    }

    fn set_preview(&mut self, field: Field) -> Result<&Field, PlacementError> {
        match &mut self.interaction {
            Some(Interaction::Drag { preview, .. }) | Some(Interaction::Resize { preview, .. }) => {
                *preview = field;
                Ok(&*preview)
            }
            None => Err(PlacementError::NoInteraction),
        }
    }

    /// Finish the drag or resize, committing the last clamped preview
    ///
    /// Releasing outside the page still lands here: the preview was clamped
    /// on every update, so the committed field is always valid. The preview's
    /// bounds are applied to the stored field as it is now.
    pub fn end_interaction(&mut self) -> Result<&Field, PlacementError> {
        self.ensure_editing()?;
        let interaction = self
            .interaction
            .take()
            .ok_or(PlacementError::NoInteraction)?;
        // Only geometry comes from the preview; content and font edits made
        // since the interaction began are kept
        let preview = interaction.preview();
        let committed = self
            .field(preview.id())?
            .with_bounds(preview.bounds(), *preview.viewport_snapshot());
        debug!(
            "Committed {} of field {}",
            match interaction {
                Interaction::Drag { .. } => "drag",
                Interaction::Resize { .. } => "resize",
            },
            committed.id()
        );
        self.replace(committed)
    }

    /// Abandon the drag or resize, keeping the field where it started
    pub fn cancel_interaction(&mut self) -> Option<FieldId> {
        let interaction = self.interaction.take()?;
        Some(interaction.origin().id())
    }

    /// Move from `Editing` to `Finalizing` and build the backend request
    ///
    /// An unfinished drag or resize is committed first. Blocked while any
    /// field lacks content or when there are no fields.
    pub fn begin_finalize(&mut self) -> Result<RenderRequest, PlacementError> {
        self.ensure_editing()?;
        if self.interaction.is_some() {
            self.end_interaction()?;
        }

        match assemble(&self.document_id, &self.fields) {
            Ok(request) => {
                self.state = SessionState::Finalizing;
                self.selected = None;
                self.placement_mode = None;
                self.last_error = None;
                info!(
                    "Finalizing {} with {} field(s)",
                    self.document_id,
                    request.signatures.len()
                );
                Ok(request)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply the backend outcome to a `Finalizing` session
    ///
    /// Success is terminal. Any failure, including a response of the wrong
    /// shape, returns the session to `Editing` with fields untouched.
    pub fn complete_finalize(
        &mut self,
        outcome: Result<RenderResponse, BackendError>,
    ) -> Result<String, PlacementError> {
        if self.state != SessionState::Finalizing {
            return Err(match self.state {
                SessionState::Finalized { .. } => PlacementError::SessionLocked,
                _ => PlacementError::NotFinalizing,
            });
        }

        match outcome.and_then(RenderResponse::into_signed_file_url) {
            Ok(url) => {
                info!("Finalized {} -> {}", self.document_id, url);
                self.state = SessionState::Finalized {
                    signed_file_url: url.clone(),
                };
                Ok(url)
            }
            Err(e) => {
                error!("Finalization of {} failed: {}", self.document_id, e);
                self.state = SessionState::Editing;
                let e = PlacementError::BackendFailure(e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the full finalization against a backend
    pub async fn finalize(
        &mut self,
        backend: &dyn RenderBackend,
    ) -> Result<String, PlacementError> {
        let request = self.begin_finalize()?;
        let outcome = backend.render(&request).await;
        self.complete_finalize(outcome)
    }
}
