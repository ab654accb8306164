//! Attraction schedule management

use std::sync::Arc;
use tracing::info;

use crate::gateway::DataGateway;
use crate::models::{Attraction, AttractionDraft};
use crate::state::Snapshot;
use crate::utils::errors::{CheckinError, GatewayError, Result};
use crate::utils::logging;

/// Attraction form: a draft plus the id being edited, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttractionForm {
    pub draft: AttractionDraft,
    pub editing_id: Option<String>,
}

impl AttractionForm {
    /// Load an existing attraction into the form
    pub fn begin_edit(&mut self, attraction: &Attraction) {
        self.draft = AttractionDraft::from(attraction);
        self.editing_id = Some(attraction.id.clone()).filter(|id| !id.is_empty());
    }

    /// Leave edit mode and clear the draft
    pub fn cancel_edit(&mut self) {
        self.reset();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Create, update and delete schedule entries
pub struct AttractionManager<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: DataGateway + ?Sized> AttractionManager<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Insert or update depending on whether the form is editing.
    ///
    /// The form is reset only after the write succeeds.
    pub async fn save(&self, form: &mut AttractionForm, snapshot: &mut Snapshot) -> Result<SaveOutcome> {
        if !form.draft.is_complete() {
            return Err(CheckinError::Validation(
                "Por favor, preencha o nome e o horário da atração!".to_string(),
            ));
        }

        let outcome = match form.editing_id.as_deref() {
            Some(id) => {
                self.gateway
                    .update_attraction(id, &form.draft)
                    .await
                    .map_err(|e| map_attraction_error(e, id, "update"))?;
                SaveOutcome::Updated
            }
            None => {
                self.gateway
                    .insert_attraction(&form.draft)
                    .await
                    .map_err(|e| map_attraction_error(e, "", "insert"))?;
                SaveOutcome::Created
            }
        };

        info!(name = %form.draft.name, time = %form.draft.time, outcome = ?outcome, "Attraction saved");
        form.reset();
        // A failed refetch is picked up by the next change notification.
        let _ = snapshot.reload_attractions(self.gateway.as_ref()).await;
        Ok(outcome)
    }

    /// Delete an attraction; the caller has already asked for confirmation
    pub async fn delete(&self, id: &str, snapshot: &mut Snapshot) -> Result<()> {
        self.gateway
            .delete_attraction(id)
            .await
            .map_err(|e| map_attraction_error(e, id, "delete"))?;
        logging::log_admin_action("delete_attraction", Some(id), None);

        let _ = snapshot.reload_attractions(self.gateway.as_ref()).await;
        Ok(())
    }
}

fn map_attraction_error(error: GatewayError, id: &str, operation: &str) -> CheckinError {
    let error = match error {
        GatewayError::NotFound => CheckinError::AttractionNotFound { id: id.to_string() },
        other => CheckinError::from(other),
    };
    logging::log_gateway_error(operation, "attractions", &error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::AttractionKind;
    use assert_matches::assert_matches;

    fn draft(name: &str, time: &str) -> AttractionDraft {
        AttractionDraft {
            name: name.to_string(),
            time: time.to_string(),
            kind: AttractionKind::Banda,
            is_featured: false,
        }
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let gateway = Arc::new(MemoryGateway::new());
        let manager = AttractionManager::new(gateway.clone());
        let mut snapshot = Snapshot::new();
        let mut form = AttractionForm {
            draft: draft("Banda Eva", "20:00"),
            editing_id: None,
        };

        assert_eq!(manager.save(&mut form, &mut snapshot).await.unwrap(), SaveOutcome::Created);
        assert_eq!(form, AttractionForm::default());
        assert_eq!(snapshot.attractions.len(), 1);

        let existing = snapshot.attractions[0].clone();
        form.begin_edit(&existing);
        form.draft.is_featured = true;
        assert_eq!(manager.save(&mut form, &mut snapshot).await.unwrap(), SaveOutcome::Updated);

        assert_eq!(snapshot.attractions.len(), 1);
        assert!(snapshot.attractions[0].featured());
    }

    #[tokio::test]
    async fn test_incomplete_draft_blocked() {
        let gateway = Arc::new(MemoryGateway::new());
        let manager = AttractionManager::new(gateway.clone());
        let mut snapshot = Snapshot::new();
        let mut form = AttractionForm {
            draft: draft("Banda", ""),
            editing_id: None,
        };

        assert_matches!(manager.save(&mut form, &mut snapshot).await, Err(CheckinError::Validation(_)));
        assert!(gateway.list_attractions().await.unwrap().is_empty());
        assert_eq!(form.draft.name, "Banda");
    }

    #[tokio::test]
    async fn test_same_time_allowed() {
        let gateway = Arc::new(MemoryGateway::new());
        let manager = AttractionManager::new(gateway.clone());
        let mut snapshot = Snapshot::new();

        for name in ["Palco A", "Palco B"] {
            let mut form = AttractionForm {
                draft: draft(name, "21:00"),
                editing_id: None,
            };
            manager.save(&mut form, &mut snapshot).await.unwrap();
        }
        assert_eq!(snapshot.attractions.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_attraction() {
        let gateway = Arc::new(MemoryGateway::new());
        let manager = AttractionManager::new(gateway);
        let mut snapshot = Snapshot::new();

        let result = manager.delete("missing", &mut snapshot).await;
        assert_matches!(result, Err(CheckinError::AttractionNotFound { .. }));
    }
}
