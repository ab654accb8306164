//! Attendee lifecycle controller
//!
//! Moves a participant from registered to delivered against a food
//! donation, cancels registrations and deletes records. Every write is
//! validated before the network is touched, and the participant
//! collection is refetched after each successful write.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::gateway::DataGateway;
use crate::models::{Delivery, Lifecycle, ParticipantPatch, ParticipantStatus};
use crate::state::Snapshot;
use crate::utils::errors::{CheckinError, Result};
use crate::utils::logging;

/// Validated delivery input
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRequest {
    food_kg: f64,
    food_type: String,
}

impl DeliveryRequest {
    /// Weight must be a positive number and the food label non-empty
    pub fn new(food_kg: f64, food_type: &str) -> Result<Self> {
        if !food_kg.is_finite() || food_kg <= 0.0 {
            return Err(CheckinError::Validation(
                "Informe um peso maior que zero.".to_string(),
            ));
        }
        let food_type = food_type.trim();
        if food_type.is_empty() {
            return Err(CheckinError::Validation(
                "Informe o tipo de alimento.".to_string(),
            ));
        }
        Ok(Self {
            food_kg,
            food_type: food_type.to_string(),
        })
    }

    pub fn food_kg(&self) -> f64 {
        self.food_kg
    }

    pub fn food_type(&self) -> &str {
        &self.food_type
    }
}

/// Inputs of the delivery modal
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryForm {
    pub selected_food: String,
    pub custom_food: String,
    pub weight_kg: f64,
}

impl Default for DeliveryForm {
    fn default() -> Self {
        Self {
            selected_food: String::new(),
            custom_food: String::new(),
            weight_kg: 1.0,
        }
    }
}

impl DeliveryForm {
    /// Resolve the selected category, substituting the custom label for the catch-all one
    pub fn resolve(&self, other_label: &str) -> Result<DeliveryRequest> {
        if self.selected_food.trim().is_empty() {
            return Err(CheckinError::Validation(
                "Selecione o alimento doado.".to_string(),
            ));
        }

        let label = if self.selected_food == other_label {
            if self.custom_food.trim().is_empty() {
                return Err(CheckinError::Validation(
                    "Descreva o alimento doado.".to_string(),
                ));
            }
            self.custom_food.as_str()
        } else {
            self.selected_food.as_str()
        };

        DeliveryRequest::new(self.weight_kg, label)
    }

    /// Whether the confirm button is enabled
    pub fn is_submittable(&self, other_label: &str) -> bool {
        self.resolve(other_label).is_ok()
    }
}

/// Outcome of a confirmed delivery
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub participant_id: String,
    pub participant_name: String,
    pub delivery: Delivery,
    /// False when the write succeeded but the follow-up refetch did not
    pub refreshed: bool,
}

/// Check-in state machine over the backend
pub struct LifecycleController<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: ?Sized> Clone for LifecycleController<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: DataGateway + ?Sized> LifecycleController<G> {
    /// Create a new LifecycleController instance
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Hand over a bracelet.
    ///
    /// Rejects records that are already delivered or cancelled. On failure
    /// the snapshot is left as it was.
    pub async fn confirm_delivery(
        &self,
        snapshot: &mut Snapshot,
        participant_id: &str,
        request: &DeliveryRequest,
    ) -> Result<DeliveryReceipt> {
        let participant = snapshot
            .participant(participant_id)
            .ok_or_else(|| CheckinError::ParticipantNotFound {
                id: participant_id.to_string(),
            })?;

        match participant.lifecycle {
            Lifecycle::Registered | Lifecycle::Awaiting => {}
            ref other => {
                warn!(participant_id = participant_id, status = %other.status(), "Delivery rejected");
                return Err(CheckinError::InvalidStateTransition {
                    from: other.status().to_string(),
                    to: ParticipantStatus::Delivered.to_string(),
                });
            }
        }

        let delivery = Delivery {
            at: Utc::now(),
            food_kg: request.food_kg(),
            food_type: request.food_type().to_string(),
        };
        let notes = match participant.notes.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, delivery.note()),
            _ => delivery.note(),
        };
        let participant_name = participant.name.clone();

        let patch = ParticipantPatch::delivery(&delivery, notes);
        if let Err(e) = self.gateway.update_participant(participant_id, &patch).await {
            let error = CheckinError::from(e);
            logging::log_gateway_error("update", "participants", &error);
            return Err(error);
        }
        logging::log_delivery(participant_id, &delivery.food_type, delivery.food_kg);

        let refreshed = self.refresh(snapshot).await;
        Ok(DeliveryReceipt {
            participant_id: participant_id.to_string(),
            participant_name,
            delivery,
            refreshed,
        })
    }

    /// Cancel a registration that has not been delivered
    pub async fn cancel_participant(&self, snapshot: &mut Snapshot, participant_id: &str) -> Result<()> {
        let participant = snapshot
            .participant(participant_id)
            .ok_or_else(|| CheckinError::ParticipantNotFound {
                id: participant_id.to_string(),
            })?;

        match participant.lifecycle {
            Lifecycle::Registered | Lifecycle::Awaiting => {}
            ref other => {
                return Err(CheckinError::InvalidStateTransition {
                    from: other.status().to_string(),
                    to: ParticipantStatus::Cancelled.to_string(),
                });
            }
        }

        self.gateway
            .update_participant(participant_id, &ParticipantPatch::cancellation())
            .await
            .map_err(|e| {
                let error = CheckinError::from(e);
                logging::log_gateway_error("update", "participants", &error);
                error
            })?;
        logging::log_admin_action("cancel_participant", Some(participant_id), None);

        self.refresh(snapshot).await;
        Ok(())
    }

    /// Permanently remove a participant; the caller has already asked for confirmation
    pub async fn delete_participant(&self, snapshot: &mut Snapshot, participant_id: &str) -> Result<()> {
        self.gateway
            .delete_participant(participant_id)
            .await
            .map_err(|e| {
                let error = CheckinError::from(e);
                logging::log_gateway_error("delete", "participants", &error);
                error
            })?;
        logging::log_admin_action("delete_participant", Some(participant_id), None);

        self.refresh(snapshot).await;
        Ok(())
    }

    async fn refresh(&self, snapshot: &mut Snapshot) -> bool {
        match snapshot.reload_participants(self.gateway.as_ref()).await {
            Ok(count) => {
                debug!(count = count, "Collection refreshed after write");
                true
            }
            Err(e) => {
                info!(error = %e, "Refresh after write failed; waiting for the next change notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_weight_must_be_positive() {
        assert_matches!(DeliveryRequest::new(0.0, "Arroz"), Err(CheckinError::Validation(_)));
        assert_matches!(DeliveryRequest::new(-1.0, "Arroz"), Err(CheckinError::Validation(_)));
        assert_matches!(DeliveryRequest::new(f64::NAN, "Arroz"), Err(CheckinError::Validation(_)));
        assert!(DeliveryRequest::new(0.5, "Arroz").is_ok());
    }

    #[test]
    fn test_catch_all_requires_custom_label() {
        let form = DeliveryForm {
            selected_food: "Outros".to_string(),
            custom_food: "  ".to_string(),
            weight_kg: 2.0,
        };
        assert_matches!(form.resolve("Outros"), Err(CheckinError::Validation(_)));
        assert!(!form.is_submittable("Outros"));

        let form = DeliveryForm {
            custom_food: "Biscoito".to_string(),
            ..form
        };
        let request = form.resolve("Outros").unwrap();
        assert_eq!(request.food_type(), "Biscoito");
    }

    #[test]
    fn test_listed_category_used_as_is() {
        let form = DeliveryForm {
            selected_food: "Feijão".to_string(),
            custom_food: "ignored".to_string(),
            weight_kg: 1.0,
        };
        assert_eq!(form.resolve("Outros").unwrap().food_type(), "Feijão");
    }

    #[test]
    fn test_no_selection_rejected() {
        assert_matches!(DeliveryForm::default().resolve("Outros"), Err(CheckinError::Validation(_)));
    }
}
