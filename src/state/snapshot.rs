//! In-memory copies of the backend tables
//!
//! Each collection is replaced wholesale by a successful fetch and left
//! untouched by a failed one.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::gateway::DataGateway;
use crate::models::{Attraction, EventSettings, Participant};
use crate::utils::errors::{CheckinError, GatewayResult, Result};
use crate::utils::logging;

/// Load status of the participant collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    /// The last fetch failed; carries the user-facing message
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub attractions: Vec<Attraction>,
    pub settings: Option<EventSettings>,
    pub participants_state: LoadState,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn attraction(&self, id: &str) -> Option<&Attraction> {
        self.attractions.iter().find(|a| a.id == id)
    }

    /// A failed first load with nothing to show blocks the whole dashboard
    pub fn blocking_error(&self) -> Option<&str> {
        match &self.participants_state {
            LoadState::Failed(message) if self.participants.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Drop everything, used on sign-out
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub async fn reload_participants<G: DataGateway + ?Sized>(&mut self, gateway: &G) -> Result<usize> {
        let fetched = gateway.list_participants().await;
        self.apply_participants(fetched)
    }

    pub async fn reload_attractions<G: DataGateway + ?Sized>(&mut self, gateway: &G) -> Result<usize> {
        let fetched = gateway.list_attractions().await;
        self.apply_attractions(fetched)
    }

    pub async fn reload_settings<G: DataGateway + ?Sized>(&mut self, gateway: &G, settings_id: &str) -> Result<()> {
        let fetched = gateway.get_settings(settings_id).await;
        self.apply_settings(fetched, settings_id)
    }

    /// Store the outcome of a participant fetch
    pub fn apply_participants(&mut self, fetched: GatewayResult<Vec<Participant>>) -> Result<usize> {
        match fetched {
            Ok(participants) => {
                debug!(count = participants.len(), "Participants refreshed");
                self.participants = participants;
                self.participants_state = LoadState::Loaded;
                self.fetched_at = Some(Utc::now());
                Ok(self.participants.len())
            }
            Err(e) => {
                let error = CheckinError::from(e);
                logging::log_gateway_error("select", "participants", &error);
                self.participants_state = LoadState::Failed("Erro ao carregar dados dos participantes.".to_string());
                Err(error)
            }
        }
    }

    pub fn apply_attractions(&mut self, fetched: GatewayResult<Vec<Attraction>>) -> Result<usize> {
        let attractions = fetched.map_err(|e| {
            let error = CheckinError::from(e);
            logging::log_gateway_error("select", "attractions", &error);
            error
        })?;
        self.attractions = attractions;
        Ok(self.attractions.len())
    }

    pub fn apply_settings(&mut self, fetched: GatewayResult<EventSettings>, settings_id: &str) -> Result<()> {
        match fetched {
            Ok(settings) => {
                self.settings = Some(settings);
                Ok(())
            }
            Err(e) => {
                let error = CheckinError::from(e);
                warn!(settings_id = settings_id, error = %error, "Settings unavailable");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::NewParticipant;
    use crate::utils::errors::GatewayError;

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_rows() {
        let gateway = MemoryGateway::new();
        gateway
            .insert_participant(&NewParticipant {
                name: "Maria".to_string(),
                phone: String::new(),
                email: "maria@example.com".to_string(),
                cpf: "123.456.789-00".to_string(),
                unit: "Graças".to_string(),
                user_type: None,
            })
            .await
            .unwrap();

        let mut snapshot = Snapshot::new();
        assert_eq!(snapshot.participants_state, LoadState::NotLoaded);
        assert_eq!(snapshot.reload_participants(&gateway).await.unwrap(), 1);
        assert_eq!(snapshot.participants_state, LoadState::Loaded);

        gateway.fail_next(GatewayError::Timeout).await;
        assert!(snapshot.reload_participants(&gateway).await.is_err());
        assert_eq!(snapshot.participants.len(), 1);
        // Rows are still on screen, so the failure is not blocking.
        assert!(snapshot.blocking_error().is_none());
    }

    #[tokio::test]
    async fn test_first_load_failure_is_blocking() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(GatewayError::ServiceUnavailable).await;

        let mut snapshot = Snapshot::new();
        assert!(snapshot.reload_participants(&gateway).await.is_err());
        assert_eq!(
            snapshot.blocking_error(),
            Some("Erro ao carregar dados dos participantes.")
        );

        snapshot.clear();
        assert_eq!(snapshot.participants_state, LoadState::NotLoaded);
        assert!(snapshot.blocking_error().is_none());
    }
}
