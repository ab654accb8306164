//! In-process gateway
//!
//! Keeps every table in memory behind async mutexes and broadcasts a change
//! notification after each write. It enforces the same rules the hosted
//! backend does (unique CPF, list ordering, single-row updates) so services
//! can be exercised without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tracing::debug;
use uuid::Uuid;

use super::{AuthGateway, ChangeFeed, DataGateway, Session, Subscription, Table, TableChange};
use crate::models::{
    Attraction, AttractionDraft, EventSettings, NewParticipant, Participant, ParticipantPatch,
    ParticipantRow, SettingsUpdate,
};
use crate::utils::errors::{GatewayError, GatewayResult};

/// Gateway that keeps all data in process
#[derive(Debug)]
pub struct MemoryGateway {
    participants: Mutex<Vec<ParticipantRow>>,
    attractions: Mutex<Vec<Attraction>>,
    settings: Mutex<HashMap<String, EventSettings>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    credentials: Mutex<HashMap<String, String>>,
    failure: Mutex<Option<GatewayError>>,
    changes: broadcast::Sender<TableChange>,
    auth_state: watch::Sender<Option<Session>>,
    participant_fetches: AtomicU64,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(64);
        let (auth_state, _) = watch::channel(None);
        Self {
            participants: Mutex::new(Vec::new()),
            attractions: Mutex::new(Vec::new()),
            settings: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            credentials: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            changes,
            auth_state,
            participant_fetches: AtomicU64::new(0),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a participant row as-is, assigning an id and creation time when missing
    pub async fn seed_participant(&self, mut row: ParticipantRow) -> String {
        let id = row.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        row.id = Some(id.clone());
        if row.created_at.is_none() {
            row.created_at = Some(Utc::now());
        }
        self.participants.lock().await.push(row);
        id
    }

    /// Store an attraction as-is, assigning an id when missing
    pub async fn seed_attraction(&self, mut attraction: Attraction) -> String {
        if attraction.id.is_empty() {
            attraction.id = Uuid::new_v4().to_string();
        }
        let id = attraction.id.clone();
        self.attractions.lock().await.push(attraction);
        id
    }

    pub async fn seed_settings(&self, settings: EventSettings) {
        self.settings.lock().await.insert(settings.id.clone(), settings);
    }

    /// Allow an administrator account to sign in
    pub async fn register_admin(&self, email: &str, password: &str) {
        self.credentials
            .lock()
            .await
            .insert(email.to_string(), password.to_string());
    }

    /// Make the next gateway call fail with `error`
    pub async fn fail_next(&self, error: GatewayError) {
        *self.failure.lock().await = Some(error);
    }

    /// Stored bytes of an uploaded file
    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    /// Raw stored row of a participant
    pub async fn participant_row(&self, id: &str) -> Option<ParticipantRow> {
        self.participants
            .lock()
            .await
            .iter()
            .find(|row| row.id.as_deref() == Some(id))
            .cloned()
    }

    /// How many times the participant list was fetched
    pub fn participant_fetches(&self) -> u64 {
        self.participant_fetches.load(Ordering::SeqCst)
    }

    async fn take_failure(&self) -> GatewayResult<()> {
        match self.failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn notify(&self, table: Table) {
        // No receivers is fine: nobody is watching yet.
        let _ = self.changes.send(TableChange { table });
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn list_participants(&self) -> GatewayResult<Vec<Participant>> {
        self.participant_fetches.fetch_add(1, Ordering::SeqCst);
        self.take_failure().await?;

        let rows = self.participants.lock().await;
        let mut newest_first: Vec<ParticipantRow> = rows.iter().rev().cloned().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(newest_first.into_iter().map(Participant::from).collect())
    }

    async fn insert_participant(&self, participant: &NewParticipant) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut rows = self.participants.lock().await;
        if rows.iter().any(|row| row.cpf == participant.cpf) {
            return Err(GatewayError::UniqueViolation {
                constraint: "participants_cpf_key".to_string(),
            });
        }

        let mut row = participant.clone().into_row();
        row.id = Some(Uuid::new_v4().to_string());
        row.created_at = Some(Utc::now());
        rows.push(row);
        drop(rows);

        self.notify(Table::Participants);
        Ok(())
    }

    async fn update_participant(&self, id: &str, patch: &ParticipantPatch) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut rows = self.participants.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id.as_deref() == Some(id))
            .ok_or(GatewayError::NotFound)?;
        patch.apply_to(row);
        drop(rows);

        self.notify(Table::Participants);
        Ok(())
    }

    async fn delete_participant(&self, id: &str) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut rows = self.participants.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id.as_deref() != Some(id));
        if rows.len() == before {
            return Err(GatewayError::NotFound);
        }
        drop(rows);

        self.notify(Table::Participants);
        Ok(())
    }

    async fn list_attractions(&self) -> GatewayResult<Vec<Attraction>> {
        self.take_failure().await?;

        let mut attractions = self.attractions.lock().await.clone();
        attractions.sort_by(|a, b| a.time.cmp(&b.time));
        Ok(attractions)
    }

    async fn insert_attraction(&self, draft: &AttractionDraft) -> GatewayResult<()> {
        self.take_failure().await?;

        self.attractions.lock().await.push(Attraction {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            time: draft.time.clone(),
            kind: draft.kind,
            is_featured: Some(draft.is_featured),
            order: None,
            created_at: Some(Utc::now()),
        });

        self.notify(Table::Attractions);
        Ok(())
    }

    async fn update_attraction(&self, id: &str, draft: &AttractionDraft) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut attractions = self.attractions.lock().await;
        let attraction = attractions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(GatewayError::NotFound)?;
        attraction.name = draft.name.clone();
        attraction.time = draft.time.clone();
        attraction.kind = draft.kind;
        attraction.is_featured = Some(draft.is_featured);
        drop(attractions);

        self.notify(Table::Attractions);
        Ok(())
    }

    async fn delete_attraction(&self, id: &str) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut attractions = self.attractions.lock().await;
        let before = attractions.len();
        attractions.retain(|a| a.id != id);
        if attractions.len() == before {
            return Err(GatewayError::NotFound);
        }
        drop(attractions);

        self.notify(Table::Attractions);
        Ok(())
    }

    async fn get_settings(&self, id: &str) -> GatewayResult<EventSettings> {
        self.take_failure().await?;

        self.settings
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn update_settings(&self, id: &str, update: &SettingsUpdate) -> GatewayResult<()> {
        self.take_failure().await?;

        let mut settings = self.settings.lock().await;
        let row = settings.get_mut(id).ok_or(GatewayError::NotFound)?;
        // Only fields present in the update overwrite the row.
        let mut merged = serde_json::to_value(&row.content)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let patch = serde_json::to_value(&update.content)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if let (Some(target), Some(source)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        row.content = serde_json::from_value(merged)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        row.updated_at = Some(update.updated_at);
        drop(settings);

        self.notify(Table::EventSettings);
        Ok(())
    }

    async fn upload_file(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<String> {
        self.take_failure().await?;

        let mut files = self.files.lock().await;
        if files.contains_key(path) {
            return Err(GatewayError::UniqueViolation {
                constraint: format!("object {} already exists", path),
            });
        }
        debug!(path = path, content_type = content_type, size = bytes.len(), "Stored file");
        files.insert(path.to_string(), bytes);
        Ok(format!("memory://event-assets/{}", path))
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn authenticate(&self, email: &str, password: &str) -> GatewayResult<Session> {
        self.take_failure().await?;

        let credentials = self.credentials.lock().await;
        match credentials.get(email) {
            Some(expected) if expected == password => {
                let session = Session {
                    access_token: Uuid::new_v4().to_string(),
                    refresh_token: None,
                    expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
                    user_id: Uuid::new_v4().to_string(),
                    email: Some(email.to_string()),
                };
                self.auth_state.send_replace(Some(session.clone()));
                Ok(session)
            }
            _ => Err(GatewayError::InvalidCredentials),
        }
    }

    async fn current_session(&self) -> Option<Session> {
        self.auth_state.borrow().clone().filter(|s| !s.is_expired())
    }

    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.auth_state.subscribe()
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.auth_state.send_replace(None);
        Ok(())
    }
}

impl ChangeFeed for MemoryGateway {
    fn subscribe(&self, table: Table) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let mut changes = self.changes.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.table == table => {
                        if tx.send(change).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    // Missed notifications collapse into one refetch.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        if tx.send(TableChange { table }).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription::new(table, rx, task)
    }
}
