//! Gateway module
//!
//! Everything persistent lives in the hosted backend. This module defines the
//! operations the dashboard consumes from it, split by concern into data,
//! authentication and change-notification traits, plus two implementations:
//! [`RestGateway`] talking to the backend's HTTP surface and
//! [`MemoryGateway`] holding everything in process.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::models::{
    Attraction, AttractionDraft, EventSettings, NewParticipant, Participant, ParticipantPatch,
    SettingsUpdate,
};
use crate::utils::errors::GatewayResult;

pub use memory::MemoryGateway;
pub use rest::RestGateway;

/// Tables the dashboard reads and watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Participants,
    Attractions,
    EventSettings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Participants => "participants",
            Table::Attractions => "attractions",
            Table::EventSettings => "event_settings",
        }
    }

    /// Ordering used whenever the whole table is listed
    pub fn default_order(&self) -> &'static str {
        match self {
            Table::Participants => "created_at.desc",
            Table::Attractions => "time.asc",
            Table::EventSettings => "id.asc",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Notification that something in a table changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
}

/// An authenticated administrator session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub email: Option<String>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

/// Live subscription to a table's change notifications.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) stops
/// the background task feeding it.
#[derive(Debug)]
pub struct Subscription {
    table: Table,
    receiver: mpsc::Receiver<TableChange>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(table: Table, receiver: mpsc::Receiver<TableChange>, task: JoinHandle<()>) -> Self {
        Self { table, receiver, task }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Wait for the next notification; `None` once the feed has stopped
    pub async fn next(&mut self) -> Option<TableChange> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Table CRUD and file storage
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// All participants, newest first
    async fn list_participants(&self) -> GatewayResult<Vec<Participant>>;

    /// Fails with `UniqueViolation` when the CPF is already stored
    async fn insert_participant(&self, participant: &NewParticipant) -> GatewayResult<()>;

    async fn update_participant(&self, id: &str, patch: &ParticipantPatch) -> GatewayResult<()>;

    async fn delete_participant(&self, id: &str) -> GatewayResult<()>;

    /// All attractions, earliest time first
    async fn list_attractions(&self) -> GatewayResult<Vec<Attraction>>;

    async fn insert_attraction(&self, draft: &AttractionDraft) -> GatewayResult<()>;

    async fn update_attraction(&self, id: &str, draft: &AttractionDraft) -> GatewayResult<()>;

    async fn delete_attraction(&self, id: &str) -> GatewayResult<()>;

    async fn get_settings(&self, id: &str) -> GatewayResult<EventSettings>;

    async fn update_settings(&self, id: &str, update: &SettingsUpdate) -> GatewayResult<()>;

    /// Store a file and return its public URL
    async fn upload_file(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<String>;
}

/// Administrator authentication
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Fails with `InvalidCredentials` on a wrong e-mail/password pair
    async fn authenticate(&self, email: &str, password: &str) -> GatewayResult<Session>;

    async fn current_session(&self) -> Option<Session>;

    /// Receiver that observes every sign-in and sign-out
    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_out(&self) -> GatewayResult<()>;
}

/// Table change notifications.
///
/// Implementations spawn onto the current Tokio runtime.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, table: Table) -> Subscription;
}

/// Everything the dashboard needs from the backend
pub trait Gateway: DataGateway + AuthGateway + ChangeFeed {}

impl<T: DataGateway + AuthGateway + ChangeFeed> Gateway for T {}
