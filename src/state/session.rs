//! Dashboard session
//!
//! [`DashboardSession`] is the single owner of the snapshot and the view
//! state. It runs the services against them, follows the backend's change
//! notifications and refetches whichever table changed. The latest
//! refetch always replaces what was there before.

use std::future::Future;
use std::sync::Arc;

use futures::future::select_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{DashboardConfig, Settings};
use crate::gateway::{Gateway, Session, Subscription, Table};
use crate::models::EventSettings;
use crate::services::{DeliveryReceipt, SaveOutcome, ServiceFactory};
use crate::state::dashboard::{Action, DashboardState, DeleteTarget, Notice};
use crate::state::snapshot::Snapshot;
use crate::stats::{filter_participants, search_page, DashboardStats, ParticipantPage};
use crate::utils::errors::{CheckinError, Result};
use crate::utils::helpers::total_pages;
use crate::utils::logging;

/// Tables followed while signed in
const WATCHED_TABLES: [Table; 2] = [Table::Participants, Table::Attractions];

/// What [`DashboardSession::process_next_change`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Refreshed(Table),
    RefreshFailed(Table),
    FeedClosed(Table),
    SignedIn,
    SignedOut,
}

enum Incoming {
    Table(usize, Option<Table>),
    Auth,
    AuthClosed,
}

pub struct DashboardSession<G: ?Sized> {
    gateway: Arc<G>,
    config: DashboardConfig,
    services: ServiceFactory<G>,
    snapshot: Snapshot,
    state: DashboardState,
    subscriptions: Vec<Subscription>,
    auth_changes: watch::Receiver<Option<Session>>,
}

impl<G: Gateway + ?Sized> DashboardSession<G> {
    pub fn new(gateway: Arc<G>, settings: &Settings) -> Self {
        let auth_changes = gateway.on_auth_state_change();
        Self {
            services: ServiceFactory::new(Arc::clone(&gateway), settings),
            gateway,
            config: settings.dashboard.clone(),
            snapshot: Snapshot::new(),
            state: DashboardState::new(),
            subscriptions: Vec::new(),
            auth_changes,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn services(&self) -> &ServiceFactory<G> {
        &self.services
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Probe for an existing session and load data when there is one
    pub async fn init(&mut self) -> Result<()> {
        match self.services.auth.current_session().await {
            Some(session) => self.enter(session).await,
            None => {
                self.dispatch(Action::SignedOut);
                Ok(())
            }
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        let session = self.services.auth.sign_in(email, password).await?;
        self.auth_changes.borrow_and_update();
        self.enter(session).await
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        self.services.auth.sign_out().await?;
        self.auth_changes.borrow_and_update();
        self.leave();
        Ok(())
    }

    async fn enter(&mut self, session: Session) -> Result<()> {
        self.dispatch(Action::SignedIn {
            email: session.email.clone(),
        });
        self.watch_changes();
        self.refresh_all().await
    }

    fn leave(&mut self) {
        self.shutdown();
        self.snapshot.clear();
        self.dispatch(Action::SignedOut);
    }

    /// Fetch all three collections concurrently.
    ///
    /// Only a participant failure is returned; the other two are logged
    /// and keep their previous contents.
    pub async fn refresh_all(&mut self) -> Result<()> {
        let gateway = self.gateway.as_ref();
        let settings_id = self.services.settings.settings_id().to_string();
        let (participants, attractions, settings) = futures::join!(
            gateway.list_participants(),
            gateway.list_attractions(),
            gateway.get_settings(&settings_id),
        );

        let _ = self.snapshot.apply_attractions(attractions);
        let _ = self.snapshot.apply_settings(settings, &settings_id);
        let result = self.snapshot.apply_participants(participants).map(|_| ());
        self.clamp_page();
        result
    }

    pub async fn refresh_participants(&mut self) -> Result<usize> {
        let result = self.snapshot.reload_participants(self.gateway.as_ref()).await;
        self.clamp_page();
        result
    }

    pub async fn refresh_attractions(&mut self) -> Result<usize> {
        self.snapshot.reload_attractions(self.gateway.as_ref()).await
    }

    pub async fn refresh_settings(&mut self) -> Result<()> {
        let settings_id = self.services.settings.settings_id().to_string();
        self.snapshot.reload_settings(self.gateway.as_ref(), &settings_id).await
    }

    fn clamp_page(&mut self) {
        let matches = filter_participants(&self.snapshot.participants, &self.state.filter.query).len();
        self.state.clamp_page(total_pages(matches, self.config.page_size));
    }

    /// Page of the collection table for the current query
    pub fn current_page(&self) -> ParticipantPage<'_> {
        search_page(
            &self.snapshot.participants,
            &self.state.filter.query,
            self.state.filter.page,
            self.config.page_size,
        )
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.snapshot.participants)
    }

    /// Confirm the delivery modal that is currently open
    pub async fn confirm_delivery(&mut self) -> Result<DeliveryReceipt> {
        let modal = self.state.delivery.clone().ok_or_else(|| {
            CheckinError::Validation("Nenhuma entrega em andamento.".to_string())
        })?;

        let outcome = match modal.form.resolve(&self.config.other_food_label) {
            Ok(request) => {
                self.services
                    .lifecycle
                    .confirm_delivery(&mut self.snapshot, &modal.participant_id, &request)
                    .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(receipt) => {
                self.dispatch(Action::DeliveryConfirmed(receipt.clone()));
                self.clamp_page();
                Ok(receipt)
            }
            Err(e) => {
                self.dispatch(Action::Notify(Notice::error(e.user_message())));
                Err(e)
            }
        }
    }

    /// Second step of a delete prompt
    pub async fn confirm_pending_delete(&mut self) -> Result<()> {
        let target = self.state.pending_delete.clone().ok_or_else(|| {
            CheckinError::Validation("Nenhuma exclusão pendente.".to_string())
        })?;

        let result = match &target {
            DeleteTarget::Participant { id, .. } => {
                self.services
                    .lifecycle
                    .delete_participant(&mut self.snapshot, id)
                    .await
            }
            DeleteTarget::Attraction { id, .. } => {
                self.services.attractions.delete(id, &mut self.snapshot).await
            }
        };

        self.dispatch(Action::DeleteCompleted);
        match result {
            Ok(()) => {
                if self.state.detail.as_deref() == Some(target.id()) {
                    self.dispatch(Action::CloseDetail);
                }
                self.dispatch(Action::Notify(Notice::success(format!("{} excluído.", target.name()))));
                self.clamp_page();
                Ok(())
            }
            Err(e) => {
                self.dispatch(Action::Notify(Notice::error(e.user_message())));
                Err(e)
            }
        }
    }

    pub async fn save_attraction(&mut self) -> Result<SaveOutcome> {
        let result = self
            .services
            .attractions
            .save(&mut self.state.attraction_form, &mut self.snapshot)
            .await;

        let notice = match &result {
            Ok(SaveOutcome::Created) => Notice::success("Atração adicionada!"),
            Ok(SaveOutcome::Updated) => Notice::success("Atração atualizada!"),
            Err(e) => Notice::error(e.user_message()),
        };
        self.dispatch(Action::Notify(notice));
        result
    }

    pub async fn save_settings(&mut self, settings: &EventSettings) -> Result<()> {
        match self.services.settings.save(settings).await {
            Ok(()) => {
                let _ = self.refresh_settings().await;
                self.dispatch(Action::Notify(Notice::success("Configurações salvas!")));
                Ok(())
            }
            Err(e) => {
                self.dispatch(Action::Notify(Notice::error(e.user_message())));
                Err(e)
            }
        }
    }

    /// Subscribe to the watched tables unless already subscribed
    pub fn watch_changes(&mut self) {
        if !self.subscriptions.is_empty() {
            return;
        }
        for table in WATCHED_TABLES {
            self.subscriptions.push(self.gateway.subscribe(table));
        }
        debug!(count = self.subscriptions.len(), "Watching table changes");
    }

    pub fn is_watching(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Wait for the next notification and act on it.
    ///
    /// Returns `None` once nothing is left to wait on.
    pub async fn process_next_change(&mut self) -> Option<SessionEvent> {
        let incoming = if self.subscriptions.is_empty() {
            match self.auth_changes.changed().await {
                Ok(()) => Incoming::Auth,
                Err(_) => Incoming::AuthClosed,
            }
        } else {
            let feeds = select_all(self.subscriptions.iter_mut().map(|s| Box::pin(s.next())));
            tokio::select! {
                (change, index, _) = feeds => Incoming::Table(index, change.map(|c| c.table)),
                changed = self.auth_changes.changed() => match changed {
                    Ok(()) => Incoming::Auth,
                    Err(_) => Incoming::AuthClosed,
                },
            }
        };

        match incoming {
            Incoming::Table(_, Some(table)) => Some(self.handle_table_change(table).await),
            Incoming::Table(index, None) => {
                let subscription = self.subscriptions.remove(index);
                warn!(table = %subscription.table(), "Change feed stopped");
                Some(SessionEvent::FeedClosed(subscription.table()))
            }
            Incoming::Auth => Some(self.handle_auth_change()),
            Incoming::AuthClosed => None,
        }
    }

    async fn handle_table_change(&mut self, table: Table) -> SessionEvent {
        logging::log_table_change(table.name());
        let result = match table {
            Table::Participants => self.refresh_participants().await.map(|_| ()),
            Table::Attractions => self.refresh_attractions().await.map(|_| ()),
            Table::EventSettings => self.refresh_settings().await,
        };
        match result {
            Ok(()) => SessionEvent::Refreshed(table),
            Err(_) => SessionEvent::RefreshFailed(table),
        }
    }

    fn handle_auth_change(&mut self) -> SessionEvent {
        let session = self.auth_changes.borrow_and_update().clone();
        match session {
            Some(session) => {
                self.dispatch(Action::SignedIn { email: session.email });
                SessionEvent::SignedIn
            }
            None => {
                info!("Session ended elsewhere; clearing dashboard");
                self.leave();
                SessionEvent::SignedOut
            }
        }
    }

    /// Follow notifications until `shutdown` resolves or nothing is left to follow
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = self.process_next_change() => match event {
                    Some(event) => debug!(event = ?event, "Session event"),
                    None => break,
                },
            }
        }
        self.shutdown();
    }

    /// Tear down every subscription
    pub fn shutdown(&mut self) {
        let count = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        if count > 0 {
            info!(count = count, "Change subscriptions closed");
        }
    }
}
