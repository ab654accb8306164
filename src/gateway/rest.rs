//! REST gateway implementation
//!
//! Talks to the hosted backend over HTTP: the table API under `/rest/v1`,
//! password sign-in under `/auth/v1` and file storage under `/storage/v1`.
//! Change notifications are produced by polling each watched table and
//! comparing a fingerprint of its contents.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{AuthGateway, ChangeFeed, DataGateway, Session, Subscription, Table, TableChange};
use crate::config::GatewayConfig;
use crate::models::{
    Attraction, AttractionDraft, EventSettings, NewParticipant, Participant, ParticipantPatch,
    SettingsUpdate,
};
use crate::utils::errors::{CheckinError, GatewayError, GatewayResult, Result};
use crate::utils::logging;

/// Error body returned by the table API
#[derive(Debug, Clone, Deserialize)]
struct TableApiError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Error body returned by the auth API
#[derive(Debug, Clone, Deserialize)]
struct AuthApiError {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .or_else(|| self.expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user_id: self.user.id,
            email: self.user.email,
        }
    }
}

/// Gateway backed by the hosted backend's HTTP API
#[derive(Clone, Debug)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    poll_interval: Duration,
    auth_state: Arc<watch::Sender<Option<Session>>>,
}

impl RestGateway {
    /// Create a new RestGateway instance
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.url)?;
        if parsed.cannot_be_a_base() {
            return Err(CheckinError::Config(format!("Gateway URL is not a base URL: {}", config.url)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("BlocoCheckin/1.0")
            .build()
            .map_err(CheckinError::Http)?;

        let (auth_state, _) = watch::channel(None);

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            bucket: config.storage_bucket.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            auth_state: Arc::new(auth_state),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn object_path(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", urlencoding::encode(&self.bucket), encoded.join("/"))
    }

    /// Public URL of a stored object
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}", self.base_url, self.object_path(path))
    }

    fn bearer(&self) -> String {
        self.auth_state
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn send(&self, operation: &str, table: &str, request: RequestBuilder) -> GatewayResult<Response> {
        let started = Instant::now();
        let result = match request.send().await {
            Ok(response) => check_response(response).await,
            Err(e) => Err(map_send_error(e)),
        };
        logging::log_gateway_operation(
            operation,
            table,
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );
        result
    }

    async fn fetch_table<T: DeserializeOwned>(&self, table: Table) -> GatewayResult<Vec<T>> {
        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*"), ("order", table.default_order())]);
        let response = self.send("select", table.name(), request).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn insert_row<T: Serialize + Sync>(&self, table: Table, row: &T) -> GatewayResult<()> {
        let request = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send("insert", table.name(), request).await?;
        Ok(())
    }

    /// PATCH or DELETE one row by id, failing with `NotFound` when nothing matched
    async fn mutate_row<T: Serialize + Sync>(
        &self,
        table: Table,
        id: &str,
        body: Option<&T>,
    ) -> GatewayResult<()> {
        let url = self.table_url(table);
        let (operation, request) = match body {
            Some(body) => ("update", self.client.patch(url).json(body)),
            None => ("delete", self.client.delete(url)),
        };
        let request = self
            .authorized(request)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))]);

        let response = self.send(operation, table.name(), request).await?;
        let affected: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if affected.is_empty() {
            debug!(table = %table, id = id, "No row matched");
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn table_fingerprint(&self, table: Table) -> GatewayResult<u64> {
        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*"), ("order", table.default_order())]);
        let response = self.send("poll", table.name(), request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

/// Map a transport failure onto the gateway taxonomy
fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ServiceUnavailable
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Turn non-success HTTP responses into gateway errors
async fn check_response(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let api_error = serde_json::from_str::<TableApiError>(&body).ok();

    if status == StatusCode::CONFLICT
        || api_error.as_ref().and_then(|e| e.code.as_deref()) == Some("23505")
    {
        let constraint = api_error
            .and_then(|e| e.details.or(e.message))
            .unwrap_or_else(|| "unique".to_string());
        return Err(GatewayError::UniqueViolation { constraint });
    }

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized,
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::ServiceUnavailable
        }
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)),
    })
}

fn is_invalid_credentials(status: StatusCode, body: &str) -> bool {
    if status != StatusCode::BAD_REQUEST && status != StatusCode::UNAUTHORIZED {
        return false;
    }
    match serde_json::from_str::<AuthApiError>(body) {
        Ok(err) => {
            err.error.as_deref() == Some("invalid_grant")
                || err.error_code.as_deref() == Some("invalid_credentials")
                || err
                    .error_description
                    .or(err.msg)
                    .map(|m| m.contains("Invalid login credentials"))
                    .unwrap_or(false)
        }
        Err(_) => false,
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn list_participants(&self) -> GatewayResult<Vec<Participant>> {
        let participants: Vec<Participant> = self.fetch_table(Table::Participants).await?;
        debug!(count = participants.len(), "Fetched participants");
        Ok(participants)
    }

    async fn insert_participant(&self, participant: &NewParticipant) -> GatewayResult<()> {
        self.insert_row(Table::Participants, participant).await
    }

    async fn update_participant(&self, id: &str, patch: &ParticipantPatch) -> GatewayResult<()> {
        self.mutate_row(Table::Participants, id, Some(patch)).await
    }

    async fn delete_participant(&self, id: &str) -> GatewayResult<()> {
        self.mutate_row::<()>(Table::Participants, id, None).await
    }

    async fn list_attractions(&self) -> GatewayResult<Vec<Attraction>> {
        self.fetch_table(Table::Attractions).await
    }

    async fn insert_attraction(&self, draft: &AttractionDraft) -> GatewayResult<()> {
        self.insert_row(Table::Attractions, draft).await
    }

    async fn update_attraction(&self, id: &str, draft: &AttractionDraft) -> GatewayResult<()> {
        self.mutate_row(Table::Attractions, id, Some(draft)).await
    }

    async fn delete_attraction(&self, id: &str) -> GatewayResult<()> {
        self.mutate_row::<()>(Table::Attractions, id, None).await
    }

    async fn get_settings(&self, id: &str) -> GatewayResult<EventSettings> {
        let request = self
            .authorized(self.client.get(self.table_url(Table::EventSettings)))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let response = self.send("select", Table::EventSettings.name(), request).await?;
        let mut rows: Vec<EventSettings> = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if rows.is_empty() {
            return Err(GatewayError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }

    async fn update_settings(&self, id: &str, update: &SettingsUpdate) -> GatewayResult<()> {
        self.mutate_row(Table::EventSettings, id, Some(update)).await
    }

    async fn upload_file(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<String> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.object_path(path));
        let request = self
            .authorized(self.client.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes);
        self.send("upload", "storage", request).await?;

        let public_url = self.public_url(path);
        info!(path = path, url = %public_url, "File uploaded");
        Ok(public_url)
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn authenticate(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let request = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password });

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_invalid_credentials(status, &body) {
                warn!(email = email, "Sign-in rejected");
                return Err(GatewayError::InvalidCredentials);
            }
            return Err(GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let session = token.into_session();
        self.auth_state.send_replace(Some(session.clone()));
        info!(user_id = %session.user_id, "Administrator signed in");
        Ok(session)
    }

    async fn current_session(&self) -> Option<Session> {
        let session = self.auth_state.borrow().clone();
        match session {
            Some(session) if session.is_expired() => {
                info!(user_id = %session.user_id, "Session expired");
                self.auth_state.send_replace(None);
                None
            }
            other => other,
        }
    }

    fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.auth_state.subscribe()
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        let had_session = self.auth_state.borrow().is_some();
        if had_session {
            let request = self.authorized(self.client.post(format!("{}/auth/v1/logout", self.base_url)));
            // The local session is dropped even when the backend call fails.
            if let Err(e) = self.send("logout", "auth", request).await {
                warn!(error = %e, "Remote sign-out failed");
            }
        }
        self.auth_state.send_replace(None);
        info!("Administrator signed out");
        Ok(())
    }
}

impl ChangeFeed for RestGateway {
    fn subscribe(&self, table: Table) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let gateway = self.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(gateway.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last: Option<u64> = None;

            loop {
                interval.tick().await;
                match gateway.table_fingerprint(table).await {
                    Ok(fingerprint) => {
                        let changed = last.map(|prev| prev != fingerprint).unwrap_or(false);
                        last = Some(fingerprint);
                        if changed && tx.send(TableChange { table }).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(table = %table, error = %e, "Change poll failed");
                    }
                }
            }
            debug!(table = %table, "Change poll stopped");
        });

        Subscription::new(table, rx, task)
    }
}
