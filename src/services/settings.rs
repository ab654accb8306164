//! Event settings service
//!
//! Loads and saves the single settings row and uploads hero images to the
//! asset bucket.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::gateway::DataGateway;
use crate::models::{EventSettings, SettingsUpdate};
use crate::utils::errors::{CheckinError, Result};
use crate::utils::helpers::random_upload_path;
use crate::utils::logging;

/// Folder inside the bucket that receives hero images
pub const HERO_FOLDER: &str = "hero";

pub struct SettingsService<G: ?Sized> {
    gateway: Arc<G>,
    settings_id: String,
}

impl<G: DataGateway + ?Sized> SettingsService<G> {
    pub fn new(gateway: Arc<G>, settings_id: impl Into<String>) -> Self {
        Self {
            gateway,
            settings_id: settings_id.into(),
        }
    }

    pub fn settings_id(&self) -> &str {
        &self.settings_id
    }

    /// Fetch the active settings row
    pub async fn load(&self) -> Result<EventSettings> {
        self.gateway.get_settings(&self.settings_id).await.map_err(|e| {
            let error = CheckinError::from(e);
            logging::log_gateway_error("select", "event_settings", &error);
            error
        })
    }

    /// Persist the edited settings, stamping the update time
    pub async fn save(&self, settings: &EventSettings) -> Result<()> {
        let update = SettingsUpdate {
            content: settings.content.clone(),
            updated_at: Utc::now(),
        };

        self.gateway
            .update_settings(&self.settings_id, &update)
            .await
            .map_err(|e| {
                let error = CheckinError::from(e);
                logging::log_gateway_error("update", "event_settings", &error);
                error
            })?;

        logging::log_admin_action("update_settings", Some(&self.settings_id), None);
        Ok(())
    }

    /// Upload a hero image and point the draft at its public URL.
    ///
    /// The draft is not saved; the caller persists it with [`Self::save`].
    pub async fn upload_hero_image(
        &self,
        draft: &mut EventSettings,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        if !content_type.starts_with("image/") {
            return Err(CheckinError::Validation(
                "Selecione um arquivo de imagem.".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(CheckinError::Validation("O arquivo está vazio.".to_string()));
        }

        let path = random_upload_path(HERO_FOLDER, file_name);
        debug!(path = %path, size = bytes.len(), "Uploading hero image");

        let url = self
            .gateway
            .upload_file(&path, bytes, content_type)
            .await
            .map_err(|e| {
                let error = CheckinError::from(e);
                logging::log_gateway_error("upload", "storage", &error);
                error
            })?;

        info!(path = %path, "Hero image uploaded");
        draft.content.hero_image_url = Some(url.clone());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::SettingsContent;
    use assert_matches::assert_matches;

    async fn seeded() -> Arc<MemoryGateway> {
        let gateway = Arc::new(MemoryGateway::new());
        gateway
            .seed_settings(EventSettings {
                id: "current_event".to_string(),
                content: SettingsContent {
                    edition: Some("Bloco dos Mauricinhos".to_string()),
                    ..Default::default()
                },
                updated_at: None,
            })
            .await;
        gateway
    }

    #[tokio::test]
    async fn test_save_stamps_updated_at() {
        let gateway = seeded().await;
        let service = SettingsService::new(gateway.clone(), "current_event");

        let mut settings = service.load().await.unwrap();
        assert!(settings.updated_at.is_none());
        settings.content.primary_color = Some("#111111".to_string());
        service.save(&settings).await.unwrap();

        let stored = service.load().await.unwrap();
        assert_eq!(stored.content.primary_color.as_deref(), Some("#111111"));
        assert_eq!(stored.content.edition.as_deref(), Some("Bloco dos Mauricinhos"));
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_hero_upload_sets_url_without_saving() {
        let gateway = seeded().await;
        let service = SettingsService::new(gateway.clone(), "current_event");

        let mut draft = service.load().await.unwrap();
        let url = service
            .upload_hero_image(&mut draft, "Capa.PNG", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert!(url.starts_with("memory://event-assets/hero/"));
        assert!(url.ends_with(".png"));
        assert_eq!(draft.content.hero_image_url.as_deref(), Some(url.as_str()));

        let stored = service.load().await.unwrap();
        assert!(stored.content.hero_image_url.is_none());
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let gateway = seeded().await;
        let service = SettingsService::new(gateway, "current_event");
        let mut draft = EventSettings::default();

        let result = service
            .upload_hero_image(&mut draft, "notes.txt", vec![1], "text/plain")
            .await;
        assert_matches!(result, Err(CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_row_reported() {
        let gateway = Arc::new(MemoryGateway::new());
        let service = SettingsService::new(gateway, "current_event");
        assert!(service.load().await.is_err());
    }
}
