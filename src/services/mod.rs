//! Services module
//!
//! This module contains the business logic that sits between the view
//! state and the gateway.

pub mod attractions;
pub mod auth;
pub mod lifecycle;
pub mod registration;
pub mod settings;

// Re-export commonly used services
pub use attractions::{AttractionForm, AttractionManager, SaveOutcome};
pub use auth::AuthService;
pub use lifecycle::{DeliveryForm, DeliveryReceipt, DeliveryRequest, LifecycleController};
pub use registration::{RegistrationForm, RegistrationService, REGISTRATION_UNITS};
pub use settings::{SettingsService, HERO_FOLDER};

use std::sync::Arc;

use crate::config::Settings;
use crate::gateway::Gateway;

/// Service factory for creating all services over one gateway
pub struct ServiceFactory<G: ?Sized> {
    pub registration: RegistrationService<G>,
    pub lifecycle: LifecycleController<G>,
    pub attractions: AttractionManager<G>,
    pub settings: SettingsService<G>,
    pub auth: AuthService<G>,
}

impl<G: Gateway + ?Sized> ServiceFactory<G> {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(gateway: Arc<G>, settings: &Settings) -> Self {
        Self {
            registration: RegistrationService::new(Arc::clone(&gateway)),
            lifecycle: LifecycleController::new(Arc::clone(&gateway)),
            attractions: AttractionManager::new(Arc::clone(&gateway)),
            settings: SettingsService::new(Arc::clone(&gateway), settings.gateway.settings_id.clone()),
            auth: AuthService::new(gateway),
        }
    }
}
