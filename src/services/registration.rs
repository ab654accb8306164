//! Registration service implementation
//!
//! Validates and normalizes the public registration form and stores the new
//! participant. A CPF that is already registered is reported separately from
//! other failures.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::gateway::DataGateway;
use crate::models::NewParticipant;
use crate::utils::errors::{CheckinError, GatewayError, Result};
use crate::utils::helpers::{is_complete_cpf, is_valid_email, mask_cpf, mask_phone};
use crate::utils::logging;

/// Units offered by the registration form
pub const REGISTRATION_UNITS: [&str; 5] = ["Graças", "Boa Viagem", "Paulista", "Olinda", "Caxangá"];

/// Raw form input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub cpf: String,
    pub unit: String,
    pub user_type: Option<String>,
}

impl RegistrationForm {
    /// Check required fields and normalize masks
    pub fn validate(&self) -> Result<NewParticipant> {
        let name = self.name.trim();
        let email = self.email.trim();
        let unit = self.unit.trim();

        if name.is_empty()
            || email.is_empty()
            || unit.is_empty()
            || self.cpf.trim().is_empty()
            || self.phone.trim().is_empty()
        {
            return Err(CheckinError::Validation(
                "Preencha todos os campos obrigatórios.".to_string(),
            ));
        }

        if !REGISTRATION_UNITS.contains(&unit) {
            return Err(CheckinError::Validation("Selecione uma unidade válida.".to_string()));
        }

        if !is_complete_cpf(&self.cpf) {
            return Err(CheckinError::Validation("CPF inválido.".to_string()));
        }

        if !is_valid_email(email) {
            return Err(CheckinError::Validation("E-mail inválido.".to_string()));
        }

        Ok(NewParticipant {
            name: name.to_string(),
            phone: mask_phone(&self.phone),
            email: email.to_lowercase(),
            cpf: mask_cpf(&self.cpf),
            unit: unit.to_string(),
            user_type: self
                .user_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        })
    }
}

/// Registration service for the public form
pub struct RegistrationService<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: DataGateway + ?Sized> RegistrationService<G> {
    /// Create a new RegistrationService instance
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Register a new participant
    pub async fn register(&self, form: &RegistrationForm) -> Result<NewParticipant> {
        let participant = form.validate()?;
        debug!(unit = %participant.unit, "Submitting registration");

        match self.gateway.insert_participant(&participant).await {
            Ok(()) => {
                info!(unit = %participant.unit, "Participant registered");
                Ok(participant)
            }
            Err(GatewayError::UniqueViolation { constraint }) => {
                warn!(constraint = %constraint, "Registration rejected: CPF already registered");
                Err(CheckinError::DuplicateCpf {
                    cpf: participant.cpf,
                })
            }
            Err(e) => {
                let error = CheckinError::from(e);
                logging::log_gateway_error("insert", "participants", &error);
                Err(error)
            }
        }
    }
}
