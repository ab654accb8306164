//! Administrator authentication
//!
//! Thin layer over the backend's password sign-in. Wrong credentials are
//! reported separately from connection failures.

use std::sync::Arc;
use tracing::{info, warn};

use crate::gateway::{AuthGateway, Session};
use crate::utils::errors::{CheckinError, GatewayError, Result};
use crate::utils::logging;

pub struct AuthService<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G: AuthGateway + ?Sized> AuthService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Sign in with e-mail and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CheckinError::Validation(
                "Informe e-mail e senha.".to_string(),
            ));
        }

        match self.gateway.authenticate(email, password).await {
            Ok(session) => {
                info!(email = email, "Administrator signed in");
                Ok(session)
            }
            Err(GatewayError::InvalidCredentials) => {
                warn!(email = email, "Sign-in rejected: invalid credentials");
                Err(CheckinError::Authentication(
                    "E-mail ou senha incorretos".to_string(),
                ))
            }
            Err(e) => {
                let error = CheckinError::from(e);
                logging::log_gateway_error("authenticate", "auth", &error);
                Err(error)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.gateway.sign_out().await?;
        info!("Administrator signed out");
        Ok(())
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.gateway.current_session().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_session().await.is_some()
    }
}
