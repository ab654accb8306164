//! Error handling for BlocoCheckin
//!
//! This module defines the main error types used throughout the crate
//! and maps them onto the categories the dashboard reports to its users.

use thiserror::Error;

/// Main error type for BlocoCheckin
#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("CPF already registered: {cpf}")]
    DuplicateCpf { cpf: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Participant not found: {id}")]
    ParticipantNotFound { id: String },

    #[error("Attraction not found: {id}")]
    AttractionNotFound { id: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Errors reported by the hosted backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    #[error("Gateway timeout")]
    Timeout,

    #[error("Gateway unavailable")]
    ServiceUnavailable,

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Record not found")]
    NotFound,

    #[error("Not authorized")]
    Unauthorized,
}

/// Result type alias for BlocoCheckin operations
pub type Result<T> = std::result::Result<T, CheckinError>;

/// Result type alias for raw gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// How a failure is presented to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input caught before any network call
    Validation,
    /// The backend refused the write because of existing data
    Conflict,
    /// Any other backend or connection failure
    Transient,
    /// Invalid credentials or missing session
    Authentication,
    /// Programming or configuration problems
    Internal,
}

impl CheckinError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckinError::Validation(_) => ErrorKind::Validation,
            CheckinError::InvalidStateTransition { .. } => ErrorKind::Validation,
            CheckinError::DuplicateCpf { .. } => ErrorKind::Conflict,
            CheckinError::Gateway(GatewayError::UniqueViolation { .. }) => ErrorKind::Conflict,
            CheckinError::Authentication(_) => ErrorKind::Authentication,
            CheckinError::Gateway(GatewayError::InvalidCredentials) => ErrorKind::Authentication,
            CheckinError::Gateway(GatewayError::Unauthorized) => ErrorKind::Authentication,
            CheckinError::Gateway(_) => ErrorKind::Transient,
            CheckinError::ParticipantNotFound { .. } => ErrorKind::Transient,
            CheckinError::AttractionNotFound { .. } => ErrorKind::Transient,
            CheckinError::Http(_) => ErrorKind::Transient,
            CheckinError::Io(_) => ErrorKind::Transient,
            CheckinError::Config(_) => ErrorKind::Internal,
            CheckinError::Serialization(_) => ErrorKind::Internal,
            CheckinError::UrlParse(_) => ErrorKind::Internal,
        }
    }

    /// Check if retrying the same action by hand can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::Validation => ErrorSeverity::Info,
            ErrorKind::Conflict => ErrorSeverity::Info,
            ErrorKind::Authentication => ErrorSeverity::Warning,
            ErrorKind::Transient => ErrorSeverity::Error,
            ErrorKind::Internal => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the person operating the page
    pub fn user_message(&self) -> String {
        match self {
            CheckinError::Validation(msg) => msg.clone(),
            CheckinError::InvalidStateTransition { .. } => {
                "Esta pulseira já foi entregue.".to_string()
            }
            CheckinError::DuplicateCpf { .. }
            | CheckinError::Gateway(GatewayError::UniqueViolation { .. }) => {
                "Este CPF já está cadastrado. Se você já se inscreveu, não é necessário se inscrever novamente.".to_string()
            }
            CheckinError::Gateway(GatewayError::InvalidCredentials) => {
                "E-mail ou senha incorretos".to_string()
            }
            CheckinError::Authentication(msg) => msg.clone(),
            CheckinError::Gateway(GatewayError::Unauthorized) => {
                "Sessão expirada. Entre novamente.".to_string()
            }
            CheckinError::Gateway(GatewayError::Timeout)
            | CheckinError::Gateway(GatewayError::ServiceUnavailable)
            | CheckinError::Http(_)
            | CheckinError::Io(_) => {
                "Erro de conexão. Verifique sua internet e tente novamente.".to_string()
            }
            CheckinError::ParticipantNotFound { .. } => "Folião não encontrado.".to_string(),
            CheckinError::AttractionNotFound { .. } => "Atração não encontrada.".to_string(),
            _ => "Erro ao processar a operação. Tente novamente.".to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
