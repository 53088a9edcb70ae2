use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AquaError {
    #[error("Data source unavailable: {message}")]
    DataSourceUnavailable { message: String },

    #[error("{message}")]
    ClientNotFound { message: String },

    #[error("{message}")]
    InsufficientData { message: String },

    #[error("Invalid query type: {query_type}")]
    InvalidQueryType { query_type: String },

    #[error("Unresolved identifier: {identifier}")]
    UnresolvedIdentifier { identifier: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, AquaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    NotFound,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Caller-visible failure kinds of the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    DataSourceUnavailable,
    ClientNotFound,
    InsufficientData,
    InvalidQueryType,
    UnresolvedIdentifier,
}

impl FaultKind {
    /// Status code a transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            FaultKind::ClientNotFound | FaultKind::UnresolvedIdentifier => 404,
            FaultKind::InvalidQueryType => 400,
            FaultKind::InsufficientData => 422,
            FaultKind::DataSourceUnavailable => 500,
        }
    }
}

/// Structured failure record handed to callers in place of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl AquaError {
    pub fn data_source(message: impl Into<String>) -> Self {
        AquaError::DataSourceUnavailable {
            message: message.into(),
        }
    }

    pub fn client_not_found() -> Self {
        AquaError::ClientNotFound {
            message: "Cliente no encontrado".to_string(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        AquaError::InsufficientData {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AquaError::DataSourceUnavailable { .. } => ErrorCategory::DataSource,
            AquaError::ClientNotFound { .. } | AquaError::UnresolvedIdentifier { .. } => {
                ErrorCategory::NotFound
            }
            AquaError::InsufficientData { .. } | AquaError::InvalidQueryType { .. } => {
                ErrorCategory::Input
            }
            AquaError::ConfigError { .. }
            | AquaError::ConfigValidationError { .. }
            | AquaError::InvalidConfigValueError { .. }
            | AquaError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AquaError::IoError(_) | AquaError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::DataSource | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AquaError::DataSourceUnavailable { .. } => {
                "Check the gateway URL, API key and network connectivity"
            }
            AquaError::ClientNotFound { .. } | AquaError::UnresolvedIdentifier { .. } => {
                "Provide a valid meter number or numeric client id"
            }
            AquaError::InsufficientData { .. } => {
                "The account does not have enough history for this query"
            }
            AquaError::InvalidQueryType { .. } => "Run `aqua-desk list` to see the valid query types",
            AquaError::MissingConfigError { .. } => {
                "Set the missing value in the config file or environment"
            }
            AquaError::ConfigError { .. }
            | AquaError::ConfigValidationError { .. }
            | AquaError::InvalidConfigValueError { .. } => "Review the configuration file",
            AquaError::IoError(_) => "Check that the file exists and is readable",
            AquaError::SerializationError(_) => "Check that the input is valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AquaError::DataSourceUnavailable { .. } => {
                "The account database is not reachable right now".to_string()
            }
            AquaError::ClientNotFound { message } | AquaError::InsufficientData { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// Projects the error onto the caller-facing fault taxonomy. Configuration and
    /// local IO errors never reach a query caller, so they report as the data source.
    pub fn fault(&self) -> Fault {
        let kind = match self {
            AquaError::ClientNotFound { .. } => FaultKind::ClientNotFound,
            AquaError::InsufficientData { .. } => FaultKind::InsufficientData,
            AquaError::InvalidQueryType { .. } => FaultKind::InvalidQueryType,
            AquaError::UnresolvedIdentifier { .. } => FaultKind::UnresolvedIdentifier,
            _ => FaultKind::DataSourceUnavailable,
        };
        Fault {
            kind,
            message: self.user_friendly_message(),
        }
    }
}

impl From<reqwest::Error> for AquaError {
    fn from(e: reqwest::Error) -> Self {
        AquaError::data_source(e.to_string())
    }
}

impl From<AquaError> for Fault {
    fn from(e: AquaError) -> Self {
        e.fault()
    }
}
