use thiserror::Error;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No matching tools found for the query")]
    NoToolMatched,

    #[error("Insufficient confidence to process query: {confidence:.2} (required: {threshold:.2})")]
    InsufficientConfidence { confidence: f64, threshold: f64 },

    #[error("No input data files available for analysis")]
    NoResourceAvailable,

    #[error("Tool '{name}' not found (available: {})", .available.join(", "))]
    ToolNotFound { name: String, available: Vec<String> },

    #[error("{kind} '{name}' not found (available: {})", .available.join(", "))]
    ResourceNotFound {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
        output: Option<String>,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] JsonError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl RouterError {
    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        RouterError::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
            output: None,
        }
    }

    /// Errors that belong to a single request and are reported in its envelope.
    /// Only configuration and metrics setup failures are fatal to the router.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RouterError::InvalidConfig(_) | RouterError::ConfigParse(_) | RouterError::Metrics(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RouterError::Network(_) | RouterError::Timeout(_))
    }

    /// Captured collaborator output, when the failing collaborator produced any.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            RouterError::Collaborator { output, .. } => output.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
