pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod observability;
pub mod resilience;
pub mod router;
pub mod security;

pub use config::{ModelConfig, RouterConfig};
pub use error::{Result, RouterError};
pub use router::{Action, ClarificationResponse, QueryRouter, ResponseEnvelope};
