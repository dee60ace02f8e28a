//! Move CKAN dataset metadata and files into ESS-DIVE.

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod infra;
pub mod observability;
pub mod pipeline;
pub mod types;

pub use config::{BridgeConfig, BridgeIntegration, MigrationConfig};
pub use error::{MigrationError, Result};
pub use types::{DestinationPayload, SourcePackage};
