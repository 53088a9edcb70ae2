pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryAccountStore, RestAccountStore};
pub use config::{AquaConfig, GatewayKind};
pub use crate::core::{dispatch::QueryType, engine::QueryEngine, report::Report};
pub use domain::model::{AccountGraph, Resolution};
pub use domain::ports::AccountStore;
pub use utils::error::{AquaError, Fault, FaultKind, Result};

use std::sync::Arc;

/// Builds the store selected by the configuration. Called once at startup; the
/// returned handle is shared by every request.
pub fn connect(config: &AquaConfig) -> Result<Arc<dyn AccountStore>> {
    match config.gateway.kind {
        GatewayKind::Rest => {
            tracing::info!(
                "Using REST gateway at {}",
                config.gateway.base_url.as_deref().unwrap_or_default()
            );
            Ok(Arc::new(RestAccountStore::new(config)?))
        }
        GatewayKind::Fixture => {
            let path = utils::validation::validate_required_field(
                "gateway.fixture_path",
                &config.gateway.fixture_path,
            )?;
            tracing::info!("Using fixture tables from {}", path);
            Ok(Arc::new(InMemoryAccountStore::from_json_file(path)?))
        }
    }
}
