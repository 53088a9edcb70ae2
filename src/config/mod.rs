pub mod toml_config;

pub use toml_config::{AquaConfig, GatewayKind};

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "aqua-desk")]
#[command(about = "Account lookup and structured queries for water utility customer service")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Serve accounts from a JSON table dump instead of the REST gateway
    #[arg(long, global = true, conflicts_with = "config")]
    pub fixtures: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one structured query and print the report as JSON
    Query {
        /// Query type token, e.g. saldo_actual
        query_type: String,
        /// Meter number or numeric client id
        #[arg(default_value = "")]
        identifier: String,
    },
    /// Resolve an identifier to its client, contract and meter
    Resolve { identifier: String },
    /// Print the aggregated account graph as JSON
    Account { identifier: String },
    /// Print the assistant prompt for a free-text question
    Prompt {
        question: String,
        #[arg(short, long, default_value = "")]
        identifier: String,
    },
    /// List the available query types
    List,
    /// Check that the account store is reachable
    Health,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Configuration precedence: `--fixtures`, then `--config`, then environment.
    pub fn load_config(&self) -> crate::utils::error::Result<AquaConfig> {
        if let Some(path) = &self.fixtures {
            return Ok(AquaConfig::fixture(path.clone()));
        }
        match &self.config {
            Some(path) => AquaConfig::from_file(path),
            None => AquaConfig::from_env(),
        }
    }
}
