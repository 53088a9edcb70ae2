pub mod aggregator;
pub mod dispatch;
pub mod engine;
pub mod handlers;
pub mod informational;
pub mod prompt;
pub mod report;
pub mod resolver;

pub use crate::domain::model::{AccountGraph, AccountTriple, Resolution, UnresolvedReason};
pub use crate::domain::ports::{AccountStore, GatewaySettings};
pub use crate::utils::error::Result;
