use crate::core::dispatch::{Handler, QueryType};
use crate::core::report::Report;
use crate::core::{aggregator, resolver, AccountGraph, AccountStore, AccountTriple, Resolution};
use crate::utils::error::{AquaError, Result};
use std::sync::Arc;

/// Entry point for callers: owns the shared store handle and runs one
/// resolve/aggregate/dispatch cycle per call. Cheap to clone.
pub struct QueryEngine<S: AccountStore + ?Sized> {
    store: Arc<S>,
}

impl<S: AccountStore + ?Sized> Clone for QueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AccountStore + ?Sized> QueryEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn resolve(&self, identifier: &str) -> Result<Resolution> {
        resolver::resolve(&*self.store, identifier).await
    }

    /// Like [`resolve`](Self::resolve) but an unresolved identifier is an error:
    /// `UnresolvedIdentifier` when no client lookup was reached, `ClientNotFound`
    /// otherwise.
    pub async fn resolve_strict(&self, identifier: &str) -> Result<AccountTriple> {
        match self.resolve(identifier).await? {
            Resolution::Resolved(triple) => Ok(triple),
            Resolution::Unresolved(reason) if reason.reached_client_lookup() => {
                Err(AquaError::client_not_found())
            }
            Resolution::Unresolved(_) => Err(AquaError::UnresolvedIdentifier {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub async fn aggregate(&self, resolution: Resolution) -> Result<AccountGraph> {
        aggregator::aggregate(&*self.store, resolution).await
    }

    /// Resolves and aggregates in one step; an unknown identifier gives an empty graph.
    pub async fn account(&self, identifier: &str) -> Result<AccountGraph> {
        let resolution = self.resolve(identifier).await?;
        self.aggregate(resolution).await
    }

    /// Runs one structured query. The token is checked before anything else, so
    /// an invalid token fails the same way for every identifier. Informational
    /// queries never touch the store.
    pub async fn run(&self, query_type: &str, identifier: &str) -> Result<Report> {
        let query_type: QueryType = query_type.parse()?;

        let report = match query_type.handler() {
            Handler::Static(handler) => handler(),
            Handler::Account(handler) => {
                let graph = self.account(identifier).await?;
                if !graph.has_client() {
                    tracing::info!("{}: no client for identifier '{}'", query_type, identifier);
                    return Err(AquaError::client_not_found());
                }
                handler(&graph)?
            }
        };

        tracing::info!("{}: {}", query_type, report.summary);
        Ok(report)
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.ping().await
    }
}
