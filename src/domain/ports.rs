use crate::domain::model::{
    Client, ConsumptionReading, Contract, Invoice, Meter, ServiceRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A meter together with whatever its contract and client links point at.
/// Either link may be missing when the store has a referential gap.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterLink {
    pub meter: Meter,
    pub contract: Option<Contract>,
    pub client: Option<Client>,
}

/// Read-only gateway over the utility's account tables. Implementations must be
/// safe to share between concurrent requests and report every failure as
/// `AquaError::DataSourceUnavailable`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Join-style lookup of a meter by its number, with contract and client.
    async fn find_meter_by_number(&self, number: &str) -> Result<Option<MeterLink>>;

    async fn find_client(&self, client_id: i64) -> Result<Option<Client>>;

    /// Most recently created active contract of the client.
    async fn find_active_contract(&self, client_id: i64) -> Result<Option<Contract>>;

    /// Most recently created meter of the contract.
    async fn find_meter_for_contract(&self, contract_id: i64) -> Result<Option<Meter>>;

    /// Newest `limit` invoices of the contract, by period descending.
    async fn recent_invoices(&self, contract_id: i64, limit: usize) -> Result<Vec<Invoice>>;

    /// Newest `limit` readings of the meter, by period descending.
    async fn recent_consumption(
        &self,
        meter_id: i64,
        limit: usize,
    ) -> Result<Vec<ConsumptionReading>>;

    /// Newest `limit` service requests of the client, by filing date descending.
    async fn recent_service_requests(
        &self,
        client_id: i64,
        limit: usize,
    ) -> Result<Vec<ServiceRequest>>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<()>;
}

pub trait GatewaySettings: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
