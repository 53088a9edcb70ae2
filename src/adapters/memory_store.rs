use crate::domain::model::{
    Client, ConsumptionReading, Contract, Invoice, Meter, ServiceRequest, ServiceState,
};
use crate::domain::ports::{AccountStore, MeterLink};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table dump in the same shape the REST gateway returns, one array per table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFixture {
    #[serde(rename = "clientes", default)]
    pub clients: Vec<Client>,
    #[serde(rename = "contratos", default)]
    pub contracts: Vec<Contract>,
    #[serde(rename = "medidores", default)]
    pub meters: Vec<Meter>,
    #[serde(rename = "facturas", default)]
    pub invoices: Vec<Invoice>,
    #[serde(rename = "consumos", default)]
    pub readings: Vec<ConsumptionReading>,
    #[serde(rename = "solicitudes", default)]
    pub requests: Vec<ServiceRequest>,
}

/// Account store held entirely in memory. Applies the same ordering and limits
/// as the REST gateway, so it can stand in for it in tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    tables: AccountFixture,
}

impl InMemoryAccountStore {
    pub fn new(tables: AccountFixture) -> Self {
        Self { tables }
    }

    pub fn builder() -> InMemoryAccountStoreBuilder {
        InMemoryAccountStoreBuilder::default()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let tables: AccountFixture = serde_json::from_str(content)?;
        Ok(Self::new(tables))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!("Loaded fixture tables from {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    fn newest<T: Clone, K: Ord>(
        rows: impl Iterator<Item = T>,
        key: impl Fn(&T) -> K,
        limit: usize,
    ) -> Vec<T> {
        let mut rows: Vec<T> = rows.collect();
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        rows.truncate(limit);
        rows
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStoreBuilder {
    tables: AccountFixture,
}

impl InMemoryAccountStoreBuilder {
    pub fn client(mut self, client: Client) -> Self {
        self.tables.clients.push(client);
        self
    }

    pub fn contract(mut self, contract: Contract) -> Self {
        self.tables.contracts.push(contract);
        self
    }

    pub fn meter(mut self, meter: Meter) -> Self {
        self.tables.meters.push(meter);
        self
    }

    pub fn invoice(mut self, invoice: Invoice) -> Self {
        self.tables.invoices.push(invoice);
        self
    }

    pub fn reading(mut self, reading: ConsumptionReading) -> Self {
        self.tables.readings.push(reading);
        self
    }

    pub fn request(mut self, request: ServiceRequest) -> Self {
        self.tables.requests.push(request);
        self
    }

    pub fn build(self) -> InMemoryAccountStore {
        InMemoryAccountStore::new(self.tables)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_meter_by_number(&self, number: &str) -> Result<Option<MeterLink>> {
        let Some(meter) = self.tables.meters.iter().find(|m| m.number == number) else {
            return Ok(None);
        };
        let contract = self
            .tables
            .contracts
            .iter()
            .find(|c| c.id == meter.contract_id)
            .cloned();
        let client = contract.as_ref().and_then(|contract| {
            self.tables
                .clients
                .iter()
                .find(|c| c.id == contract.client_id)
                .cloned()
        });

        Ok(Some(MeterLink {
            meter: meter.clone(),
            contract,
            client,
        }))
    }

    async fn find_client(&self, client_id: i64) -> Result<Option<Client>> {
        Ok(self.tables.clients.iter().find(|c| c.id == client_id).cloned())
    }

    async fn find_active_contract(&self, client_id: i64) -> Result<Option<Contract>> {
        Ok(self
            .tables
            .contracts
            .iter()
            .filter(|c| c.client_id == client_id && c.service_state == ServiceState::Active)
            .max_by_key(|c| c.id)
            .cloned())
    }

    async fn find_meter_for_contract(&self, contract_id: i64) -> Result<Option<Meter>> {
        Ok(self
            .tables
            .meters
            .iter()
            .filter(|m| m.contract_id == contract_id)
            .max_by_key(|m| m.id)
            .cloned())
    }

    async fn recent_invoices(&self, contract_id: i64, limit: usize) -> Result<Vec<Invoice>> {
        Ok(Self::newest(
            self.tables
                .invoices
                .iter()
                .filter(|i| i.contract_id == contract_id)
                .cloned(),
            |i| i.period.clone(),
            limit,
        ))
    }

    async fn recent_consumption(
        &self,
        meter_id: i64,
        limit: usize,
    ) -> Result<Vec<ConsumptionReading>> {
        Ok(Self::newest(
            self.tables
                .readings
                .iter()
                .filter(|r| r.meter_id == meter_id)
                .cloned(),
            |r| r.period.clone(),
            limit,
        ))
    }

    async fn recent_service_requests(
        &self,
        client_id: i64,
        limit: usize,
    ) -> Result<Vec<ServiceRequest>> {
        Ok(Self::newest(
            self.tables
                .requests
                .iter()
                .filter(|r| r.client_id == client_id)
                .cloned(),
            |r| r.filed_on,
            limit,
        ))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AquaError;

    const FIXTURE: &str = r#"{
        "clientes": [{"id_cliente": 1, "nombre": "Rosa", "apellido": "Pinargote", "cedula": "1300000001"}],
        "contratos": [{"id_contrato": 11, "id_cliente": 1, "estado_servicio": "Activo"}],
        "medidores": [{"id_medidor": 111, "id_contrato": 11, "numero_medidor": "RP-111", "ubicacion": "Tarqui"}],
        "facturas": [
            {"id_factura": 1, "id_contrato": 11, "periodo": "2024-01", "monto": 12.5, "estado_pago": "Pagada", "fecha_vencimiento": "2024-02-15"},
            {"id_factura": 2, "id_contrato": 11, "periodo": "2024-02", "monto": "14.75", "estado_pago": "Pendiente", "fecha_vencimiento": "2024-03-15"}
        ]
    }"#;

    #[test]
    fn test_fixture_parsing_with_missing_tables() {
        let store = InMemoryAccountStore::from_json_str(FIXTURE).unwrap();
        let invoices =
            tokio_test::block_on(store.recent_invoices(11, 5)).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].period, "2024-02");

        let readings = tokio_test::block_on(store.recent_consumption(111, 5)).unwrap();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_meter_link_carries_contract_and_client() {
        let store = InMemoryAccountStore::from_json_str(FIXTURE).unwrap();
        let link = tokio_test::block_on(store.find_meter_by_number("RP-111"))
            .unwrap()
            .unwrap();
        assert_eq!(link.contract.map(|c| c.id), Some(11));
        assert_eq!(link.client.map(|c| c.first_name), Some("Rosa".to_string()));

        assert!(tokio_test::block_on(store.find_meter_by_number("rp-111"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_fixture_is_a_serialization_error() {
        let err = InMemoryAccountStore::from_json_str("{\"clientes\": 3}").unwrap_err();
        assert!(matches!(err, AquaError::SerializationError(_)));
    }
}
