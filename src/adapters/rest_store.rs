use crate::domain::model::{
    Client, ConsumptionReading, Contract, Invoice, Meter, ServiceRequest, ServiceState,
};
use crate::domain::ports::{AccountStore, GatewaySettings, MeterLink};
use crate::utils::error::{AquaError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Account store backed by a PostgREST endpoint (the Supabase REST API).
///
/// One `reqwest::Client` is built up front and reused; its connection pool is
/// what concurrent requests share. Every transport error, non-2xx status and
/// undecodable body is reported as `DataSourceUnavailable`.
#[derive(Debug, Clone)]
pub struct RestAccountStore {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

/// A `medidores` row with its contract and the contract's client embedded
/// through PostgREST resource embedding. Either level may be null.
#[derive(Debug, Deserialize)]
struct MeterRow {
    #[serde(flatten)]
    meter: Meter,
    #[serde(rename = "contratos", default)]
    contract: Option<ContractRow>,
}

#[derive(Debug, Deserialize)]
struct ContractRow {
    #[serde(flatten)]
    contract: Contract,
    #[serde(rename = "clientes", default)]
    client: Option<Client>,
}

impl RestAccountStore {
    /// Builds the pooled HTTP client with the configured request timeout.
    pub fn new<C: GatewaySettings + ?Sized>(settings: &C) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url().trim_end_matches('/').to_string(),
            api_key: settings.api_key().to_string(),
        })
    }

    /// `{base}/rest/v1/{table}`
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// GET one table with PostgREST query parameters and decode the JSON array.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table);
        tracing::debug!("GET {} {:?}", url, params);

        // Supabase expects the key both as `apikey` and as a bearer token.
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} responded with {}", table, status);

        if !status.is_success() {
            // Keep the body; PostgREST puts the failing filter or column in it.
            let body = response.text().await.unwrap_or_default();
            return Err(AquaError::data_source(format!(
                "query on '{}' failed with {}: {}",
                table, status, body
            )));
        }

        response.json::<Vec<T>>().await.map_err(|e| {
            AquaError::data_source(format!("unexpected response from '{}': {}", table, e))
        })
    }

    /// First row of [`select`](Self::select), if any.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        Ok(self.select(table, params).await?.into_iter().next())
    }
}

/// PostgREST equality filter value.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl AccountStore for RestAccountStore {
    async fn find_meter_by_number(&self, number: &str) -> Result<Option<MeterLink>> {
        let row: Option<MeterRow> = self
            .select_one(
                "medidores",
                &[
                    ("select", "*,contratos(*,clientes(*))".to_string()),
                    ("numero_medidor", eq(number)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        // A null embed means the foreign key points nowhere; the resolver decides what that means.
        Ok(row.map(|row| {
            let (contract, client) = match row.contract {
                Some(ContractRow { contract, client }) => (Some(contract), client),
                None => (None, None),
            };
            MeterLink {
                meter: row.meter,
                contract,
                client,
            }
        }))
    }

    async fn find_client(&self, client_id: i64) -> Result<Option<Client>> {
        self.select_one(
            "clientes",
            &[("select", "*".to_string()), ("id_cliente", eq(client_id))],
        )
        .await
    }

    async fn find_active_contract(&self, client_id: i64) -> Result<Option<Contract>> {
        self.select_one(
            "contratos",
            &[
                ("select", "*".to_string()),
                ("id_cliente", eq(client_id)),
                ("estado_servicio", eq(ServiceState::Active.as_str())),
                ("order", "id_contrato.desc".to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .await
    }

    async fn find_meter_for_contract(&self, contract_id: i64) -> Result<Option<Meter>> {
        self.select_one(
            "medidores",
            &[
                ("select", "*".to_string()),
                ("id_contrato", eq(contract_id)),
                ("order", "id_medidor.desc".to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .await
    }

    async fn recent_invoices(&self, contract_id: i64, limit: usize) -> Result<Vec<Invoice>> {
        self.select(
            "facturas",
            &[
                ("select", "*".to_string()),
                ("id_contrato", eq(contract_id)),
                ("order", "periodo.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn recent_consumption(
        &self,
        meter_id: i64,
        limit: usize,
    ) -> Result<Vec<ConsumptionReading>> {
        self.select(
            "consumos",
            &[
                ("select", "*".to_string()),
                ("id_medidor", eq(meter_id)),
                ("order", "periodo.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn recent_service_requests(
        &self,
        client_id: i64,
        limit: usize,
    ) -> Result<Vec<ServiceRequest>> {
        self.select(
            "solicitudes",
            &[
                ("select", "*".to_string()),
                ("id_cliente", eq(client_id)),
                ("order", "fecha_solicitud.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn ping(&self) -> Result<()> {
        // The schema root answers without touching any table.
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AquaError::data_source(format!(
                "gateway health check returned {}",
                response.status()
            )))
        }
    }
}
