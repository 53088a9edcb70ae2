use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "id_cliente")]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "cedula", default)]
    pub national_id: Option<String>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceState {
    Active,
    Suspended,
    Cancelled,
    Other(String),
}

impl ServiceState {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceState::Active => "Activo",
            ServiceState::Suspended => "Suspendido",
            ServiceState::Cancelled => "Cancelado",
            ServiceState::Other(s) => s,
        }
    }
}

impl From<String> for ServiceState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Activo" => ServiceState::Active,
            "Suspendido" => ServiceState::Suspended,
            "Cancelado" => ServiceState::Cancelled,
            _ => ServiceState::Other(s),
        }
    }
}

impl From<ServiceState> for String {
    fn from(state: ServiceState) -> Self {
        state.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(rename = "id_contrato")]
    pub id: i64,
    #[serde(rename = "id_cliente")]
    pub client_id: i64,
    #[serde(rename = "estado_servicio")]
    pub service_state: ServiceState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    #[serde(rename = "id_medidor")]
    pub id: i64,
    #[serde(rename = "id_contrato")]
    pub contract_id: i64,
    #[serde(rename = "numero_medidor", deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(rename = "ubicacion", default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentState {
    Pending,
    Paid,
    Overdue,
    Other(String),
}

impl PaymentState {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentState::Pending => "Pendiente",
            PaymentState::Paid => "Pagada",
            PaymentState::Overdue => "Vencida",
            PaymentState::Other(s) => s,
        }
    }
}

impl From<String> for PaymentState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pendiente" => PaymentState::Pending,
            "Pagada" => PaymentState::Paid,
            "Vencida" => PaymentState::Overdue,
            _ => PaymentState::Other(s),
        }
    }
}

impl From<PaymentState> for String {
    fn from(state: PaymentState) -> Self {
        state.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "id_factura")]
    pub id: i64,
    #[serde(rename = "id_contrato")]
    pub contract_id: i64,
    #[serde(rename = "periodo")]
    pub period: String,
    #[serde(rename = "monto")]
    pub amount: Decimal,
    #[serde(rename = "estado_pago")]
    pub payment_state: PaymentState,
    #[serde(rename = "fecha_vencimiento")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionReading {
    #[serde(rename = "id_consumo")]
    pub id: i64,
    #[serde(rename = "id_medidor")]
    pub meter_id: i64,
    #[serde(rename = "periodo")]
    pub period: String,
    /// Cubic meters.
    #[serde(rename = "consumo_metros_cubicos")]
    pub volume: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestState {
    Open,
    InProgress,
    Closed,
    Other(String),
}

impl RequestState {
    pub fn as_str(&self) -> &str {
        match self {
            RequestState::Open => "Abierta",
            RequestState::InProgress => "En Proceso",
            RequestState::Closed => "Cerrada",
            RequestState::Other(s) => s,
        }
    }
}

impl From<String> for RequestState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Abierta" => RequestState::Open,
            "En Proceso" => RequestState::InProgress,
            "Cerrada" => RequestState::Closed,
            _ => RequestState::Other(s),
        }
    }
}

impl From<RequestState> for String {
    fn from(state: RequestState) -> Self {
        state.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(rename = "id_solicitud")]
    pub id: i64,
    #[serde(rename = "id_cliente")]
    pub client_id: i64,
    #[serde(rename = "tipo_solicitud", default)]
    pub kind: Option<String>,
    #[serde(rename = "estado_solicitud")]
    pub state: RequestState,
    #[serde(rename = "fecha_solicitud")]
    pub filed_on: NaiveDate,
}

/// A fully linked client, contract and meter. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTriple {
    pub client: Client,
    pub contract: Contract,
    pub meter: Meter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    EmptyIdentifier,
    /// Not a known meter number and not numeric, so no client lookup happened.
    NoMatchingMeter,
    /// The meter exists but its contract or client link is missing.
    BrokenMeterLink,
    ClientNotFound,
    NoActiveContract,
    NoMeter,
}

impl UnresolvedReason {
    /// True when resolution got far enough to look a client up.
    pub fn reached_client_lookup(&self) -> bool {
        !matches!(
            self,
            UnresolvedReason::EmptyIdentifier | UnresolvedReason::NoMatchingMeter
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(AccountTriple),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn triple(&self) -> Option<&AccountTriple> {
        match self {
            Resolution::Resolved(triple) => Some(triple),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Transient read projection of one account, built per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountGraph {
    #[serde(rename = "cliente")]
    pub client: Option<Client>,
    #[serde(rename = "contrato")]
    pub contract: Option<Contract>,
    #[serde(rename = "medidor")]
    pub meter: Option<Meter>,
    /// Newest period first.
    #[serde(rename = "facturas")]
    pub invoices: Vec<Invoice>,
    /// Newest period first.
    #[serde(rename = "consumos")]
    pub readings: Vec<ConsumptionReading>,
    /// Newest filing date first.
    #[serde(rename = "solicitudes")]
    pub requests: Vec<ServiceRequest>,
}

impl AccountGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        triple: AccountTriple,
        invoices: Vec<Invoice>,
        readings: Vec<ConsumptionReading>,
        requests: Vec<ServiceRequest>,
    ) -> Self {
        Self {
            client: Some(triple.client),
            contract: Some(triple.contract),
            meter: Some(triple.meter),
            invoices,
            readings,
            requests,
        }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
