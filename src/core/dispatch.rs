use crate::core::report::Report;
use crate::core::{handlers, informational, AccountGraph};
use crate::utils::error::{AquaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of structured queries. Tokens are matched exactly,
/// case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    #[serde(rename = "saldo_actual")]
    CurrentBalance,
    #[serde(rename = "consumo_actual")]
    CurrentConsumption,
    #[serde(rename = "proxima_factura")]
    NextInvoice,
    #[serde(rename = "informacion_medidor")]
    MeterInfo,
    #[serde(rename = "promedio_facturacion")]
    BillingAverage,
    #[serde(rename = "facturas_vencidas")]
    OverdueInvoices,
    #[serde(rename = "promedio_consumo")]
    ConsumptionAverage,
    #[serde(rename = "comparar_mes_anterior")]
    MonthOverMonth,
    #[serde(rename = "consumo_normal")]
    ConsumptionNormalcy,
    #[serde(rename = "estado_solicitudes")]
    ServiceRequestStatus,
    #[serde(rename = "reportar_fuga")]
    LeakReporting,
    #[serde(rename = "cambiar_medidor")]
    MeterChange,
    #[serde(rename = "como_pagar")]
    PaymentMethods,
    #[serde(rename = "donde_pagar")]
    PaymentLocations,
    #[serde(rename = "pago_online")]
    OnlinePayment,
    #[serde(rename = "descuentos")]
    Discounts,
}

/// Handler computing a report from an aggregated account.
pub type AccountHandler = fn(&AccountGraph) -> Result<Report>;

/// Handler producing fixed reference content.
pub type StaticHandler = fn() -> Report;

#[derive(Clone, Copy)]
pub enum Handler {
    Account(AccountHandler),
    Static(StaticHandler),
}

impl QueryType {
    pub const ALL: [QueryType; 16] = [
        QueryType::CurrentBalance,
        QueryType::CurrentConsumption,
        QueryType::NextInvoice,
        QueryType::MeterInfo,
        QueryType::BillingAverage,
        QueryType::OverdueInvoices,
        QueryType::ConsumptionAverage,
        QueryType::MonthOverMonth,
        QueryType::ConsumptionNormalcy,
        QueryType::ServiceRequestStatus,
        QueryType::LeakReporting,
        QueryType::MeterChange,
        QueryType::PaymentMethods,
        QueryType::PaymentLocations,
        QueryType::OnlinePayment,
        QueryType::Discounts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::CurrentBalance => "saldo_actual",
            QueryType::CurrentConsumption => "consumo_actual",
            QueryType::NextInvoice => "proxima_factura",
            QueryType::MeterInfo => "informacion_medidor",
            QueryType::BillingAverage => "promedio_facturacion",
            QueryType::OverdueInvoices => "facturas_vencidas",
            QueryType::ConsumptionAverage => "promedio_consumo",
            QueryType::MonthOverMonth => "comparar_mes_anterior",
            QueryType::ConsumptionNormalcy => "consumo_normal",
            QueryType::ServiceRequestStatus => "estado_solicitudes",
            QueryType::LeakReporting => "reportar_fuga",
            QueryType::MeterChange => "cambiar_medidor",
            QueryType::PaymentMethods => "como_pagar",
            QueryType::PaymentLocations => "donde_pagar",
            QueryType::OnlinePayment => "pago_online",
            QueryType::Discounts => "descuentos",
        }
    }

    /// The registry. Exhaustive, so a new query type cannot ship without a handler.
    pub fn handler(&self) -> Handler {
        match self {
            QueryType::CurrentBalance => Handler::Account(handlers::current_balance),
            QueryType::CurrentConsumption => Handler::Account(handlers::current_consumption),
            QueryType::NextInvoice => Handler::Account(handlers::next_invoice),
            QueryType::MeterInfo => Handler::Account(handlers::meter_info),
            QueryType::BillingAverage => Handler::Account(handlers::billing_average),
            QueryType::OverdueInvoices => Handler::Account(handlers::overdue_invoices),
            QueryType::ConsumptionAverage => Handler::Account(handlers::consumption_average),
            QueryType::MonthOverMonth => Handler::Account(handlers::month_over_month),
            QueryType::ConsumptionNormalcy => Handler::Account(handlers::consumption_normalcy),
            QueryType::ServiceRequestStatus => {
                Handler::Account(handlers::service_request_status)
            }
            QueryType::LeakReporting => Handler::Static(informational::leak_reporting),
            QueryType::MeterChange => Handler::Static(informational::meter_change),
            QueryType::PaymentMethods => Handler::Static(informational::payment_methods),
            QueryType::PaymentLocations => Handler::Static(informational::payment_locations),
            QueryType::OnlinePayment => Handler::Static(informational::online_payment),
            QueryType::Discounts => Handler::Static(informational::discounts),
        }
    }

    pub fn requires_account(&self) -> bool {
        matches!(self.handler(), Handler::Account(_))
    }
}

impl FromStr for QueryType {
    type Err = AquaError;

    fn from_str(s: &str) -> Result<Self> {
        QueryType::ALL
            .iter()
            .copied()
            .find(|query_type| query_type.as_str() == s)
            .ok_or_else(|| AquaError::InvalidQueryType {
                query_type: s.to_string(),
            })
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
