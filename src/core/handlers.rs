//! Account-backed query handlers.
//!
//! Every handler takes an already aggregated [`AccountGraph`] and either returns a
//! complete [`Report`] or an error; none of them touch the store. Amounts and
//! volumes stay in `Decimal` until they are rounded for display.

use crate::core::dispatch::QueryType;
use crate::core::report::{money, number, round, Report};
use crate::core::AccountGraph;
use crate::domain::model::{Client, ConsumptionReading, Invoice, PaymentState, RequestState};
use crate::utils::error::{AquaError, Result};
use rust_decimal::Decimal;
use serde_json::Value;

/// Share of the historical mean a reading may deviate by and still be normal.
pub fn normalcy_tolerance() -> Decimal {
    Decimal::new(3, 1)
}

const NO_INVOICES: &str = "No hay facturas disponibles";
const NO_CONSUMPTION: &str = "No hay datos de consumo disponibles";
const NOT_ENOUGH_TO_COMPARE: &str = "No hay suficientes datos para comparar";
const OUT_OF_RANGE: &str = "Los datos exceden el rango que se puede calcular";

/// Arithmetic on gateway values is checked; a result outside `Decimal` range
/// is reported as unusable data.
fn out_of_range() -> AquaError {
    AquaError::insufficient_data(OUT_OF_RANGE)
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(out_of_range)
    })
}

fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(out_of_range)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Result<Option<Decimal>> {
    if values.is_empty() {
        return Ok(None);
    }
    let sum = checked_sum(values.iter().copied())?;
    sum.checked_div(Decimal::from(values.len()))
        .map(Some)
        .ok_or_else(out_of_range)
}

/// Change from `previous` to `current` in percent; a zero baseline counts as no change.
pub fn percent_change(current: Decimal, previous: Decimal) -> Result<Decimal> {
    if previous.is_zero() {
        return Ok(Decimal::ZERO);
    }
    checked_sub(current, previous)?
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(out_of_range)
}

/// Absolute deviation of `latest` from `mean` and the tolerance it is held to.
fn deviation_and_threshold(latest: Decimal, mean: Decimal) -> Result<(Decimal, Decimal)> {
    let deviation = checked_sub(latest, mean)?.abs();
    let threshold = mean
        .checked_mul(normalcy_tolerance())
        .ok_or_else(out_of_range)?;
    Ok((deviation, threshold))
}

/// A deviation exactly at the tolerance is still normal.
pub fn is_normal(latest: Decimal, mean: Decimal) -> Result<bool> {
    let (deviation, threshold) = deviation_and_threshold(latest, mean)?;
    Ok(deviation <= threshold)
}

fn client(graph: &AccountGraph) -> Result<&Client> {
    graph.client.as_ref().ok_or_else(AquaError::client_not_found)
}

fn volumes(readings: &[ConsumptionReading]) -> Vec<Decimal> {
    readings.iter().map(|r| r.volume).collect()
}

fn with_state(invoices: &[Invoice], state: PaymentState) -> Vec<&Invoice> {
    invoices.iter().filter(|i| i.payment_state == state).collect()
}

fn sum_amounts(invoices: &[&Invoice]) -> Result<Decimal> {
    checked_sum(invoices.iter().map(|i| i.amount))
}

/// Volumes print without trailing zeros: `25`, `25.5`.
fn cubic_meters(volume: Decimal) -> String {
    volume.normalize().to_string()
}

/// Total of pending invoices in the window and the earliest pending due date.
/// Overdue invoices are not part of the balance.
pub fn current_balance(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let pending = with_state(&graph.invoices, PaymentState::Pending);
    let total = sum_amounts(&pending)?;
    let earliest_due = pending.iter().map(|i| i.due_date).min();

    Ok(Report::builder(QueryType::CurrentBalance, "Estado de Cuenta Actual")
        .field("cliente", client.full_name())
        .field("total_adeudado", number(total, 2))
        .field("facturas_pendientes", pending.len())
        .field(
            "proxima_fecha_vencimiento",
            earliest_due.map_or(Value::Null, |d| Value::from(d.to_string())),
        )
        .summary(format!(
            "Su saldo actual es de ${} con {} factura(s) pendiente(s).",
            money(total),
            pending.len()
        ))
        .suggestions(&[
            "¿Cómo puedo pagar mi factura?",
            "¿Dónde puedo pagar?",
            "¿Hay descuentos disponibles?",
        ])
        .build())
}

/// Latest reading against the window mean.
pub fn current_consumption(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let latest = graph.readings.first();
    // No readings is not an error here; every figure falls back to zero.
    let average = mean(&volumes(&graph.readings))?.unwrap_or(Decimal::ZERO);
    let current = latest.map_or(Decimal::ZERO, |r| r.volume);
    let delta = checked_sub(current, average)?;

    Ok(Report::builder(QueryType::CurrentConsumption, "Consumo de Agua Actual")
        .field("cliente", client.full_name())
        .field("consumo_actual", number(current, 2))
        .field("periodo", latest.map_or("", |r| r.period.as_str()))
        .field("promedio_6_meses", number(average, 2))
        .field("diferencia_promedio", number(delta, 2))
        .summary(format!(
            "Su consumo en {} es de {} m³.",
            latest.map_or("el periodo actual", |r| r.period.as_str()),
            cubic_meters(current)
        ))
        .suggestions(&[
            "¿Cómo ahorrar agua?",
            "Comparar con mes anterior",
            "¿Mi consumo es normal?",
        ])
        .build())
}

/// Pending invoice with the earliest due date.
pub fn next_invoice(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let mut pending = with_state(&graph.invoices, PaymentState::Pending);
    // Earliest due date first; the sort is stable so ties keep newest-period order.
    pending.sort_by_key(|i| i.due_date);
    let next = pending.first();

    let due = next.map(|i| i.due_date.to_string());
    let amount = next.map_or(Decimal::ZERO, |i| i.amount);

    Ok(Report::builder(QueryType::NextInvoice, "Próximo Vencimiento")
        .field("cliente", client.full_name())
        .field("fecha_vencimiento", due.clone().map_or(Value::Null, Value::from))
        .field("monto", number(amount, 2))
        .field("periodo", next.map_or("", |i| i.period.as_str()))
        .summary(format!(
            "Su próxima factura vence el {} por ${}.",
            due.as_deref().unwrap_or("N/A"),
            money(amount)
        ))
        .suggestions(&[
            "¿Cómo puedo pagar?",
            "¿Puedo pagar en línea?",
            "¿Dónde puedo pagar?",
        ])
        .build())
}

/// Meter details; missing values print as `N/A`.
pub fn meter_info(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let meter = graph.meter.as_ref();
    let number = meter.map_or("N/A", |m| m.number.as_str());
    let location = meter.and_then(|m| m.location.as_deref());
    let state = graph
        .contract
        .as_ref()
        .map_or("N/A", |c| c.service_state.as_str());

    Ok(Report::builder(QueryType::MeterInfo, "Información del Medidor")
        .field("cliente", client.full_name())
        .field("numero_medidor", number)
        .field("ubicacion", location.unwrap_or("N/A"))
        .field("estado_servicio", state)
        .summary(format!(
            "Su medidor #{} está ubicado en {}.",
            number,
            location.unwrap_or("ubicación no especificada")
        ))
        .suggestions(&[
            "¿Cómo cambiar mi medidor?",
            "¿Cómo reportar una fuga?",
            "Estado de mis solicitudes",
        ])
        .build())
}

/// Mean invoice amount over the window, any payment state.
pub fn billing_average(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let amounts: Vec<Decimal> = graph.invoices.iter().map(|i| i.amount).collect();
    let average = mean(&amounts)?.ok_or_else(|| AquaError::insufficient_data(NO_INVOICES))?;
    let total = checked_sum(amounts.iter().copied())?;

    Ok(Report::builder(QueryType::BillingAverage, "Promedio de Facturación")
        .field("cliente", client.full_name())
        .field("promedio_mensual", number(average, 2))
        .field("total_facturas", amounts.len())
        .field("monto_total", number(total, 2))
        .summary(format!(
            "Su promedio de facturación mensual es de ${} basado en {} facturas.",
            money(average),
            amounts.len()
        ))
        .suggestions(&[
            "Ver detalles de facturas",
            "¿Cómo reducir mi consumo?",
            "Historial de pagos",
        ])
        .build())
}

/// Count and total of overdue invoices.
pub fn overdue_invoices(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let overdue = with_state(&graph.invoices, PaymentState::Overdue);
    let total = sum_amounts(&overdue)?;

    let builder = Report::builder(QueryType::OverdueInvoices, "Facturas Vencidas")
        .field("cliente", client.full_name())
        .field("facturas_vencidas", overdue.len())
        .field("monto_total_vencido", number(total, 2));

    let report = if overdue.is_empty() {
        builder
            .field("estado", "Al día")
            .summary("¡Excelente! No tiene facturas vencidas.")
            .suggestions(&["Mantener al día", "Configurar recordatorios"])
    } else {
        builder
            .field("estado", "Vencidas")
            .summary(format!(
                "Tiene {} factura(s) vencida(s) por un total de ${}.",
                overdue.len(),
                money(total)
            ))
            .suggestions(&["¿Cómo puedo pagar?", "Plan de pagos", "Evitar recargos"])
    };
    Ok(report.build())
}

/// Mean, minimum and maximum volume over the window.
pub fn consumption_average(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let values = volumes(&graph.readings);
    let average = mean(&values)?.ok_or_else(|| AquaError::insufficient_data(NO_CONSUMPTION))?;
    let min = values.iter().copied().min().unwrap_or_default();
    let max = values.iter().copied().max().unwrap_or_default();

    Ok(Report::builder(QueryType::ConsumptionAverage, "Promedio de Consumo")
        .field("cliente", client.full_name())
        .field("promedio_6_meses", number(average, 2))
        .field("total_periodos", values.len())
        .field("consumo_minimo", number(min, 2))
        .field("consumo_maximo", number(max, 2))
        .summary(format!(
            "Su promedio de consumo es de {} m³ basado en {} períodos.",
            money(average),
            values.len()
        ))
        .suggestions(&[
            "¿Cómo ahorrar agua?",
            "Comparar con otros clientes",
            "Tips de eficiencia",
        ])
        .build())
}

/// Latest reading against the one before it.
pub fn month_over_month(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let [current, previous, ..] = graph.readings.as_slice() else {
        return Err(AquaError::insufficient_data(NOT_ENOUGH_TO_COMPARE));
    };
    // Readings arrive newest first.
    let (current, previous) = (current.volume, previous.volume);
    let delta = checked_sub(current, previous)?;
    let percent = round(percent_change(current, previous)?, 1);

    let builder = Report::builder(QueryType::MonthOverMonth, "Comparación con Mes Anterior")
        .field("cliente", client.full_name())
        .field("consumo_actual", number(current, 2))
        .field("consumo_anterior", number(previous, 2))
        .field("diferencia", number(delta, 2))
        .field("porcentaje_cambio", number(percent, 1));

    let report = if delta.is_zero() {
        builder
            .summary("Su consumo se mantuvo igual respecto al mes anterior.")
            .suggestions(&["Mantener eficiencia", "Tips para ahorrar"])
    } else {
        let direction = if delta > Decimal::ZERO {
            "aumentó"
        } else {
            "disminuyó"
        };
        let builder = builder.summary(format!(
            "Su consumo {} en {} m³ ({:.1}%) respecto al mes anterior.",
            direction,
            cubic_meters(delta.abs()),
            percent.abs()
        ));
        if delta > Decimal::ZERO {
            builder.suggestions(&[
                "¿Por qué cambió mi consumo?",
                "Tips para ahorrar",
                "Revisar fugas",
            ])
        } else {
            builder.suggestions(&["¡Excelente ahorro!", "Mantener eficiencia"])
        }
    };
    Ok(report.build())
}

/// Normal when the latest reading is within 30% of the window mean.
pub fn consumption_normalcy(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let values = volumes(&graph.readings);
    let (Some(&latest), Some(average)) = (values.first(), mean(&values)?) else {
        return Err(AquaError::insufficient_data(NO_CONSUMPTION));
    };
    // The latest reading is part of the mean it is compared against.
    let (deviation, threshold) = deviation_and_threshold(latest, average)?;
    let normal = deviation <= threshold;

    let builder = Report::builder(QueryType::ConsumptionNormalcy, "Evaluación de Consumo")
        .field("cliente", client.full_name())
        .field("consumo_actual", number(latest, 2))
        .field("promedio_historico", number(average, 2))
        .field("desviacion", number(deviation, 2))
        .field("umbral_tolerancia", number(threshold, 2));

    let report = if normal {
        builder
            .field("evaluacion", "Normal")
            .summary("Su consumo actual está dentro del rango normal.")
            .suggestions(&["Continuar así", "Consejos de ahorro"])
    } else {
        builder
            .field("evaluacion", "Atípico")
            .summary("Su consumo actual es atípico comparado con su historial.")
            .suggestions(&[
                "Revisar posibles fugas",
                "Contactar servicio técnico",
                "Revisar hábitos de consumo",
            ])
    };
    Ok(report.build())
}

/// Requests in the window grouped by state.
pub fn service_request_status(graph: &AccountGraph) -> Result<Report> {
    let client = client(graph)?;
    let count = |state: RequestState| graph.requests.iter().filter(|r| r.state == state).count();
    let open = count(RequestState::Open);
    let in_progress = count(RequestState::InProgress);
    let closed = count(RequestState::Closed);

    Ok(Report::builder(QueryType::ServiceRequestStatus, "Estado de Solicitudes")
        .field("cliente", client.full_name())
        .field("solicitudes_abiertas", open)
        .field("solicitudes_en_proceso", in_progress)
        .field("solicitudes_cerradas", closed)
        .field("total_solicitudes", graph.requests.len())
        .summary(format!(
            "Tiene {} solicitud(es) abierta(s), {} en proceso y {} cerrada(s).",
            open, in_progress, closed
        ))
        .suggestions(&[
            "Ver detalles de solicitudes",
            "Nueva solicitud",
            "Seguimiento de casos",
        ])
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::*;
    use chrono::NaiveDate;

    fn dec(units: i64) -> Decimal {
        Decimal::from(units)
    }

    fn graph() -> AccountGraph {
        AccountGraph::from_parts(
            AccountTriple {
                client: Client {
                    id: 1,
                    first_name: "María".to_string(),
                    last_name: "Zambrano".to_string(),
                    national_id: None,
                },
                contract: Contract {
                    id: 2,
                    client_id: 1,
                    service_state: ServiceState::Active,
                },
                meter: Meter {
                    id: 3,
                    contract_id: 2,
                    number: "MZ-003".to_string(),
                    location: Some("Av. 24 de Mayo".to_string()),
                },
            },
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    fn invoice(period: &str, amount: Decimal, state: PaymentState, due: (i32, u32, u32)) -> Invoice {
        Invoice {
            id: 0,
            contract_id: 2,
            period: period.to_string(),
            amount,
            payment_state: state,
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
        }
    }

    fn with_readings(volumes: &[i64]) -> AccountGraph {
        let mut graph = graph();
        graph.readings = volumes
            .iter()
            .enumerate()
            .map(|(i, v)| ConsumptionReading {
                id: i as i64,
                meter_id: 3,
                period: format!("2024-{:02}", 12 - i),
                volume: dec(*v),
            })
            .collect();
        graph
    }

    fn f64_field(report: &Report, key: &str) -> f64 {
        report.data[key].as_f64().unwrap()
    }

    #[test]
    fn test_current_balance_sums_only_pending() {
        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-06", dec(50), PaymentState::Pending, (2024, 7, 15)),
            invoice("2024-05", dec(30), PaymentState::Overdue, (2024, 6, 15)),
        ];

        let report = current_balance(&graph).unwrap();
        assert_eq!(f64_field(&report, "total_adeudado"), 50.0);
        assert_eq!(report.data["facturas_pendientes"], 1);
        assert_eq!(report.data["proxima_fecha_vencimiento"], "2024-07-15");
        assert_eq!(report.data["cliente"], "María Zambrano");
        assert!(report.summary.contains("$50.00"));
    }

    #[test]
    fn test_current_balance_reports_earliest_pending_due_date() {
        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-06", Decimal::new(1050, 2), PaymentState::Pending, (2024, 7, 15)),
            invoice("2024-05", Decimal::new(2025, 2), PaymentState::Pending, (2024, 6, 15)),
            invoice("2024-04", dec(99), PaymentState::Paid, (2024, 5, 15)),
        ];

        let report = current_balance(&graph).unwrap();
        assert_eq!(f64_field(&report, "total_adeudado"), 30.75);
        assert_eq!(report.data["proxima_fecha_vencimiento"], "2024-06-15");
    }

    #[test]
    fn test_current_balance_with_nothing_pending() {
        let report = current_balance(&graph()).unwrap();
        assert_eq!(f64_field(&report, "total_adeudado"), 0.0);
        assert_eq!(report.data["facturas_pendientes"], 0);
        assert!(report.data["proxima_fecha_vencimiento"].is_null());
        assert_eq!(report.summary, "Su saldo actual es de $0.00 con 0 factura(s) pendiente(s).");
    }

    #[test]
    fn test_current_consumption() {
        let report = current_consumption(&with_readings(&[30, 20, 10])).unwrap();
        assert_eq!(f64_field(&report, "consumo_actual"), 30.0);
        assert_eq!(f64_field(&report, "promedio_6_meses"), 20.0);
        assert_eq!(f64_field(&report, "diferencia_promedio"), 10.0);
        assert_eq!(report.data["periodo"], "2024-12");
        assert_eq!(report.summary, "Su consumo en 2024-12 es de 30 m³.");

        let empty = current_consumption(&graph()).unwrap();
        assert_eq!(f64_field(&empty, "consumo_actual"), 0.0);
        assert_eq!(empty.data["periodo"], "");
        assert!(empty.summary.contains("el periodo actual"));
    }

    #[test]
    fn test_next_invoice_sorts_pending_by_due_date() {
        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-06", dec(40), PaymentState::Pending, (2024, 7, 15)),
            invoice("2024-05", dec(35), PaymentState::Pending, (2024, 6, 15)),
            invoice("2024-04", dec(10), PaymentState::Overdue, (2024, 5, 15)),
        ];
        let report = next_invoice(&graph).unwrap();
        assert_eq!(report.data["fecha_vencimiento"], "2024-06-15");
        assert_eq!(report.data["periodo"], "2024-05");
        assert_eq!(f64_field(&report, "monto"), 35.0);

        let none = next_invoice(&self::graph()).unwrap();
        assert!(none.data["fecha_vencimiento"].is_null());
        assert!(none.summary.contains("N/A"));
    }

    #[test]
    fn test_meter_info_placeholders() {
        let report = meter_info(&graph()).unwrap();
        assert_eq!(report.data["numero_medidor"], "MZ-003");
        assert_eq!(report.data["estado_servicio"], "Activo");

        let mut graph = graph();
        graph.meter = None;
        graph.contract = None;
        let report = meter_info(&graph).unwrap();
        assert_eq!(report.data["numero_medidor"], "N/A");
        assert_eq!(report.data["ubicacion"], "N/A");
        assert_eq!(report.data["estado_servicio"], "N/A");
    }

    #[test]
    fn test_billing_average_needs_invoices() {
        let err = billing_average(&graph()).unwrap_err();
        assert!(matches!(err, AquaError::InsufficientData { ref message } if message == NO_INVOICES));

        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-06", Decimal::new(1000, 2), PaymentState::Paid, (2024, 7, 1)),
            invoice("2024-05", Decimal::new(2000, 2), PaymentState::Paid, (2024, 6, 1)),
            invoice("2024-04", Decimal::new(2500, 2), PaymentState::Pending, (2024, 5, 1)),
        ];
        let report = billing_average(&graph).unwrap();
        assert_eq!(f64_field(&report, "promedio_mensual"), 18.33);
        assert_eq!(f64_field(&report, "monto_total"), 55.0);
        assert_eq!(report.data["total_facturas"], 3);
    }

    #[test]
    fn test_overdue_branches() {
        let up_to_date = overdue_invoices(&graph()).unwrap();
        assert_eq!(up_to_date.data["estado"], "Al día");
        assert_eq!(up_to_date.suggestions, ["Mantener al día", "Configurar recordatorios"]);

        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-05", dec(30), PaymentState::Overdue, (2024, 6, 15)),
            invoice("2024-04", Decimal::new(1250, 2), PaymentState::Overdue, (2024, 5, 15)),
            invoice("2024-06", dec(50), PaymentState::Pending, (2024, 7, 15)),
        ];
        let report = overdue_invoices(&graph).unwrap();
        assert_eq!(report.data["estado"], "Vencidas");
        assert_eq!(report.data["facturas_vencidas"], 2);
        assert_eq!(f64_field(&report, "monto_total_vencido"), 42.5);
        assert_eq!(report.summary, "Tiene 2 factura(s) vencida(s) por un total de $42.50.");
    }

    #[test]
    fn test_consumption_average() {
        assert!(matches!(
            consumption_average(&graph()),
            Err(AquaError::InsufficientData { .. })
        ));
        let report = consumption_average(&with_readings(&[12, 18, 9, 15])).unwrap();
        assert_eq!(f64_field(&report, "promedio_6_meses"), 13.5);
        assert_eq!(f64_field(&report, "consumo_minimo"), 9.0);
        assert_eq!(f64_field(&report, "consumo_maximo"), 18.0);
        assert_eq!(report.data["total_periodos"], 4);
    }

    #[test]
    fn test_month_over_month() {
        let report = month_over_month(&with_readings(&[50, 40])).unwrap();
        assert_eq!(f64_field(&report, "diferencia"), 10.0);
        assert_eq!(f64_field(&report, "porcentaje_cambio"), 25.0);
        assert_eq!(
            report.summary,
            "Su consumo aumentó en 10 m³ (25.0%) respecto al mes anterior."
        );

        let report = month_over_month(&with_readings(&[50, 0])).unwrap();
        assert_eq!(f64_field(&report, "diferencia"), 50.0);
        assert_eq!(f64_field(&report, "porcentaje_cambio"), 0.0);

        let report = month_over_month(&with_readings(&[30, 40, 99])).unwrap();
        assert_eq!(f64_field(&report, "diferencia"), -10.0);
        assert_eq!(f64_field(&report, "porcentaje_cambio"), -25.0);
        assert!(report.summary.starts_with("Su consumo disminuyó en 10 m³ (25.0%)"));
        assert_eq!(report.suggestions, ["¡Excelente ahorro!", "Mantener eficiencia"]);
    }

    #[test]
    fn test_month_over_month_needs_two_readings() {
        let err = month_over_month(&with_readings(&[50])).unwrap_err();
        assert!(
            matches!(err, AquaError::InsufficientData { ref message } if message == NOT_ENOUGH_TO_COMPARE)
        );
    }

    #[test]
    fn test_percent_change_exact() {
        assert_eq!(percent_change(dec(50), dec(40)).unwrap(), dec(25));
        assert_eq!(percent_change(dec(50), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_normalcy_threshold() {
        // latest 140, mean 108: deviation 32 against a 32.4 tolerance.
        let report = consumption_normalcy(&with_readings(&[140, 100, 100, 100, 100])).unwrap();
        assert_eq!(report.data["evaluacion"], "Normal");
        assert_eq!(f64_field(&report, "promedio_historico"), 108.0);
        assert_eq!(f64_field(&report, "desviacion"), 32.0);

        // mean 10, deviation exactly 3 == 30% of mean.
        assert!(is_normal(dec(13), dec(10)).unwrap());
        assert!(!is_normal(dec(14), dec(10)).unwrap());
        let report = consumption_normalcy(&with_readings(&[13, 7])).unwrap();
        assert_eq!(report.data["evaluacion"], "Normal");

        let report = consumption_normalcy(&with_readings(&[14, 6])).unwrap();
        assert_eq!(report.data["evaluacion"], "Atípico");
        assert_eq!(report.suggestions.len(), 3);

        assert!(matches!(
            consumption_normalcy(&graph()),
            Err(AquaError::InsufficientData { .. })
        ));
    }

    fn with_volumes(volumes: &[Decimal]) -> AccountGraph {
        let mut graph = graph();
        graph.readings = volumes
            .iter()
            .enumerate()
            .map(|(i, v)| ConsumptionReading {
                id: i as i64,
                meter_id: 3,
                period: format!("2024-{:02}", 12 - i),
                volume: *v,
            })
            .collect();
        graph
    }

    #[test]
    fn test_tiny_baseline_is_out_of_range() {
        // 1 against 1e-28 is a ratio of ~1e28, which no longer fits once scaled to percent.
        let graph = with_volumes(&[Decimal::ONE, Decimal::new(1, 28)]);
        let err = month_over_month(&graph).unwrap_err();
        assert!(matches!(err, AquaError::InsufficientData { ref message } if message == OUT_OF_RANGE));
        assert_eq!(err.fault().kind.http_status(), 422);
    }

    #[test]
    fn test_huge_volumes_are_out_of_range() {
        let half = Decimal::MAX / dec(2);
        let graph = with_volumes(&[half, half, half]);

        let handlers: [fn(&AccountGraph) -> Result<Report>; 3] =
            [consumption_average, consumption_normalcy, current_consumption];
        for handler in handlers {
            let err = handler(&graph).unwrap_err();
            assert!(matches!(err, AquaError::InsufficientData { ref message } if message == OUT_OF_RANGE));
        }
        assert!(mean(&[half, half, half]).is_err());
        assert_eq!(mean(&[]).unwrap(), None);
    }

    #[test]
    fn test_huge_amounts_are_out_of_range() {
        let mut graph = graph();
        graph.invoices = vec![
            invoice("2024-06", Decimal::MAX, PaymentState::Pending, (2024, 7, 15)),
            invoice("2024-05", Decimal::MAX, PaymentState::Pending, (2024, 6, 15)),
        ];
        assert!(current_balance(&graph).is_err());
        assert!(billing_average(&graph).is_err());

        // Overdue total only sums overdue rows, so it still succeeds.
        let report = overdue_invoices(&graph).unwrap();
        assert_eq!(report.data["facturas_vencidas"], 0);
    }

    #[test]
    fn test_service_request_counts() {
        let mut graph = graph();
        let request = |state: RequestState| ServiceRequest {
            id: 0,
            client_id: 1,
            kind: Some("Reclamo".to_string()),
            state,
            filed_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        graph.requests = vec![
            request(RequestState::Open),
            request(RequestState::InProgress),
            request(RequestState::Open),
        ];
        let report = service_request_status(&graph).unwrap();
        assert_eq!(report.data["solicitudes_abiertas"], 2);
        assert_eq!(report.data["solicitudes_en_proceso"], 1);
        assert_eq!(report.data["solicitudes_cerradas"], 0);
        assert_eq!(report.data["total_solicitudes"], 3);

        let empty = service_request_status(&self::graph()).unwrap();
        assert_eq!(empty.data["total_solicitudes"], 0);
    }

    #[test]
    fn test_handlers_reject_graph_without_client() {
        for query_type in QueryType::ALL {
            if let crate::core::dispatch::Handler::Account(handler) = query_type.handler() {
                let err = handler(&AccountGraph::empty()).unwrap_err();
                assert!(matches!(err, AquaError::ClientNotFound { .. }));
            }
        }
    }
}
