use crate::core::dispatch::QueryType;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Map, Value};

/// Uniform shape of every structured answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub query_type: QueryType,
    pub title: String,
    /// Serialized in insertion order.
    pub data: Map<String, Value>,
    pub summary: String,
    pub suggestions: Vec<String>,
}

impl Report {
    pub fn builder(query_type: QueryType, title: &str) -> ReportBuilder {
        ReportBuilder::new(query_type, title)
    }
}

pub struct ReportBuilder {
    query_type: QueryType,
    title: String,
    data: Map<String, Value>,
    summary: String,
    suggestions: Vec<String>,
}

impl ReportBuilder {
    pub fn new(query_type: QueryType, title: &str) -> Self {
        Self {
            query_type,
            title: title.to_string(),
            data: Map::new(),
            summary: String::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> Report {
        Report {
            query_type: self.query_type,
            title: self.title,
            data: self.data,
            summary: self.summary,
            suggestions: self.suggestions,
        }
    }
}

/// Rounds half away from zero, the way amounts are printed to customers.
pub fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// JSON number for a decimal rounded to `dp` places.
pub fn number(value: Decimal, dp: u32) -> Value {
    round(value, dp)
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// `12.5` -> `"12.50"`.
pub fn money(value: Decimal) -> String {
    format!("{:.2}", round(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_field_insertion_order() {
        let report = Report::builder(QueryType::CurrentBalance, "Estado de Cuenta Actual")
            .field("total_adeudado", number(Decimal::new(5000, 2), 2))
            .field("proxima_fecha_vencimiento", Value::Null)
            .field("cliente", "María Zambrano")
            .summary("resumen")
            .suggestions(&["a", "b"])
            .build();

        let keys: Vec<&str> = report.data.keys().map(String::as_str).collect();
        assert_eq!(keys, ["total_adeudado", "proxima_fecha_vencimiento", "cliente"]);

        let text = serde_json::to_string(&report).unwrap();
        let position = |key: &str| text.find(&format!("\"{}\"", key)).unwrap();
        assert!(position("total_adeudado") < position("proxima_fecha_vencimiento"));
        assert!(position("proxima_fecha_vencimiento") < position("cliente"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["query_type"], "saldo_actual");
        assert_eq!(json["data"]["total_adeudado"], json!(50.0));
        assert!(json["data"]["proxima_fecha_vencimiento"].is_null());
        assert_eq!(json["suggestions"], json!(["a", "b"]));
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(Decimal::from(50)), "50.00");
        assert_eq!(money(Decimal::new(12345, 3)), "12.35");
        assert_eq!(money(Decimal::new(-5, 1)), "-0.50");
    }
}
