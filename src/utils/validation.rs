//! Field validators for gateway and logging settings. Each returns the
//! offending field name so the CLI can point at the exact TOML key.

use crate::utils::error::{AquaError, Result};
use std::path::Path;
use url::Url;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> AquaError {
    AquaError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AquaError::MissingConfigError {
        field: field.to_string(),
    })
}

/// The gateway URL is the project root; the store appends `/rest/v1/<table>` itself.
pub fn validate_gateway_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "URL has no host"));
    }
    if url.path().trim_end_matches('/').ends_with("/rest/v1") {
        return Err(invalid(
            field,
            value,
            "Use the project URL without the /rest/v1 suffix",
        ));
    }
    Ok(())
}

/// Rejects blank keys and `${VAR}` references left over when the variable was unset.
pub fn validate_api_key(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "API key cannot be empty"));
    }
    if value.contains("${") {
        return Err(AquaError::ConfigValidationError {
            field: field.to_string(),
            message: "unresolved environment variable".to_string(),
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, "<redacted>", "API key contains whitespace"));
    }
    Ok(())
}

/// Fixture tables are a single JSON document.
pub fn validate_fixture_path(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains('\0') {
        return Err(invalid(field, value, "Path is empty or contains null bytes"));
    }
    match Path::new(value).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        _ => Err(invalid(field, value, "Fixture file must be a .json document")),
    }
}

pub fn validate_log_level(field: &str, value: &str) -> Result<()> {
    if LOG_LEVELS.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            value,
            format!("Valid levels: {}", LOG_LEVELS.join(", ")),
        ))
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_url() {
        assert!(validate_gateway_url("gateway.base_url", "https://project.supabase.co").is_ok());
        assert!(validate_gateway_url("gateway.base_url", "http://localhost:54321/").is_ok());
        assert!(validate_gateway_url("gateway.base_url", "").is_err());
        assert!(validate_gateway_url("gateway.base_url", "invalid-url").is_err());
        assert!(validate_gateway_url("gateway.base_url", "ftp://example.com").is_err());

        let err = validate_gateway_url("gateway.base_url", "https://project.supabase.co/rest/v1/")
            .unwrap_err();
        assert!(matches!(err, AquaError::InvalidConfigValueError { ref reason, .. } if reason.contains("/rest/v1")));
    }

    #[test]
    fn test_api_key() {
        assert!(validate_api_key("gateway.api_key", "eyJhbGciOiJIUzI1NiJ9.anon").is_ok());
        assert!(validate_api_key("gateway.api_key", "   ").is_err());
        assert!(validate_api_key("gateway.api_key", "anon key").is_err());
        assert!(matches!(
            validate_api_key("gateway.api_key", "${SUPABASE_KEY}"),
            Err(AquaError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_fixture_path() {
        assert!(validate_fixture_path("gateway.fixture_path", "fixtures/accounts.json").is_ok());
        assert!(validate_fixture_path("gateway.fixture_path", "ACCOUNTS.JSON").is_ok());
        assert!(validate_fixture_path("gateway.fixture_path", "accounts.csv").is_err());
        assert!(validate_fixture_path("gateway.fixture_path", "accounts").is_err());
        assert!(validate_fixture_path("gateway.fixture_path", "").is_err());
    }

    #[test]
    fn test_log_level_and_range() {
        assert!(validate_log_level("logging.level", "debug").is_ok());
        assert!(validate_log_level("logging.level", "loud").is_err());

        assert!(validate_range("gateway.timeout_seconds", 10u64, 1, 300).is_ok());
        assert!(validate_range("gateway.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("gateway.timeout_seconds", 301u64, 1, 300).is_err());
    }

    #[test]
    fn test_required_field() {
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("gateway.api_key", &missing),
            Err(AquaError::MissingConfigError { .. })
        ));
        let present = Some("k".to_string());
        assert_eq!(validate_required_field("gateway.api_key", &present).unwrap(), "k");
    }
}
