use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::net::SocketAddr;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: MetricsConfig,
    pub herd: HerdConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Reference values used by the stewardship formulas.
///
/// The factors are simplified placeholders for the regulatory defined-dose
/// tables; per-species tables would replace them here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Body weight assumed for an adult animal, in kg. Also the PCU weight.
    pub standard_weight_kg: Decimal,
    /// DDDvet scaling per mg/kg per treatment day.
    pub ddd_factor: Decimal,
    /// DCDvet scaling per mg/kg per course.
    pub dcd_factor: Decimal,
    /// How many of the most recent months the trend series keeps.
    pub trend_months: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            standard_weight_kg: dec!(425),
            ddd_factor: dec!(0.1),
            dcd_factor: dec!(0.15),
            trend_months: 12,
        }
    }
}

/// Which herd the dashboard reports on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    pub active_herd_id: i32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self { active_herd_id: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects values that would make the formulas meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.metrics;
        if m.standard_weight_kg <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "metrics.standard_weight_kg must be greater than 0".to_string(),
            ));
        }
        if m.ddd_factor <= Decimal::ZERO || m.dcd_factor <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "metrics.ddd_factor and metrics.dcd_factor must be greater than 0".to_string(),
            ));
        }
        if m.trend_months == 0 {
            return Err(ConfigError::ValidationError(
                "metrics.trend_months must be at least 1".to_string(),
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }
}
