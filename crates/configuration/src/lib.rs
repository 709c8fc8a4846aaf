use crate::error::ConfigError;
use crate::settings::Config;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{HerdConfig, LoggingConfig, MetricsConfig, ServerConfig};

/// The default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Command-line selection of the configuration file.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE, env = "AMU_CONFIG")]
    pub config: PathBuf,
}

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at `path`
/// (optional; a missing file is not an error), then `AMU_*` environment
/// variables using `__` as the section separator, e.g.
/// `AMU_METRICS__STANDARD_WEIGHT_KG=500`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix("AMU")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Loads `config.toml` from the working directory.
pub fn load_default_config() -> Result<Config, ConfigError> {
    load_config(&PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.metrics.standard_weight_kg, dec!(425));
        assert_eq!(config.metrics.ddd_factor, dec!(0.1));
        assert_eq!(config.metrics.dcd_factor, dec!(0.15));
        assert_eq!(config.metrics.trend_months, 12);
        assert_eq!(config.herd.active_herd_id, 1);
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:3000".parse::<std::net::SocketAddr>().unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn file_overrides_selected_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[metrics]\nstandard_weight_kg = 600\n\n[herd]\nactive_herd_id = 7\n\n[server]\nport = 8080"
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.metrics.standard_weight_kg, dec!(600));
        assert_eq!(config.metrics.ddd_factor, dec!(0.1));
        assert_eq!(config.herd.active_herd_id, 7);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut config = Config::default();
        config.metrics.standard_weight_kg = dec!(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
