use chrono::NaiveDate;
use contracts::dashboards::d402_sales_performance::{DatasetParams, GeneratorVariant};
use serde::Deserialize;

use crate::dashboards::d402_sales_performance::cache::CacheLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Dataset used when a request does not name one
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub seed: u64,
    #[serde(default)]
    pub variant: GeneratorVariant,
    /// Longest date span (inclusive days) a request may ask to generate
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    /// Generated datasets kept in memory at once
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_max_days() -> u32 {
    3660
}

fn default_cache_capacity() -> usize {
    8
}

impl GeneratorConfig {
    pub fn dataset_params(&self) -> DatasetParams {
        DatasetParams {
            start_date: self.start_date,
            end_date: self.end_date,
            seed: self.seed,
            variant: self.variant,
        }
    }

    pub fn cache_limits(&self) -> CacheLimits {
        CacheLimits {
            max_days: self.max_days,
            capacity: self.cache_capacity,
        }
    }
}

/// Presentation limits for the dashboard views
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub top_subcategories: usize,
    pub top_salespersons: usize,
    pub detail_row_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_subcategories: 15,
            top_salespersons: 10,
            detail_row_limit: 1000,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[generator]
start_date = "2022-01-01"
end_date = "2023-12-31"
seed = 42
variant = "transactions"
max_days = 3660
cache_capacity = 8

[dashboard]
top_subcategories = 15
top_salespersons = 10
detail_row_limit = 1000
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.generator.end_date < config.generator.start_date {
        anyhow::bail!(
            "generator.end_date {} is before generator.start_date {}",
            config.generator.end_date,
            config.generator.start_date
        );
    }
    if config.generator.max_days == 0 || config.generator.cache_capacity == 0 {
        anyhow::bail!("generator.max_days and generator.cache_capacity must be positive");
    }
    config
        .generator
        .cache_limits()
        .check_span(&config.generator.dataset_params())
        .map_err(|e| anyhow::anyhow!("default dataset: {e}"))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generator.seed, 42);
        assert_eq!(config.generator.variant, GeneratorVariant::Transactions);
        assert_eq!(config.dashboard, DashboardConfig::default());
        assert_eq!(config.generator.cache_limits(), CacheLimits::default());

        let params = config.generator.dataset_params();
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(params.end_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_dashboard_section_is_optional() {
        let config = parse_config(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[generator]
start_date = "2023-01-01"
end_date = "2023-06-30"
seed = 7
variant = "monthly_periods"
"#,
        )
        .unwrap();
        assert_eq!(config.dashboard.detail_row_limit, 1000);
        assert_eq!(config.generator.variant, GeneratorVariant::MonthlyPeriods);
        assert_eq!(config.generator.max_days, 3660);
        assert_eq!(config.generator.cache_capacity, 8);
    }

    #[test]
    fn test_reversed_dates_are_rejected() {
        let contents = DEFAULT_CONFIG.replace("2023-12-31", "2021-12-31");
        assert!(parse_config(&contents).is_err());
    }

    #[test]
    fn test_default_dataset_must_fit_max_days() {
        let contents = DEFAULT_CONFIG.replace("max_days = 3660", "max_days = 365");
        assert!(parse_config(&contents).is_err());

        let contents = DEFAULT_CONFIG.replace("cache_capacity = 8", "cache_capacity = 0");
        assert!(parse_config(&contents).is_err());
    }
}
