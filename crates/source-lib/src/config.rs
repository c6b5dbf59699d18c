//! Source configuration

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration surface of the pod-metrics source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Pod ids to query.
    #[serde(default)]
    pub ids: Vec<String>,

    /// Names of metric queries to execute.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,

    /// Base URL of the PromQL API. Validated when the source is built, so
    /// it may be filled in after loading (e.g. from a CLI flag).
    #[serde(default)]
    pub promql_api: String,

    /// Period to query over, e.g. "3h", "1d", "2w".
    #[serde(default = "default_period")]
    pub period: String,

    /// Step value to use in query_range queries.
    #[serde(default = "default_step")]
    pub step: String,
}

fn default_metrics() -> Vec<String> {
    vec![
        "memory_usage".to_string(),
        "cpu_usage".to_string(),
        "network_receive_bytes".to_string(),
    ]
}

fn default_period() -> String {
    "3h".to_string()
}

fn default_step() -> String {
    "10s".to_string()
}

impl SourceConfig {
    /// Load configuration from an optional `pms` config file in the
    /// working directory plus `PMS_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("pms").required(false))
            .add_source(env_source())
            .build()
            .context("Failed to load configuration")?;
        config.try_deserialize().context("Invalid configuration")
    }

    /// Load configuration from an explicit file, still honoring
    /// environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env_source())
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        config.try_deserialize().context("Invalid configuration")
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("PMS")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("ids")
        .with_list_parse_key("metrics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_applied() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "promql_api = \"https://promql.example.com\"").unwrap();
        writeln!(file, "ids = [\"abc123\", \"abc456\"]").unwrap();

        let config = SourceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.promql_api, "https://promql.example.com");
        assert_eq!(config.ids, vec!["abc123", "abc456"]);
        assert_eq!(
            config.metrics,
            vec!["memory_usage", "cpu_usage", "network_receive_bytes"]
        );
        assert_eq!(config.period, "3h");
        assert_eq!(config.step, "10s");
    }

    #[test]
    fn test_overrides_respected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "promql_api = \"https://promql.example.com\"").unwrap();
        writeln!(file, "metrics = [\"cpu_usage\"]").unwrap();
        writeln!(file, "period = \"1d\"").unwrap();
        writeln!(file, "step = \"30s\"").unwrap();

        let config = SourceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.metrics, vec!["cpu_usage"]);
        assert_eq!(config.period, "1d");
        assert_eq!(config.step, "30s");
        assert!(config.ids.is_empty());
    }
}
