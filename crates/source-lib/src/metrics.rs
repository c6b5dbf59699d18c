//! Static metric definitions
//!
//! The source hardcodes three PromQL query templates over kubelet
//! container metrics. The registry is immutable and built once per source.

use crate::error::SourceError;
use crate::query::QueryTemplate;
use crate::schema::ColumnSchema;

const MEMORY_USAGE_QUERY: &str = r#"sum by(container_name)
    (container_memory_usage_bytes{job="kubelet",
    cluster="", namespace="default", pod_name=POD_NAME,
    container_name=~"app|app-proxy", container_name!="POD"})"#;

const NETWORK_RECEIVE_BYTES_QUERY: &str = r#"sort_desc(sum by (pod_name)
    (rate(container_network_receive_bytes_total{job="kubelet", cluster="",
    namespace="default", pod_name=POD_NAME}[1m])))"#;

const CPU_USAGE_QUERY: &str = r#"sum by (container_name)
    (rate(container_cpu_usage_seconds_total{job="kubelet", cluster="",
    namespace="default", image!="", pod_name=POD_NAME,
    container_name=~"app|app-proxy", container_name!="POD"}[1m]))"#;

/// One named metric query and the value type of its output column.
#[derive(Debug, Clone)]
pub struct MetricDefinition {
    name: &'static str,
    template: QueryTemplate,
    value_type: ColumnSchema,
}

impl MetricDefinition {
    fn new(name: &'static str, raw_template: &str) -> Self {
        Self {
            name,
            template: QueryTemplate::parse(raw_template),
            value_type: ColumnSchema::number(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    pub fn value_type(&self) -> &ColumnSchema {
        &self.value_type
    }
}

/// The static set of metrics this source can query.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    metrics: Vec<MetricDefinition>,
}

impl MetricRegistry {
    /// The built-in registry: memory usage, network receive rate and CPU
    /// usage rate per pod.
    pub fn builtin() -> Self {
        Self {
            metrics: vec![
                MetricDefinition::new("memory_usage", MEMORY_USAGE_QUERY),
                MetricDefinition::new("network_receive_bytes", NETWORK_RECEIVE_BYTES_QUERY),
                MetricDefinition::new("cpu_usage", CPU_USAGE_QUERY),
            ],
        }
    }

    /// Look up a metric by name.
    pub fn get(&self, name: &str) -> Result<&MetricDefinition, SourceError> {
        self.metrics
            .iter()
            .find(|metric| metric.name == name)
            .ok_or_else(|| SourceError::UnknownMetric(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|metric| metric.name).collect()
    }
}
