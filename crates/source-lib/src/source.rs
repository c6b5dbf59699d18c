//! The Prometheus pod-metrics source
//!
//! Single-shot request entry point driving window resolution, query
//! construction, concurrent fetch, series decoding and the merge into one
//! result table.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::fetch::FetchDispatcher;
use crate::metrics::MetricRegistry;
use crate::query;
use crate::schema::{self, TableSchema, TIMESERIES_TABLE};
use crate::series;
use crate::table::{self, ResultTable, SeriesByPod};
use crate::window::TimeWindow;

/// Filters recognized by [`Source::get`].
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Restrict the result to these pod ids; absent means all configured
    /// ids pass.
    pub id: Option<BTreeSet<String>>,
}

impl QueryFilter {
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Some(ids.into_iter().map(Into::into).collect()),
        }
    }

    fn selects(&self, pod_id: &str) -> bool {
        self.id.as_ref().map_or(true, |ids| ids.contains(pod_id))
    }
}

/// Seam toward the surrounding source registry.
#[async_trait]
pub trait Source: Send + Sync {
    /// Registry key for this source kind.
    fn source_type(&self) -> &'static str;

    /// Schema of one table.
    fn schema(&self, table: &str) -> Result<TableSchema, SourceError>;

    /// Schemas of every table this source provides.
    fn schemas(&self) -> Result<BTreeMap<String, TableSchema>, SourceError>;

    /// Run a query against a table.
    async fn get(&self, table: &str, filter: &QueryFilter) -> Result<ResultTable, SourceError>;
}

/// Queries a PromQL endpoint for timeseries information about Kubernetes
/// pods.
pub struct PrometheusSource {
    config: SourceConfig,
    registry: MetricRegistry,
    dispatcher: FetchDispatcher,
}

impl PrometheusSource {
    /// Build a source from its configuration.
    ///
    /// Fails fast on an unconfigured metric name; no network calls are
    /// made here. The base URL is validated per query, so a source built
    /// only for schema introspection needs no endpoint.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let registry = MetricRegistry::builtin();
        for metric in &config.metrics {
            registry.get(metric)?;
        }
        Ok(Self {
            config,
            registry,
            dispatcher: FetchDispatcher::new()?,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Schema of one table; `UnknownTable` for anything but `timeseries`.
    pub fn schema(&self, table: &str) -> Result<TableSchema, SourceError> {
        if table != TIMESERIES_TABLE {
            return Err(SourceError::UnknownTable(table.to_string()));
        }
        schema::timeseries_schema(&self.config, &self.registry)
    }

    /// Full table name to schema mapping.
    pub fn schemas(&self) -> Result<BTreeMap<String, TableSchema>, SourceError> {
        Ok(BTreeMap::from([(
            TIMESERIES_TABLE.to_string(),
            schema::timeseries_schema(&self.config, &self.registry)?,
        )]))
    }

    /// Run one request: resolve the window, fan out one fetch per
    /// (pod, metric) pair, decode and merge.
    pub async fn get(
        &self,
        table: &str,
        filter: &QueryFilter,
    ) -> Result<ResultTable, SourceError> {
        if table != TIMESERIES_TABLE {
            return Err(SourceError::UnknownTable(table.to_string()));
        }
        // Structural failures surface before any network call.
        let window = TimeWindow::resolve(&self.config.period)?;
        Url::parse(&self.config.promql_api)
            .map_err(|_| SourceError::InvalidBaseUrl(self.config.promql_api.clone()))?;

        let pods: Vec<String> = self
            .config
            .ids
            .iter()
            .filter(|pod_id| filter.selects(pod_id))
            .cloned()
            .collect();

        let mut tasks = Vec::with_capacity(pods.len() * self.config.metrics.len());
        for pod_id in &pods {
            for name in &self.config.metrics {
                let metric = self.registry.get(name)?;
                tasks.push(query::build_task(
                    &self.config.promql_api,
                    metric,
                    pod_id,
                    &window,
                    &self.config.step,
                ));
            }
        }
        debug!(pods = pods.len(), tasks = tasks.len(), "dispatching query batch");

        let fetched = self.dispatcher.fetch_all(tasks).await?;

        let mut decoded = SeriesByPod::new();
        for (pod_id, payloads) in fetched {
            let pod_series = decoded.entry(pod_id).or_default();
            for (metric, payload) in payloads {
                pod_series.insert(metric, series::decode(payload.as_ref()));
            }
        }

        Ok(table::merge(&pods, &self.config.metrics, &decoded))
    }
}

#[async_trait]
impl Source for PrometheusSource {
    fn source_type(&self) -> &'static str {
        "prometheus"
    }

    fn schema(&self, table: &str) -> Result<TableSchema, SourceError> {
        PrometheusSource::schema(self, table)
    }

    fn schemas(&self) -> Result<BTreeMap<String, TableSchema>, SourceError> {
        PrometheusSource::schemas(self)
    }

    async fn get(&self, table: &str, filter: &QueryFilter) -> Result<ResultTable, SourceError> {
        PrometheusSource::get(self, table, filter).await
    }
}
