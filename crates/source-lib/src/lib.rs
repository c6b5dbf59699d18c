//! PromQL data source for per-pod resource-usage timeseries
//!
//! This crate provides the core functionality for:
//! - Query construction against a Prometheus query_range endpoint
//! - Concurrent per-(pod, metric) fetching with failure isolation
//! - Best-effort series decoding
//! - Outer-join merge into one wide table per request

pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod query;
pub mod schema;
pub mod series;
pub mod source;
pub mod table;
pub mod window;

pub use config::SourceConfig;
pub use error::SourceError;
pub use fetch::{FetchDispatcher, FetchMap};
pub use metrics::{MetricDefinition, MetricRegistry};
pub use query::QueryTask;
pub use schema::{ColumnSchema, TableSchema, TIMESERIES_TABLE};
pub use series::Sample;
pub use source::{PrometheusSource, QueryFilter, Source};
pub use table::{ResultTable, Row};
pub use window::TimeWindow;
