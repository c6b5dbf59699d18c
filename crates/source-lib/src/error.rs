//! Error taxonomy for the pod-metrics source

use thiserror::Error;

/// Errors that abort a whole request.
///
/// Per-task fetch failures are not represented here: they are recovered
/// inside the dispatcher and degrade to missing data for that (pod, metric)
/// pair.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The configured period string does not match `<integer><unit>`.
    #[error(
        "could not parse period '{0}'; must specify weeks ('1w'), days ('1d'), \
         hours ('1h'), minutes ('1m'), or seconds ('1s')"
    )]
    InvalidPeriod(String),

    /// The requested table is not provided by this source.
    #[error("no '{0}' table; the only available table is 'timeseries'")]
    UnknownTable(String),

    /// A configured metric name has no static definition.
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    /// The configured PromQL API base URL is not a valid URL.
    #[error("invalid promql_api base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// A fetch task could not be scheduled or was torn down mid-flight.
    #[error("fetch task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
