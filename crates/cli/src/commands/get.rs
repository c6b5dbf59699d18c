//! Timeseries query command

use anyhow::Result;
use source_lib::{PrometheusSource, QueryFilter};

use crate::output::{self, OutputFormat};

/// Run a query against the source and print the merged table.
pub async fn run(
    source: &PrometheusSource,
    table: &str,
    ids: &[String],
    format: OutputFormat,
) -> Result<()> {
    let filter = if ids.is_empty() {
        QueryFilter::default()
    } else {
        QueryFilter::with_ids(ids.iter().cloned())
    };

    let result = source.get(table, &filter).await?;
    output::print_result_table(&result, format);

    Ok(())
}
