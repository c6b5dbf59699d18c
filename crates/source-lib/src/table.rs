//! Merge engine
//!
//! Combines per-metric series into one row-aligned table per pod via a
//! full outer join on timestamp, then stacks per-pod tables into the final
//! result with the pod id as the leading column.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::series::Sample;

/// Decoded series keyed by pod id, then metric name.
pub type SeriesByPod = BTreeMap<String, BTreeMap<String, Vec<Sample>>>;

/// One output row: pod id, timestamp, and one optional value per metric
/// column (in the table's column order).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

/// The assembled result of one request.
///
/// Columns are always `id`, `timestamp`, then the configured metrics in
/// order, whether or not any rows are present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON records, one object per row.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = serde_json::Map::new();
                record.insert("id".to_string(), json!(row.id));
                record.insert("timestamp".to_string(), json!(row.timestamp.to_rfc3339()));
                for (column, value) in self.columns.iter().skip(2).zip(&row.values) {
                    record.insert(column.clone(), json!(value));
                }
                Value::Object(record)
            })
            .collect()
    }
}

/// Outer-join each pod's metric series on timestamp and concatenate the
/// per-pod tables in `pod_order`. All of a pod's rows are contiguous and
/// timestamp-ordered.
pub fn merge(pod_order: &[String], metric_order: &[String], series: &SeriesByPod) -> ResultTable {
    let mut columns = Vec::with_capacity(metric_order.len() + 2);
    columns.push("id".to_string());
    columns.push("timestamp".to_string());
    columns.extend(metric_order.iter().cloned());

    let mut rows = Vec::new();
    for pod_id in pod_order {
        let Some(pod_series) = series.get(pod_id) else {
            continue;
        };
        // Union of timestamps across this pod's metrics; a metric absent
        // at a timestamp leaves its slot empty.
        let mut joined: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
        for (slot, metric) in metric_order.iter().enumerate() {
            let samples = pod_series.get(metric).map(Vec::as_slice).unwrap_or(&[]);
            for sample in samples {
                joined
                    .entry(sample.timestamp)
                    .or_insert_with(|| vec![None; metric_order.len()])[slot] = Some(sample.value);
            }
        }
        rows.extend(joined.into_iter().map(|(timestamp, values)| Row {
            id: pod_id.clone(),
            timestamp,
            values,
        }));
    }

    ResultTable { columns, rows }
}
