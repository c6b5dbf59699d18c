//! Table schema description
//!
//! Describes the shape of the output table independent of whether any data
//! is present, so consumers can rely on column presence even with zero
//! rows.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::metrics::MetricRegistry;

/// Name of the single table this source provides.
pub const TIMESERIES_TABLE: &str = "timeseries";

/// JSON-schema fragment describing one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    #[serde(rename = "type")]
    pub data_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ColumnSchema {
    pub fn number() -> Self {
        Self {
            data_type: "number",
            format: None,
            allowed: None,
        }
    }

    pub fn datetime() -> Self {
        Self {
            data_type: "string",
            format: Some("datetime"),
            allowed: None,
        }
    }

    pub fn string_enum(allowed: Vec<String>) -> Self {
        Self {
            data_type: "string",
            format: None,
            allowed: Some(allowed),
        }
    }
}

/// Ordered mapping of column name to column schema.
///
/// Column order is part of the contract: an empty result table exposes
/// exactly these columns in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    columns: Vec<(String, ColumnSchema)>,
}

impl TableSchema {
    pub fn new(columns: Vec<(String, ColumnSchema)>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[(String, ColumnSchema)] {
        &self.columns
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, schema)| schema)
    }
}

// Serialized as a JSON object whose keys appear in declared column order.
impl Serialize for TableSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, column) in &self.columns {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}

/// Build the schema of the `timeseries` table for the current
/// configuration: `id`, `timestamp`, then one numeric column per
/// configured metric.
pub fn timeseries_schema(
    config: &SourceConfig,
    registry: &MetricRegistry,
) -> Result<TableSchema, SourceError> {
    let mut columns = Vec::with_capacity(config.metrics.len() + 2);
    columns.push((
        "id".to_string(),
        ColumnSchema::string_enum(config.ids.clone()),
    ));
    columns.push(("timestamp".to_string(), ColumnSchema::datetime()));
    for name in &config.metrics {
        let metric = registry.get(name)?;
        columns.push((name.clone(), metric.value_type().clone()));
    }
    Ok(TableSchema::new(columns))
}
