//! Schema introspection command

use anyhow::Result;
use source_lib::PrometheusSource;

use crate::output::{self, OutputFormat};

/// Print the declared schema of one table, or of every table when no name
/// is given.
pub fn run(source: &PrometheusSource, table: Option<&str>, format: OutputFormat) -> Result<()> {
    match table {
        Some(name) => {
            let schema = source.schema(name)?;
            output::print_schema(name, &schema, format);
        }
        None => {
            for (name, schema) in source.schemas()? {
                output::print_schema(&name, &schema, format);
            }
        }
    }

    Ok(())
}
