//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use source_lib::{ResultTable, TableSchema};
use tabled::builder::Builder;
use tabled::settings::Style;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a merged result table
pub fn print_result_table(result: &ResultTable, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if result.is_empty() {
                print_warning("No data points returned");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(result.columns().iter().map(String::as_str));
            for row in result.rows() {
                let mut record = Vec::with_capacity(result.columns().len());
                record.push(row.id.clone());
                record.push(row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
                for value in &row.values {
                    record.push(match value {
                        Some(number) => format!("{number}"),
                        None => "-".to_string(),
                    });
                }
                builder.push_record(record);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} rows", result.len());
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&result.to_records()) {
                println!("{}", json);
            }
        }
    }
}

/// Print the declared schema of one table
pub fn print_schema(table: &str, schema: &TableSchema, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{}", format!("Table '{}'", table).bold());
            let mut builder = Builder::default();
            builder.push_record(["Column", "Type", "Format", "Enum"]);
            for (name, column) in schema.columns() {
                builder.push_record([
                    name.clone(),
                    column.data_type.to_string(),
                    column.format.unwrap_or("-").to_string(),
                    column
                        .allowed
                        .as_ref()
                        .map(|values| values.join(", "))
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            let rendered = builder.build().with(Style::rounded()).to_string();
            println!("{}", rendered);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(schema) {
                println!("{}", json);
            }
        }
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
