//! Table and JSON output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

use grc_core::types::Page;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One group of a grouped count.
#[derive(Debug, Serialize, Tabled)]
struct CountRow {
    /// Group value
    value: String,
    /// Records in the group
    count: u64,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => println!("{}", to_json(&items, "[]")),
    }
}

/// Print one page of records, showing `columns` in table mode.
pub fn print_page<T: Serialize>(page: &Page<T>, columns: &[&str], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if page.data.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", record_table(&page.data, columns));
            }
            println!(
                "Page {} of {} ({} records, {} per page)",
                page.page, page.total_pages, page.total, page.page_size
            );
        }
        OutputFormat::Json => println!("{}", to_json(page, "{}")),
    }
}

/// Print a single item in the selected format. Tables show one
/// `key: value` line per top-level field.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(Value::Object(fields)) => {
                for (key, value) in &fields {
                    print_kv(key, &cell(value));
                }
            }
            Ok(other) => println!("{}", cell(&other)),
            Err(e) => print_error(&format!("Failed to render item: {e}")),
        },
        OutputFormat::Json => println!("{}", to_json(item, "{}")),
    }
}

/// Print grouped counts, largest group first in table mode.
pub fn print_counts(counts: &BTreeMap<String, u64>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut rows: Vec<CountRow> = counts
                .iter()
                .map(|(value, count)| CountRow {
                    value: value.clone(),
                    count: *count,
                })
                .collect();
            rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            print_list(&rows, format);
        }
        OutputFormat::Json => println!("{}", to_json(counts, "{}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Render records as a table of `columns`, always led by `id`.
fn record_table<T: Serialize>(records: &[T], columns: &[&str]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once("id")
            .chain(columns.iter().copied())
            .map(str::to_string),
    );
    for record in records {
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        builder.push_record(
            std::iter::once("id")
                .chain(columns.iter().copied())
                .map(|column| value.get(column).map(cell).unwrap_or_default()),
        );
    }
    builder.build()
}

/// Display text of one JSON field.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::types::PageRequest;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell(&Value::Null), "-");
        assert_eq!(cell(&json!("high")), "high");
        assert_eq!(cell(&json!(7.5)), "7.5");
        assert_eq!(cell(&json!(true)), "true");
    }

    #[test]
    fn test_record_table_shows_id_and_columns() {
        let page = Page::new(
            vec![json!({"id": "a1", "title": "SQL injection", "severity": "high", "secret": "x"})],
            PageRequest::new(1, 10, 200),
            1,
        );
        let rendered = record_table(&page.data, &["title", "severity"]).to_string();
        assert!(rendered.contains("SQL injection"));
        assert!(rendered.contains("a1"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_missing_column_renders_empty() {
        let rendered = record_table(&[json!({"id": "a1"})], &["due_date"]).to_string();
        assert!(rendered.contains("due_date"));
    }
}
