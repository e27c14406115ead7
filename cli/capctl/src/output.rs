//! Output formatting for CLI commands.

use anyhow::Result;
use capalloc_allocator::Records;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON with sorted keys.
    #[default]
    Json,
    /// Human-readable tables.
    Table,
}

/// Print rows as a table, or a placeholder when there are none.
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found.".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Print a document as pretty JSON with sorted keys.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", format_json(data)?);
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print a failure message.
pub fn print_failure(message: &str) {
    println!("{} {}", "Failed:".red().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let value = serde_json::to_value(data)?;
    Ok(serde_json::to_string_pretty(&sort_json_value(value))?)
}

fn sort_json_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(sort_json_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut pairs: Vec<_> = entries.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut mapped = serde_json::Map::new();
            for (key, value) in pairs {
                mapped.insert(key, sort_json_value(value));
            }
            serde_json::Value::Object(mapped)
        }
        other => other,
    }
}

/// One granted entry.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct AllocationRow {
    #[tabled(rename = "Pool")]
    pub pool: String,

    #[tabled(rename = "DC")]
    pub dc: String,

    #[tabled(rename = "Entry")]
    pub entry: String,

    #[tabled(rename = "CPU")]
    pub cpu: u64,

    #[tabled(rename = "Memory")]
    pub mem: u64,

    #[tabled(rename = "Storage")]
    pub storage: u64,
}

/// Flatten one pool's records into rows, DCs then entries in map order.
pub fn allocation_rows(pool: &str, records: &Records) -> Vec<AllocationRow> {
    records
        .iter()
        .flat_map(|(dc, entries)| {
            entries.iter().map(move |(entry, quantity)| AllocationRow {
                pool: pool.to_string(),
                dc: dc.to_string(),
                entry: entry.to_string(),
                cpu: quantity.cpu,
                mem: quantity.mem,
                storage: quantity.storage,
            })
        })
        .collect()
}
