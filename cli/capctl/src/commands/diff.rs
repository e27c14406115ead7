//! Diff command.

use std::path::PathBuf;

use anyhow::Result;
use capalloc_snapshot::{diff, AllocationDiff, SnapshotHash};
use clap::Args;
use serde_json::Value;
use tabled::Tabled;
use tracing::info;

use crate::io::read_json;
use crate::output::{print_info, print_table};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct DiffCommand {
    /// Older snapshot.
    #[arg(long, env = "OLD_ALLOC", value_name = "PATH")]
    old: PathBuf,

    /// Newer snapshot.
    #[arg(long, env = "NEW_ALLOC", value_name = "PATH")]
    new: PathBuf,
}

#[derive(Debug, PartialEq, Eq, Tabled)]
struct DiffRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,

    #[tabled(rename = "Path")]
    path: String,

    #[tabled(rename = "Old")]
    old: String,

    #[tabled(rename = "New")]
    new: String,
}

impl DiffCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let old = read_json(&self.old)?;
        let new = read_json(&self.new)?;

        let (old_hash, new_hash) = (SnapshotHash::from_json(&old), SnapshotHash::from_json(&new));
        info!(old = %old_hash, new = %new_hash, "Comparing snapshots");

        let delta = diff(&old, &new);

        ctx.emit(&delta, || {
            print_info(&format!("{old_hash} -> {new_hash}"));
            print_table(&diff_rows(&delta));
        })
    }
}

fn diff_rows(delta: &AllocationDiff) -> Vec<DiffRow> {
    let dash = || "-".to_string();
    let added = delta.added.iter().map(|(path, value)| DiffRow {
        kind: "added",
        path: path.clone(),
        old: dash(),
        new: render(value),
    });
    let removed = delta.removed.iter().map(|(path, value)| DiffRow {
        kind: "removed",
        path: path.clone(),
        old: render(value),
        new: dash(),
    });
    let changed = delta.changed.iter().map(|(path, change)| DiffRow {
        kind: "changed",
        path: path.clone(),
        old: render(&change.old),
        new: render(&change.new),
    });
    added.chain(removed).chain(changed).collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
