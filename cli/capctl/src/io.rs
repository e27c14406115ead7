//! Reading and writing JSON documents.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::output::format_json;

/// Read a file as untyped JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a file into a typed document.
pub fn read_typed<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("Unexpected document shape in {}", path.display()))
}

/// Write a document as pretty JSON with sorted keys.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut contents = format_json(data)?;
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
