//! Streaming output helpers (made by FontLab https://www.fontlab.com/)

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::explode::{ExplodedFont, ExplodedIndex, ExplodedKey};

/// Flat view of one exploded leaf, for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub family: String,
    pub series: String,
    pub shape: String,
    /// `low-high`, empty when the font has no optical size range.
    pub optical: String,
    pub source: String,
    pub filename: PathBuf,
    pub vendor: String,
    pub font_name: String,
    pub options: Vec<String>,
}

impl PlanEntry {
    pub fn new(key: &ExplodedKey, font: &ExplodedFont) -> Self {
        Self {
            family: key.family.to_string(),
            series: key.series.clone(),
            shape: key.shape.clone(),
            optical: key.optical_key(),
            source: font.source.clone(),
            filename: font.filename.clone(),
            vendor: font.vendor.clone(),
            font_name: font.font_name.clone(),
            options: font.options.clone(),
        }
    }
}

/// Every leaf of the index, in key order.
pub fn plan_entries(index: &ExplodedIndex) -> Vec<PlanEntry> {
    index.iter().map(|(key, font)| PlanEntry::new(key, font)).collect()
}

/// Write results as prettified JSON array.
pub fn write_json_pretty<T: Serialize>(results: &[T], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write results as newline-delimited JSON (NDJSON).
pub fn write_ndjson<T: Serialize>(results: &[T], mut w: impl Write) -> Result<()> {
    for item in results {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
