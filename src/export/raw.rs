use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Capture file for one survey's responses inside a results folder
pub fn survey_results_path(folder: &Path, survey_id: &str) -> PathBuf {
    folder.join(format!("survey_results_{}.json", survey_id))
}

pub fn load_json_array(path: &Path) -> Result<Vec<Value>> {
    info!("Reading file {}.", path.display());

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file: {:?}", path))?;

    match value {
        Value::Array(items) => {
            debug!("Loaded {} items from {:?}", items.len(), path);
            Ok(items)
        }
        _ => bail!("Expected a JSON array in {:?}", path),
    }
}

pub fn save_json_array(path: &Path, items: &[Value]) -> Result<()> {
    debug!("Writing {} items to {:?}", items.len(), path);

    let content = serde_json::to_string(items).context("Failed to serialize JSON")?;
    fs::write(path, content).with_context(|| format!("Failed to write JSON file: {:?}", path))?;
    Ok(())
}
