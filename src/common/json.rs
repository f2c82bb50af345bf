//! JSON record persistence helpers
//!
//! Every record this tool writes (deployment config, validation, health,
//! diagnostics) is pretty-printed JSON so end users can inspect the files.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{OutpostError, Result};

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| OutpostError::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| OutpostError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Serialize and write a JSON file, creating parent directories as needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        crate::common::fs::ensure_dir(parent)?;
    }
    let content =
        serde_json::to_string_pretty(value).map_err(|e| OutpostError::SerializeFailed {
            what: path.display().to_string(),
            reason: e.to_string(),
        })?;
    std::fs::write(path, content + "\n").map_err(|e| OutpostError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Record {
        name: String,
        deployed: bool,
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/record.json");

        let record = Record {
            name: "framework".to_string(),
            deployed: true,
        };

        write_json(&path, &record).unwrap();
        let loaded: Record = read_json(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_read_invalid_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Record> = read_json(&path);
        assert!(matches!(
            result.unwrap_err(),
            OutpostError::ConfigParseFailed { .. }
        ));
    }
}
