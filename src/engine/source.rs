use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;

use crate::core::Recording;

/// Where a recording comes from.
///
/// Parsing raw capture files belongs to the implementor; the analysis only
/// needs a validated `Recording` back.
#[async_trait]
pub trait RecordingSource: Send + Sync {
    /// Identifier used in batch outcomes and logs
    fn id(&self) -> &str;

    async fn load(&self) -> Result<Recording>;
}

/// A recording that is already in memory
pub struct InMemorySource {
    id: String,
    recording: Recording,
}

impl InMemorySource {
    pub fn new(id: impl Into<String>, recording: Recording) -> Self {
        Self {
            id: id.into(),
            recording,
        }
    }
}

#[async_trait]
impl RecordingSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load(&self) -> Result<Recording> {
        Ok(self.recording.clone())
    }
}

/// JSON object mapping column names to equally long arrays of numbers.
///
/// `null` entries are read as NaN.
pub struct ColumnFile {
    id: String,
    path: PathBuf,
}

impl ColumnFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("recording")
            .to_string();
        Self { id, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl RecordingSource for ColumnFile {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load(&self) -> Result<Recording> {
        let content = fs::read_to_string(&self.path)
            .await
            .context(format!("Failed to read recording from {:?}", self.path))?;

        let raw: HashMap<String, Vec<Option<f64>>> = serde_json::from_str(&content)
            .context(format!("Failed to parse recording columns in {:?}", self.path))?;

        let columns = raw
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                (name, values)
            })
            .collect();

        Recording::from_columns(columns)
            .context(format!("Invalid recording in {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChannelTag, FRAME_COLUMN};
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    fn column_json(rows: usize) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            FRAME_COLUMN.to_string(),
            serde_json::json!((0..rows).collect::<Vec<_>>()),
        );
        for tag in ChannelTag::REQUIRED {
            for name in tag.column_names() {
                obj.insert(name, serde_json::json!(vec![0.5; rows]));
            }
        }
        serde_json::Value::Object(obj)
    }

    #[tokio::test]
    async fn test_column_file_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subject01_trial1.json");
        std::fs::write(&path, column_json(40).to_string()).unwrap();

        let source = ColumnFile::new(&path);
        assert_eq!(source.id(), "subject01_trial1");

        let recording = assert_ok!(source.load().await);
        assert_eq!(recording.len(), 40);
    }

    #[tokio::test]
    async fn test_column_file_nulls_become_nan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gaps.json");
        let mut json = column_json(5);
        json["Head_Pos.X"][2] = serde_json::Value::Null;
        std::fs::write(&path, json.to_string()).unwrap();

        let recording = ColumnFile::new(&path).load().await.unwrap();
        let x = recording
            .get(
                ChannelTag::HEAD_POSITION,
                ..,
                crate::core::DerivedKind::Value,
                crate::core::Axis::X,
            )
            .unwrap();
        assert!(x.single().unwrap()[2].is_nan());
    }

    #[tokio::test]
    async fn test_column_file_missing() {
        let dir = tempdir().unwrap();
        let source = ColumnFile::new(dir.path().join("absent.json"));
        let err = assert_err!(source.load().await);
        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_column_file_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"Frame\": \"oops\"}").unwrap();
        assert!(ColumnFile::new(&path).load().await.is_err());
    }
}
