//! The per-pass metadata record and where it is written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use vigil_spec::ResolvedProject;

use crate::task::Destination;

/// Which projects a scheduling pass attempted, with their configurations.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataRecord {
    pub project_id: String,
    pub dataset_id: String,
    pub projects: Vec<ResolvedProject>,
}

impl MetadataRecord {
    pub fn new(destination: &Destination, projects: Vec<ResolvedProject>) -> Self {
        Self {
            project_id: destination.project_id.clone(),
            dataset_id: destination.dataset_id.clone(),
            projects,
        }
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|p| p.slug.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives exactly one record per scheduling pass, from the orchestrating
/// thread.
pub trait MetadataSink: Send + Sync {
    fn write(&self, record: &MetadataRecord) -> Result<(), MetadataError>;
}

/// Writes `<dir>/<project_id>.<dataset_id>.json`, replacing the previous
/// record. Writes go to a temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileMetadataSink {
    dir: PathBuf,
}

impl JsonFileMetadataSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final location of the record for `project_id`/`dataset_id`.
    pub fn path_for(&self, project_id: &str, dataset_id: &str) -> PathBuf {
        self.dir.join(format!("{project_id}.{dataset_id}.json"))
    }
}

impl MetadataSink for JsonFileMetadataSink {
    fn write(&self, record: &MetadataRecord) -> Result<(), MetadataError> {
        fs::create_dir_all(&self.dir)?;
        let final_path = self.path_for(&record.project_id, &record.dataset_id);
        let tmp_path = self
            .dir
            .join(format!(".{}.{}.tmp", record.project_id, record.dataset_id));

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(path = %final_path.display(), projects = record.projects.len(), "wrote metadata record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_named_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = JsonFileMetadataSink::new(dir.path().join("nested"));
        let record = MetadataRecord::new(&Destination::new("proj", "ds"), Vec::new());

        sink.write(&record).unwrap();

        let path = sink.path_for("proj", "ds");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["project_id"], "proj");
        assert_eq!(value["dataset_id"], "ds");
        assert_eq!(value["projects"], serde_json::json!([]));
        // No temp file left behind.
        assert_eq!(fs::read_dir(sink.dir()).unwrap().count(), 1);
    }
}
