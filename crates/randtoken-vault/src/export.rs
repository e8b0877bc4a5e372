//! Export artifacts.
//!
//! An export is written in two steps. [`ExportWriter::stage`] writes the
//! artifact to an anonymous temp file inside the exports directory;
//! [`StagedExport::publish`] renames it to its final name. Dropping a staged
//! export removes the temp file, so an export whose store update fails leaves
//! nothing behind.

use crate::error::StoreError;
use crate::record::{TokenRecord, created_at_format};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Timestamp format embedded in export file names.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Contents of one export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub seq_id: String,
    pub remark: String,
    #[serde(with = "created_at_format")]
    pub created_at: NaiveDateTime,
    pub tokens: Vec<String>,
}

impl From<&TokenRecord> for ExportArtifact {
    fn from(record: &TokenRecord) -> Self {
        Self {
            seq_id: record.sequence_id().to_string(),
            remark: record.remark().to_string(),
            created_at: record.created_at(),
            tokens: record.tokens().to_vec(),
        }
    }
}

/// Writes export artifacts into a dedicated directory.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    directory: PathBuf,
}

impl ExportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write the artifact for `record` to a temp file, ready to publish.
    pub fn stage(
        &self,
        record: &TokenRecord,
        exported_at: NaiveDateTime,
    ) -> Result<StagedExport, StoreError> {
        fs::create_dir_all(&self.directory)?;

        let artifact = ExportArtifact::from(record);
        let mut bytes = serde_json::to_vec_pretty(&artifact)?;
        bytes.push(b'\n');

        let mut file = NamedTempFile::new_in(&self.directory)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.as_file_mut().write_all(&bytes)?;
        file.as_file().sync_all()?;

        Ok(StagedExport {
            file,
            directory: self.directory.clone(),
            stem: format!(
                "tokens_{}_{}",
                file_name_component(&artifact.seq_id),
                exported_at.format(EXPORT_TIMESTAMP_FORMAT)
            ),
        })
    }
}

/// Sequence id made safe for a single path component.
///
/// Ids from older store files were never validated, so separators and
/// control characters are replaced with `_`. The artifact body keeps the
/// original id.
fn file_name_component(sequence_id: &str) -> String {
    sequence_id
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// An export artifact written to a temp file but not yet visible under its final name.
#[derive(Debug)]
pub struct StagedExport {
    file: NamedTempFile,
    directory: PathBuf,
    stem: String,
}

impl StagedExport {
    /// File name the artifact will get if it is free.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.stem)
    }

    /// Rename the artifact into place without overwriting an existing file.
    ///
    /// `tokens_<id>_<ts>.json` is tried first, then `tokens_<id>_<ts>_<n>.json`.
    pub fn publish(self) -> Result<PathBuf, StoreError> {
        let mut file = self.file;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.json", self.stem)
            } else {
                format!("{}_{}.json", self.stem, attempt)
            };
            let target = self.directory.join(name);

            match file.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => file = e.file,
                Err(e) => return Err(StoreError::Io(e.error)),
            }
        }

        Err(StoreError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free export file name for {}", self.stem),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record() -> TokenRecord {
        TokenRecord::new(
            "001",
            "ff".repeat(32),
            "key A",
            vec!["abc".to_string(), "def".to_string()],
            at(9, 0, 0),
        )
    }

    fn json_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_publish_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path().join("exports"));

        let staged = writer.stage(&record(), at(10, 11, 12)).unwrap();
        assert_eq!(staged.file_name(), "tokens_001_20240630101112.json");
        let path = staged.publish().unwrap();

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "tokens_001_20240630101112.json"
        );
        let artifact: ExportArtifact =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(artifact.seq_id, "001");
        assert_eq!(artifact.remark, "key A");
        assert_eq!(artifact.tokens, vec!["abc", "def"]);
        assert_eq!(artifact.created_at, at(9, 0, 0));
    }

    #[test]
    fn test_artifact_json_shape() {
        let value = serde_json::to_value(ExportArtifact::from(&record())).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(value["created_at"], "2024-06-30 09:00:00");
        assert!(object.get("password_hash").is_none());
    }

    #[test]
    fn test_unsafe_id_is_flattened_in_file_name() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path());
        let record = TokenRecord::new(
            "../a/b\\c\n",
            "ff".repeat(32),
            "legacy",
            vec!["abc".to_string()],
            at(9, 0, 0),
        );

        let staged = writer.stage(&record, at(10, 11, 12)).unwrap();
        assert_eq!(staged.file_name(), "tokens_.._a_b_c__20240630101112.json");
        let path = staged.publish().unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        let artifact: ExportArtifact =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(artifact.seq_id, "../a/b\\c\n");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path());

        let staged = writer.stage(&record(), at(10, 11, 12)).unwrap();
        drop(staged);

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_same_second_exports_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let writer = ExportWriter::new(dir.path());

        let first = writer.stage(&record(), at(10, 11, 12)).unwrap().publish().unwrap();
        let second = writer.stage(&record(), at(10, 11, 12)).unwrap().publish().unwrap();

        assert_ne!(first, second);
        assert_eq!(
            json_files(dir.path()),
            vec![
                "tokens_001_20240630101112.json".to_string(),
                "tokens_001_20240630101112_1.json".to_string(),
            ]
        );
    }
}
