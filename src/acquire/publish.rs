//! Saving and uploading acquired documents under their current-format names.

use super::Acquired;
use crate::drive::RemoteStore;
use crate::filename::{current_name, ArtifactKind};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

pub const PDF_MIME: &str = "application/pdf";

/// Outcome of uploading one run's documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: Vec<String>,
    pub already_present: Vec<String>,
    pub failed: Vec<String>,
}

/// Write each acquired document into `dir`, creating it if needed.
///
/// Returns the written paths. Write failures are logged and skipped.
pub async fn save_artifacts(dir: &Path, date: NaiveDate, acquired: &Acquired) -> Vec<PathBuf> {
    let mut written = Vec::new();

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create save directory");
        return written;
    }

    for kind in ArtifactKind::ALL {
        let Some(data) = acquired.get(kind) else {
            continue;
        };

        let path = dir.join(current_name(date, kind));
        match fs::write(&path, data).await {
            Ok(()) => {
                info!(file = %path.display(), "Saved");
                written.push(path);
            }
            Err(e) => error!(file = %path.display(), error = %e, "Failed to write file"),
        }
    }

    if let Ok(mut entries) = fs::read_dir(dir).await {
        debug!(dir = %dir.display(), "Files in save directory:");
        while let Ok(Some(entry)) = entries.next_entry().await {
            debug!("  - {}", entry.file_name().to_string_lossy());
        }
    }

    written
}

/// Upload each acquired document unless the folder already has that name.
pub async fn upload_artifacts(
    store: &dyn RemoteStore,
    date: NaiveDate,
    acquired: &Acquired,
) -> UploadSummary {
    let mut summary = UploadSummary::default();

    for kind in ArtifactKind::ALL {
        let Some(data) = acquired.get(kind) else {
            continue;
        };
        let name = current_name(date, kind);

        match store.find_by_name(&name).await {
            Ok(Some(existing)) => {
                info!(file = %name, id = %existing.id, "Already in Google Drive, skipping upload");
                summary.already_present.push(name);
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                error!(file = %name, error = %e, "Failed to check Google Drive");
                summary.failed.push(name);
                continue;
            }
        }

        match store.upload(&name, PDF_MIME, data.to_vec()).await {
            Ok(id) => {
                info!(file = %name, id = %id, "Uploaded to Google Drive");
                summary.uploaded.push(name);
            }
            Err(e) => {
                error!(file = %name, error = %e, "Failed to upload");
                summary.failed.push(name);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 9).unwrap()
    }

    #[tokio::test]
    async fn test_save_artifacts_names_by_date() {
        let dir = tempfile::TempDir::new().unwrap();
        let save_dir = dir.path().join("download");
        let acquired = Acquired {
            puzzle: Some(b"puzzle".to_vec()),
            solution: None,
        };

        let written = save_artifacts(&save_dir, date(), &acquired).await;
        assert_eq!(written, vec![save_dir.join("02-09-25-SUN Puzzle.pdf")]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"puzzle");
        assert!(!save_dir.join("02-09-25-SUN Solution.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_skips_existing_names() {
        let store = MemoryStore::with_files([("02-09-25-SUN Puzzle.pdf", b"old".as_slice())]);
        let acquired = Acquired {
            puzzle: Some(b"new".to_vec()),
            solution: Some(b"answers".to_vec()),
        };

        let summary = upload_artifacts(&store, date(), &acquired).await;
        assert_eq!(summary.already_present, vec!["02-09-25-SUN Puzzle.pdf"]);
        assert_eq!(summary.uploaded, vec!["02-09-25-SUN Solution.pdf"]);
        assert!(summary.failed.is_empty());
        assert_eq!(store.content_of("02-09-25-SUN Puzzle.pdf").await.unwrap(), b"old");
        assert_eq!(store.content_of("02-09-25-SUN Solution.pdf").await.unwrap(), b"answers");
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let store = MemoryStore::new();
        store.fail_on("02-09-25-SUN Solution.pdf").await;
        let acquired = Acquired {
            puzzle: Some(b"p".to_vec()),
            solution: Some(b"s".to_vec()),
        };

        let summary = upload_artifacts(&store, date(), &acquired).await;
        assert_eq!(summary.uploaded, vec!["02-09-25-SUN Puzzle.pdf"]);
        assert_eq!(summary.failed, vec!["02-09-25-SUN Solution.pdf"]);
    }
}
