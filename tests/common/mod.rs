#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xword_sync::config::SideEffects;
use xword_sync::filename::DaySelector;
use xword_sync::reconciliation::ReconcileOptions;

/// RSA key used to sign test assertions
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Options for a Sunday pass mirroring into `dir`
pub fn sunday_options(dir: &Path, side_effects: SideEffects) -> ReconcileOptions {
    ReconcileOptions {
        mirror_dir: dir.to_path_buf(),
        day: DaySelector::default(),
        side_effects,
    }
}

/// Sorted names of the files directly inside `dir`
pub fn local_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Write a service account key file whose token endpoint is `token_uri`
pub fn write_service_account(dir: &Path, token_uri: &str) -> PathBuf {
    let key = serde_json::json!({
        "type": "service_account",
        "client_email": "crosswords@test-project.iam.gserviceaccount.com",
        "private_key": TEST_PRIVATE_KEY,
        "token_uri": token_uri,
    });
    let path = dir.join("service-account.json");
    std::fs::write(&path, key.to_string()).expect("Failed to write service account file");
    path
}
