//! In-memory remote folder with failure injection.

use super::{DriveError, RemoteFile, RemoteStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredFile {
    meta: RemoteFile,
    content: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    files: Vec<StoredFile>,
    /// Names whose rename/download calls fail
    failing: HashSet<String>,
    fail_listing: bool,
    list_calls: usize,
    rename_calls: usize,
    download_calls: usize,
}

/// A remote folder held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(name, content)` pairs.
    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let state = State {
            files: files
                .into_iter()
                .map(|(name, content)| new_file(name, content.to_vec()))
                .collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Add a file and return its id.
    pub async fn insert(&self, name: &str, content: &[u8]) -> String {
        let file = new_file(name, content.to_vec());
        let id = file.meta.id.clone();
        self.state.lock().await.files.push(file);
        id
    }

    /// Make every rename or download of the file currently called `name` fail.
    pub async fn fail_on(&self, name: &str) {
        self.state.lock().await.failing.insert(name.to_string());
    }

    /// Make listing fail.
    pub async fn fail_listing(&self) {
        self.state.lock().await.fail_listing = true;
    }

    /// Current file names, in insertion order.
    pub async fn names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.files.iter().map(|f| f.meta.name.clone()).collect()
    }

    pub async fn content_of(&self, name: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        state
            .files
            .iter()
            .find(|f| f.meta.name == name)
            .map(|f| f.content.clone())
    }

    pub async fn list_calls(&self) -> usize {
        self.state.lock().await.list_calls
    }

    pub async fn rename_calls(&self) -> usize {
        self.state.lock().await.rename_calls
    }

    pub async fn download_calls(&self) -> usize {
        self.state.lock().await.download_calls
    }
}

fn new_file(name: &str, content: Vec<u8>) -> StoredFile {
    StoredFile {
        meta: RemoteFile {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            modified_time: Some(Utc::now()),
        },
        content,
    }
}

fn simulated(name: &str) -> DriveError {
    DriveError::ApiError {
        status: 500,
        message: format!("simulated failure for {name}"),
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self) -> Result<Vec<RemoteFile>, DriveError> {
        let mut state = self.state.lock().await;
        state.list_calls += 1;
        if state.fail_listing {
            return Err(simulated("listing"));
        }
        Ok(state.files.iter().map(|f| f.meta.clone()).collect())
    }

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<RemoteFile, DriveError> {
        let mut state = self.state.lock().await;
        state.rename_calls += 1;

        let State { files, failing, .. } = &mut *state;
        let file = files
            .iter_mut()
            .find(|f| f.meta.id == file_id)
            .ok_or_else(|| DriveError::NotFound(file_id.to_string()))?;

        if failing.contains(&file.meta.name) {
            return Err(simulated(&file.meta.name));
        }

        file.meta.name = new_name.to_string();
        file.meta.modified_time = Some(Utc::now());
        Ok(file.meta.clone())
    }

    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64, DriveError> {
        let content = {
            let mut state = self.state.lock().await;
            state.download_calls += 1;

            let file = state
                .files
                .iter()
                .find(|f| f.meta.id == file_id)
                .ok_or_else(|| DriveError::NotFound(file_id.to_string()))?;

            if state.failing.contains(&file.meta.name) {
                return Err(simulated(&file.meta.name));
            }
            file.content.clone()
        };

        fs::write(dest, &content).await?;
        Ok(content.len() as u64)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RemoteFile>, DriveError> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .iter()
            .find(|f| f.meta.name == name)
            .map(|f| f.meta.clone()))
    }

    async fn upload(&self, name: &str, _mime_type: &str, data: Vec<u8>) -> Result<String, DriveError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(name) {
            return Err(simulated(name));
        }

        let file = new_file(name, data);
        let id = file.meta.id.clone();
        state.files.push(file);
        Ok(id)
    }
}
