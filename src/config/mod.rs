//! Run configuration.
//!
//! Values come from CLI flags with environment fallbacks (see `main.rs`).
//! Everything is validated here, once, before any network activity.

use crate::filename::DaySelector;
use crate::utils::{expand_home, MIRROR_SUBDIR};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default crossword host
pub const DEFAULT_PUZZLE_URL: &str = "https://nytsyn.pzzl.com/cwd_seattle/";

/// Default bound for each wait on the page
pub const DEFAULT_WAIT_SECS: u64 = 5;

/// Default poll interval for page waits
pub const DEFAULT_POLL_MS: u64 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Service account file not found: {0}")]
    CredentialsNotFound(PathBuf),

    #[error("--credentials and --folder-id must be given together")]
    UnpairedDriveFlags,
}

/// Whether mutating operations are performed or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideEffects {
    #[default]
    Apply,
    DryRun,
}

impl SideEffects {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            SideEffects::DryRun
        } else {
            SideEffects::Apply
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, SideEffects::DryRun)
    }
}

/// A Drive folder plus the credentials needed to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveTarget {
    pub credentials: PathBuf,
    pub folder_id: String,
}

impl DriveTarget {
    /// Build a target from the paired flags.
    ///
    /// Both absent is fine (no Drive access), exactly one is an error.
    pub fn from_pair(
        credentials: Option<PathBuf>,
        folder_id: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let credentials = credentials.filter(|p| !p.as_os_str().is_empty());
        let folder_id = folder_id.filter(|s| !s.trim().is_empty());

        match (credentials, folder_id) {
            (None, None) => Ok(None),
            (Some(credentials), Some(folder_id)) => {
                let credentials = validate_credentials(&credentials)?;
                Ok(Some(Self {
                    credentials,
                    folder_id,
                }))
            }
            _ => Err(ConfigError::UnpairedDriveFlags),
        }
    }
}

/// Configuration for `xword sync`
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Local directory that mirrors the weekly crosswords
    pub mirror_dir: PathBuf,
    pub drive: DriveTarget,
    pub day: DaySelector,
    pub side_effects: SideEffects,
}

impl SyncConfig {
    /// Validate raw values. Every missing value is reported at once.
    pub fn new(
        mirror_root: Option<PathBuf>,
        subdir: Option<String>,
        credentials: Option<PathBuf>,
        folder_id: Option<String>,
        day: DaySelector,
        side_effects: SideEffects,
    ) -> Result<Self, ConfigError> {
        let mirror_root = mirror_root.filter(|p| !p.as_os_str().is_empty());
        let credentials = credentials.filter(|p| !p.as_os_str().is_empty());
        let folder_id = folder_id.filter(|s| !s.trim().is_empty());

        let mut missing = Vec::new();
        if mirror_root.is_none() {
            missing.push("ICLOUD_PATH");
        }
        if credentials.is_none() {
            missing.push("GOOGLE_SERVICE_ACCOUNT_FILE");
        }
        if folder_id.is_none() {
            missing.push("GOOGLE_FOLDER_ID");
        }

        let (Some(mirror_root), Some(credentials), Some(folder_id)) =
            (mirror_root, credentials, folder_id)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let credentials = validate_credentials(&credentials)?;
        let subdir = subdir.unwrap_or_else(|| MIRROR_SUBDIR.to_string());

        Ok(Self {
            mirror_dir: expand_home(&mirror_root).join(subdir),
            drive: DriveTarget {
                credentials,
                folder_id,
            },
            day,
            side_effects,
        })
    }
}

/// Configuration for `xword download`
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub save_dir: PathBuf,
    pub upload: Option<DriveTarget>,
    pub url: String,
    pub headless: bool,
    pub chrome: Option<PathBuf>,
    pub wait: Duration,
    pub poll: Duration,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(crate::utils::DEFAULT_SAVE_DIR),
            upload: None,
            url: DEFAULT_PUZZLE_URL.to_string(),
            headless: true,
            chrome: None,
            wait: Duration::from_secs(DEFAULT_WAIT_SECS),
            poll: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}

fn validate_credentials(path: &Path) -> Result<PathBuf, ConfigError> {
    let path = expand_home(path);
    if !path.is_file() {
        return Err(ConfigError::CredentialsNotFound(path));
    }
    Ok(path)
}
