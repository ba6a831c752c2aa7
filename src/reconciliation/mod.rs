//! One reconciliation pass between the Drive folder and the local mirror.
//!
//! The pass is strictly sequential:
//! list remote, rename legacy names, refresh the listing if anything was
//! renamed, scan the mirror, download the missing weekly files, report.
//! Only listing failures end the pass early; per-file failures are counted.

mod execute;
mod plan;
mod stats;

pub use execute::{execute_fetches, execute_renames};
pub use plan::{
    plan_fetches, plan_renames, project_renames, scan_local_files, FetchAction, FetchPlan,
    RenameAction,
};
pub use stats::SyncStats;

use crate::config::{SideEffects, SyncConfig};
use crate::drive::{DriveError, RemoteStore};
use crate::filename::DaySelector;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to list remote folder: {0}")]
    ListError(#[source] DriveError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Inputs of a pass that are not the store itself
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub mirror_dir: PathBuf,
    pub day: DaySelector,
    pub side_effects: SideEffects,
}

impl From<&SyncConfig> for ReconcileOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            mirror_dir: config.mirror_dir.clone(),
            day: config.day,
            side_effects: config.side_effects,
        }
    }
}

/// Run a full pass and return its counters.
pub async fn reconcile(
    store: &dyn RemoteStore,
    options: &ReconcileOptions,
) -> Result<SyncStats, ReconcileError> {
    let mut stats = SyncStats::default();

    info!("Fetching files from Google Drive...");
    let mut remote = store.list().await.map_err(ReconcileError::ListError)?;
    info!(count = remote.len(), "Found files in Google Drive folder");

    info!("Checking for files to rename...");
    let renames = plan_renames(&remote);
    let applied = execute_renames(store, &renames, options.side_effects, &mut stats).await;

    if !applied.is_empty() {
        match options.side_effects {
            SideEffects::Apply => {
                remote = store.list().await.map_err(ReconcileError::ListError)?;
            }
            SideEffects::DryRun => project_renames(&mut remote, &applied),
        }
    }

    if !options.side_effects.is_dry_run() {
        fs::create_dir_all(&options.mirror_dir).await?;
    }
    let local = scan_local_files(&options.mirror_dir).await;
    info!(count = local.len(), dir = %options.mirror_dir.display(), "Found files in local directory");

    info!(day = %options.day, "Checking for new crosswords to download...");
    let plan = plan_fetches(&remote, &local, options.day);
    execute_fetches(store, &plan, &options.mirror_dir, options.side_effects, &mut stats).await;

    info!("Sync completed");
    stats.log_summary();
    Ok(stats)
}
