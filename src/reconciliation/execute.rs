use super::plan::{FetchPlan, RenameAction};
use super::stats::SyncStats;
use crate::config::SideEffects;
use crate::drive::{DriveError, RemoteStore};
use crate::utils::partial_path;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info};

/// Rename legacy files in place.
///
/// Returns the renames that took effect (or would have, in a dry run).
/// A failed call is logged and counted; the remaining renames still run.
pub async fn execute_renames(
    store: &dyn RemoteStore,
    renames: &[RenameAction],
    side_effects: SideEffects,
    stats: &mut SyncStats,
) -> Vec<RenameAction> {
    let mut applied = Vec::new();

    for rename in renames {
        if side_effects.is_dry_run() {
            info!(from = %rename.from, to = %rename.to, "[DRY RUN] Would rename");
            stats.renamed += 1;
            applied.push(rename.clone());
            continue;
        }

        match store.rename(&rename.file_id, &rename.to).await {
            Ok(updated) => {
                info!(id = %updated.id, from = %rename.from, to = %updated.name, "Renamed");
                stats.renamed += 1;
                applied.push(rename.clone());
            }
            Err(e) => {
                error!(from = %rename.from, error = %e, "Failed to rename file");
                stats.errors += 1;
            }
        }
    }

    applied
}

/// Download every planned file into `dir`.
///
/// Content lands in a `.part` sibling first and is moved into place once
/// complete. Existing local files are never overwritten.
pub async fn execute_fetches(
    store: &dyn RemoteStore,
    plan: &FetchPlan,
    dir: &Path,
    side_effects: SideEffects,
    stats: &mut SyncStats,
) {
    for name in &plan.present {
        debug!(file = %name, "Skipping existing file");
        stats.skipped += 1;
    }

    for fetch in &plan.to_fetch {
        let dest = dir.join(&fetch.local_name);

        if side_effects.is_dry_run() {
            info!(file = %dest.display(), "[DRY RUN] Would download");
            stats.downloaded += 1;
            continue;
        }

        if fs::try_exists(&dest).await.unwrap_or(false) {
            debug!(file = %fetch.local_name, "Skipping existing file");
            stats.skipped += 1;
            continue;
        }

        info!(file = %fetch.local_name, remote = %fetch.remote_name, "Downloading new crossword");
        let partial = partial_path(&dest);

        let result = match store.download(&fetch.file_id, &partial).await {
            Ok(bytes) => fs::rename(&partial, &dest).await.map(|_| bytes).map_err(DriveError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                debug!(file = %fetch.local_name, bytes, "Download complete");
                stats.downloaded += 1;
            }
            Err(e) => {
                error!(file = %fetch.local_name, error = %e, "Failed to download file");
                let _ = fs::remove_file(&partial).await;
                stats.errors += 1;
            }
        }
    }
}
