use crate::drive::RemoteFile;
use crate::filename::{classify, legacy_to_current, parse_current, DaySelector, FilenameFormat};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

/// A remote file to move from the legacy to the current convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameAction {
    pub file_id: String,
    pub from: String,
    pub to: String,
}

/// A remote file missing from the local mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAction {
    pub file_id: String,
    pub remote_name: String,
    pub local_name: String,
}

/// The download half of a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct FetchPlan {
    /// Weekly files absent locally, one entry per local name
    pub to_fetch: Vec<FetchAction>,

    /// Local names of weekly files that need nothing
    pub present: Vec<String>,
}

/// Collect renames for every legacy-format file whose name actually changes.
pub fn plan_renames(files: &[RemoteFile]) -> Vec<RenameAction> {
    files
        .iter()
        .filter(|f| classify(&f.name) == FilenameFormat::Legacy)
        .filter_map(|f| {
            let to = legacy_to_current(&f.name);
            (to != f.name).then(|| RenameAction {
                file_id: f.id.clone(),
                from: f.name.clone(),
                to,
            })
        })
        .collect()
}

/// Apply renames to a listing in memory.
///
/// Used when renames were only reported, so the diff still sees the names the
/// folder would have.
pub fn project_renames(files: &mut [RemoteFile], renames: &[RenameAction]) {
    for file in files.iter_mut() {
        if let Some(rename) = renames.iter().find(|r| r.file_id == file.id) {
            file.name = rename.to.clone();
        }
    }
}

/// Diff the remote weekly files for `day` against the local names.
///
/// Only current-format names take part. The local name is rebuilt from the
/// parsed parts, so only the day token directly before the kind is dropped.
pub fn plan_fetches(files: &[RemoteFile], local: &HashSet<String>, day: DaySelector) -> FetchPlan {
    let mut plan = FetchPlan::default();
    let mut planned: HashSet<String> = HashSet::new();

    for file in files {
        let Some(parsed) = parse_current(&file.name) else {
            continue;
        };
        if parsed.day != day.token() {
            continue;
        }

        let local_name = parsed.local_name();
        if local.contains(&local_name) || planned.contains(&local_name) {
            plan.present.push(local_name);
            continue;
        }

        planned.insert(local_name.clone());
        plan.to_fetch.push(FetchAction {
            file_id: file.id.clone(),
            remote_name: file.name.clone(),
            local_name,
        });
    }

    plan
}

/// Names of all files under `dir`, recursively. A missing directory is empty.
pub async fn scan_local_files(dir: &Path) -> HashSet<String> {
    let mut files = HashSet::new();

    if fs::metadata(dir).await.is_err() {
        return files;
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.insert(name.to_string());
        }
    }

    files
}
