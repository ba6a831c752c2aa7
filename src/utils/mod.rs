use std::path::{Path, PathBuf};

/// Folder inside the mirror root that holds the weekly crosswords
pub const MIRROR_SUBDIR: &str = "nyt-crosswords";

/// Default directory for `download` output
pub const DEFAULT_SAVE_DIR: &str = "./download";

/// Suffix for files still being written
pub const PARTIAL_SUFFIX: &str = ".part";

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Path of the in-progress sibling for `path`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
