pub mod acquire;
pub mod config;
pub mod drive;
pub mod filename;
pub mod reconciliation;
pub mod utils;

// Re-export commonly used types
pub use acquire::{Acquired, AcquireError, Acquirer, PrintSession, SessionLauncher};
pub use config::{AcquireConfig, ConfigError, DriveTarget, SideEffects, SyncConfig};
pub use drive::{DriveError, GoogleDrive, MemoryStore, RemoteFile, RemoteStore};
pub use filename::{
    classify, current_name, legacy_to_current, parse_current, ArtifactKind, DaySelector,
    FilenameFormat,
};
pub use reconciliation::{reconcile, ReconcileError, ReconcileOptions, SyncStats};
