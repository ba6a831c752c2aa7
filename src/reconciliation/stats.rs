use serde::Serialize;
use std::fmt;
use tracing::info;

/// Counters for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub renamed: u32,
    pub downloaded: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl SyncStats {
    pub fn log_summary(&self) {
        info!("Files renamed: {}", self.renamed);
        info!("Files downloaded: {}", self.downloaded);
        info!("Files skipped: {}", self.skipped);
        info!("Errors encountered: {}", self.errors);
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "renamed={} downloaded={} skipped={} errors={}",
            self.renamed, self.downloaded, self.skipped, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_json() {
        let stats = SyncStats {
            renamed: 1,
            downloaded: 2,
            skipped: 3,
            errors: 0,
        };
        assert_eq!(stats.to_string(), "renamed=1 downloaded=2 skipped=3 errors=0");
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"renamed":1,"downloaded":2,"skipped":3,"errors":0}"#
        );
    }
}
