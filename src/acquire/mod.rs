//! Acquisition of the daily puzzle and solution documents.
//!
//! The crossword host only exposes its documents through a print dialog, so
//! each artifact is acquired by driving a browser session:
//!
//! 1. open the host page and click the print icon's button
//! 2. for the solution, tick "Solution without clues"
//! 3. click the primary print button, which opens the document in a new tab
//! 4. read that tab's URL and fetch the bytes over HTTP
//!
//! Every attempt gets a fresh session. An artifact is retried up to
//! [`MAX_ATTEMPTS`] times; a failure of one artifact does not affect the other.

mod chromium;
mod fetch;
mod publish;

pub use chromium::{find_chrome, ChromiumLauncher};
pub use fetch::HttpFetcher;
pub use publish::{save_artifacts, upload_artifacts, UploadSummary, PDF_MIME};

use crate::filename::ArtifactKind;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// Attempts per artifact
pub const MAX_ATTEMPTS: u32 = 3;

/// Pause after ticking the solution option so the dialog can update
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Page element not found: {0}")]
    ElementMissing(String),

    #[error("No new browser tab opened within {0:?}")]
    NoNewContext(Duration),

    #[error("Failed to fetch document: {0}")]
    Fetch(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Bound and poll interval for waits on page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }
}

/// Poll `check` until it yields a value or the wait runs out.
///
/// Errors from `check` end the wait immediately.
pub async fn poll_until<T, F, Fut>(wait: WaitPolicy, what: &str, mut check: F) -> Result<T, AcquireError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, AcquireError>>,
{
    let deadline = Instant::now() + wait.timeout;
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(AcquireError::Timeout {
                what: what.to_string(),
                timeout: wait.timeout,
            });
        }
        sleep(wait.poll).await;
    }
}

/// One browser session on the crossword host.
#[async_trait]
pub trait PrintSession: Send {
    /// Navigate to the host page.
    async fn open(&mut self, url: &str) -> Result<(), AcquireError>;

    /// Click the button around the print icon.
    async fn click_print(&mut self, wait: WaitPolicy) -> Result<(), AcquireError>;

    /// Make sure "Solution without clues" is selected.
    ///
    /// Returns whether the control had to be clicked.
    async fn select_solution_only(&mut self, wait: WaitPolicy) -> Result<bool, AcquireError>;

    /// Click the dialog's primary print button.
    async fn confirm_print(&mut self, wait: WaitPolicy) -> Result<(), AcquireError>;

    /// URL of the document tab opened by [`PrintSession::confirm_print`].
    async fn document_url(&mut self, wait: WaitPolicy) -> Result<String, AcquireError>;

    /// Tear the session down. Never fails.
    async fn close(self: Box<Self>);
}

/// Starts browser sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PrintSession>, AcquireError>;
}

/// Downloads a document by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquireError>;
}

/// Payloads acquired in one run
#[derive(Debug, Clone, Default)]
pub struct Acquired {
    pub puzzle: Option<Vec<u8>>,
    pub solution: Option<Vec<u8>>,
}

impl Acquired {
    pub fn get(&self, kind: ArtifactKind) -> Option<&[u8]> {
        match kind {
            ArtifactKind::Puzzle => self.puzzle.as_deref(),
            ArtifactKind::Solution => self.solution.as_deref(),
        }
    }

    fn set(&mut self, kind: ArtifactKind, data: Vec<u8>) {
        match kind {
            ArtifactKind::Puzzle => self.puzzle = Some(data),
            ArtifactKind::Solution => self.solution = Some(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.puzzle.is_none() && self.solution.is_none()
    }
}

/// Drives sessions from a launcher to acquire artifacts.
pub struct Acquirer<'a> {
    launcher: &'a dyn SessionLauncher,
    fetcher: &'a dyn DocumentFetcher,
    url: String,
    wait: WaitPolicy,
    max_attempts: u32,
    settle: Duration,
}

impl<'a> Acquirer<'a> {
    pub fn new(
        launcher: &'a dyn SessionLauncher,
        fetcher: &'a dyn DocumentFetcher,
        url: impl Into<String>,
        wait: WaitPolicy,
    ) -> Self {
        Self {
            launcher,
            fetcher,
            url: url.into(),
            wait,
            max_attempts: MAX_ATTEMPTS,
            settle: SETTLE_DELAY,
        }
    }

    /// Override the pause after ticking the solution option.
    pub fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Acquire both artifacts, each independently.
    pub async fn acquire_all(&self) -> Acquired {
        let mut acquired = Acquired::default();
        for kind in ArtifactKind::ALL {
            if let Ok(data) = self.acquire(kind).await {
                acquired.set(kind, data);
            }
        }
        acquired
    }

    /// Acquire one artifact, retrying whole attempts.
    pub async fn acquire(&self, kind: ArtifactKind) -> Result<Vec<u8>, AcquireError> {
        info!(artifact = %kind, "Downloading crossword");

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.attempt(kind).await {
                Ok(data) => {
                    info!(artifact = %kind, bytes = data.len(), attempt, "Downloaded crossword");
                    return Ok(data);
                }
                Err(e) => {
                    warn!(
                        artifact = %kind,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        error!(artifact = %kind, attempts = self.max_attempts, "Giving up");
        Err(last_error.unwrap_or_else(|| AcquireError::Browser("no attempts made".to_string())))
    }

    async fn attempt(&self, kind: ArtifactKind) -> Result<Vec<u8>, AcquireError> {
        let mut session = self.launcher.launch().await?;
        let result = self.drive_session(session.as_mut(), kind).await;
        session.close().await;

        let url = result?;
        self.fetcher.fetch(&url).await
    }

    async fn drive_session(
        &self,
        session: &mut dyn PrintSession,
        kind: ArtifactKind,
    ) -> Result<String, AcquireError> {
        session.open(&self.url).await?;
        session.click_print(self.wait).await?;

        if kind == ArtifactKind::Solution && session.select_solution_only(self.wait).await? {
            sleep(self.settle).await;
        }

        session.confirm_print(self.wait).await?;
        session.document_url(self.wait).await
    }
}
