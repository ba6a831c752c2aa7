//! Print sessions backed by a local Chrome/Chromium via chromiumoxide.

use super::{poll_until, AcquireError, PrintSession, SessionLauncher, WaitPolicy};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

const BLANK_URL: &str = "about:blank";

/// Clicks the button enclosing the print icon. Yields `true` once clicked.
const CLICK_PRINT_JS: &str = r#"(() => {
    const icon = document.querySelector('.fa-print');
    const button = icon && icon.closest('button');
    if (!button) return false;
    button.click();
    return true;
})()"#;

/// Ticks "Solution without clues". Yields `null` while the label is absent.
const SELECT_SOLUTION_JS: &str = r#"(() => {
    const labels = Array.from(document.querySelectorAll('label'));
    const label = labels.find(l => l.textContent.includes('Solution without clues'));
    if (!label) return null;
    const input = label.parentElement &&
        label.parentElement.querySelector('input[type=checkbox], input[type=radio]');
    if (!input) return 'missing';
    if (input.checked) return 'selected';
    input.click();
    return 'clicked';
})()"#;

const CLICK_PRIMARY_JS: &str = r#"(() => {
    const button = document.querySelector('.btn-primary');
    if (!button) return false;
    button.click();
    return true;
})()"#;

/// Find a Chrome or Chromium binary.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches a fresh incognito browser per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    pub chrome: Option<PathBuf>,
    pub headless: bool,
}

impl ChromiumLauncher {
    pub fn new(chrome: Option<PathBuf>, headless: bool) -> Self {
        Self { chrome, headless }
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn PrintSession>, AcquireError> {
        let mut builder = BrowserConfig::builder()
            .arg("--incognito")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--start-maximized")
            .arg("--disable-dev-shm-usage");

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = self.chrome.clone().or_else(find_chrome) {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(AcquireError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AcquireError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler,
            page: None,
            known_targets: HashSet::new(),
        }))
    }
}

/// A single browser with one page on the crossword host.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    /// Page targets that existed before the print was confirmed
    known_targets: HashSet<String>,
}

impl ChromiumSession {
    fn page(&self) -> Result<Page, AcquireError> {
        self.page
            .clone()
            .ok_or_else(|| AcquireError::Browser("page not opened".to_string()))
    }

    async fn page_targets(&mut self) -> Result<Vec<(String, String)>, AcquireError> {
        let targets = self
            .browser
            .fetch_targets()
            .await
            .map_err(|e| AcquireError::Browser(e.to_string()))?;

        Ok(targets
            .into_iter()
            .filter(|t| t.r#type == "page")
            .map(|t| (t.target_id.inner().clone(), t.url))
            .collect())
    }
}

async fn eval(page: &Page, script: &str) -> Result<serde_json::Value, AcquireError> {
    page.evaluate(script)
        .await
        .map_err(|e| AcquireError::Browser(e.to_string()))?
        .into_value()
        .map_err(|e| AcquireError::Browser(format!("unexpected script result: {e:?}")))
}

/// Run a click script until it reports success.
async fn click_until(page: Page, script: &str, what: &str, wait: WaitPolicy) -> Result<(), AcquireError> {
    poll_until(wait, what, || {
        let page = page.clone();
        async move {
            let clicked = eval(&page, script).await?.as_bool().unwrap_or(false);
            Ok(clicked.then_some(()))
        }
    })
    .await
}

#[async_trait]
impl PrintSession for ChromiumSession {
    async fn open(&mut self, url: &str) -> Result<(), AcquireError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| AcquireError::Browser(e.to_string()))?;
        self.page = Some(page);
        Ok(())
    }

    async fn click_print(&mut self, wait: WaitPolicy) -> Result<(), AcquireError> {
        click_until(self.page()?, CLICK_PRINT_JS, "print button", wait).await
    }

    async fn select_solution_only(&mut self, wait: WaitPolicy) -> Result<bool, AcquireError> {
        let page = self.page()?;
        let state = poll_until(wait, "solution option", || {
            let page = page.clone();
            async move {
                let value = eval(&page, SELECT_SOLUTION_JS).await?;
                Ok(value.as_str().map(str::to_string))
            }
        })
        .await?;

        match state.as_str() {
            "clicked" => Ok(true),
            "selected" => Ok(false),
            _ => Err(AcquireError::ElementMissing(
                "solution option input".to_string(),
            )),
        }
    }

    async fn confirm_print(&mut self, wait: WaitPolicy) -> Result<(), AcquireError> {
        self.known_targets = self
            .page_targets()
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        click_until(self.page()?, CLICK_PRIMARY_JS, "primary print button", wait).await
    }

    async fn document_url(&mut self, wait: WaitPolicy) -> Result<String, AcquireError> {
        let deadline = Instant::now() + wait.timeout;
        let mut saw_new_tab = false;

        loop {
            let targets = self.page_targets().await?;
            let fresh: Vec<String> = targets
                .into_iter()
                .filter(|(id, _)| !self.known_targets.contains(id))
                .map(|(_, url)| url)
                .collect();
            saw_new_tab |= !fresh.is_empty();

            if let Some(url) = fresh.into_iter().find(|u| !u.is_empty() && u != BLANK_URL) {
                debug!(url = %url, "Document tab opened");
                return Ok(url);
            }

            if Instant::now() >= deadline {
                if !saw_new_tab {
                    return Err(AcquireError::NoNewContext(wait.timeout));
                }
                return Err(AcquireError::Timeout {
                    what: "document URL".to_string(),
                    timeout: wait.timeout,
                });
            }
            sleep(wait.poll).await;
        }
    }

    async fn close(mut self: Box<Self>) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "Browser did not close cleanly");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}
