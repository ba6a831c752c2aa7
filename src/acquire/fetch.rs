use super::{AcquireError, DocumentFetcher};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Timeout for fetching a document once its URL is known
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain HTTP GET of the document URL.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquireError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AcquireError::Fetch(format!("{url}: {e}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AcquireError::Fetch(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}
