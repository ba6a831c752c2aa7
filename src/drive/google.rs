//! Google Drive v3 over REST, authenticated with a service account.

use super::{DriveError, RemoteFile, RemoteStore};
use crate::config::DriveTarget;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// OAuth scope requested for the service account
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const LIST_FIELDS: &str = "nextPageToken, files(id, name, modifiedTime)";
const PAGE_SIZE: &str = "1000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URLs for the metadata and upload APIs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub api: String,
    pub upload: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: "https://www.googleapis.com/drive/v3".to_string(),
            upload: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

impl Endpoints {
    /// Both APIs served from one base, as a mock server does.
    pub fn at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api: format!("{base}/drive/v3"),
            upload: format!("{base}/upload/drive/v3"),
        }
    }
}

/// The subset of a service account key file we need.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Drive client bound to one folder.
pub struct GoogleDrive {
    client: Client,
    endpoints: Endpoints,
    access_token: String,
    folder_id: String,
}

impl GoogleDrive {
    /// Authenticate against the production endpoints.
    pub async fn connect(target: &DriveTarget) -> Result<Self, DriveError> {
        Self::connect_with(target, Endpoints::default()).await
    }

    /// Authenticate and bind to `target.folder_id`.
    ///
    /// Any failure here (unreadable key, bad key, rejected assertion) is an
    /// [`DriveError::AuthError`].
    pub async fn connect_with(target: &DriveTarget, endpoints: Endpoints) -> Result<Self, DriveError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let raw = fs::read_to_string(&target.credentials)
            .await
            .map_err(|e| DriveError::AuthError(format!("cannot read service account file: {e}")))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| DriveError::AuthError(format!("malformed service account file: {e}")))?;

        let access_token = request_token(&client, &key).await?;
        info!(account = %key.client_email, "Authenticated with Google Drive");

        Ok(Self {
            client,
            endpoints,
            access_token,
            folder_id: target.folder_id.clone(),
        })
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    async fn list_query(&self, query: &str) -> Result<Vec<RemoteFile>, DriveError> {
        let url = format!("{}/files", self.endpoints.api);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query.to_string()),
                ("fields", LIST_FIELDS.to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await?;
            let page: FileList = check(response).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl RemoteStore for GoogleDrive {
    async fn list(&self) -> Result<Vec<RemoteFile>, DriveError> {
        let query = format!("'{}' in parents and trashed = false", escape_query(&self.folder_id));
        self.list_query(&query).await
    }

    async fn rename(&self, file_id: &str, new_name: &str) -> Result<RemoteFile, DriveError> {
        let url = format!("{}/files/{}", self.endpoints.api, file_id);
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id, name")])
            .json(&serde_json::json!({ "name": new_name }))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64, DriveError> {
        let url = format!("{}/files/{}", self.endpoints.api, file_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let mut response = check(response).await?;

        let total = response.content_length();
        let mut file = fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(total) = total.filter(|t| *t > 0) {
                debug!(
                    file = %dest.display(),
                    progress = written * 100 / total,
                    "Downloading"
                );
            }
        }
        file.flush().await?;

        Ok(written)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RemoteFile>, DriveError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query(name),
            escape_query(&self.folder_id)
        );
        Ok(self.list_query(&query).await?.into_iter().next())
    }

    async fn upload(&self, name: &str, mime_type: &str, data: Vec<u8>) -> Result<String, DriveError> {
        // Resumable upload: open a session with the metadata, then send the bytes.
        let url = format!("{}/files", self.endpoints.upload);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .header("X-Upload-Content-Type", mime_type)
            .json(&serde_json::json!({
                "name": name,
                "parents": [self.folder_id],
                "mimeType": mime_type,
            }))
            .send()
            .await?;
        let response = check(response).await?;

        let session = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| DriveError::ApiError {
                status: response.status().as_u16(),
                message: "resumable upload session has no Location header".to_string(),
            })?;

        let response = self
            .client
            .put(&session)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(data)
            .send()
            .await?;
        let created: CreatedFile = check(response).await?.json().await?;

        Ok(created.id)
    }
}

/// Exchange a signed assertion for an access token.
async fn request_token(client: &Client, key: &ServiceAccountKey) -> Result<String, DriveError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: DRIVE_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DriveError::AuthError(format!("invalid private key: {e}")))?;
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| DriveError::AuthError(format!("cannot sign assertion: {e}")))?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| DriveError::AuthError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DriveError::AuthError(format!("token endpoint returned {status}: {body}")));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| DriveError::AuthError(format!("unexpected token response: {e}")))?;
    Ok(token.access_token)
}

/// Turn a non-success response into an [`DriveError::ApiError`].
async fn check(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message,
    })
}

/// Escape a literal for use inside a single-quoted Drive query string.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
