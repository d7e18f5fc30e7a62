//! Client for the archive's retrieve API: submit a request, poll the task
//! until it completes, then stream the resulting NetCDF file to disk.

use crate::download::error::DownloadError;
use crate::download::request::CdsRequest;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const RC_FILE_NAME: &str = ".cdsapirc";
const URL_ENV: &str = "CDSAPI_URL";
const KEY_ENV: &str = "CDSAPI_KEY";

/// Archive endpoint and credentials.
///
/// The key is the archive's `<uid>:<secret>` pair, sent as HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsConfig {
    pub url: String,
    pub key: String,
}

impl CdsConfig {
    /// Reads credentials from `CDSAPI_URL`/`CDSAPI_KEY`, falling back to the
    /// `~/.cdsapirc` file the archive's own tooling writes.
    pub fn from_env() -> Result<CdsConfig, DownloadError> {
        if let (Ok(url), Ok(key)) = (std::env::var(URL_ENV), std::env::var(KEY_ENV)) {
            if !url.trim().is_empty() && !key.trim().is_empty() {
                return Ok(CdsConfig {
                    url: url.trim().to_string(),
                    key: key.trim().to_string(),
                });
            }
        }

        let rc_path = dirs::home_dir()
            .map(|home| home.join(RC_FILE_NAME))
            .ok_or(DownloadError::MissingCredentials)?;
        let contents =
            std::fs::read_to_string(&rc_path).map_err(|_| DownloadError::MissingCredentials)?;
        Self::from_rc_contents(&contents).ok_or(DownloadError::MalformedCredentials(rc_path))
    }

    /// Parses the `url:` and `key:` lines of a credentials file.
    fn from_rc_contents(contents: &str) -> Option<CdsConfig> {
        let mut url = None;
        let mut key = None;
        for line in contents.lines() {
            if let Some((name, value)) = line.split_once(':') {
                match name.trim() {
                    "url" => url = Some(line[name.len() + 1..].trim().to_string()),
                    "key" => key = Some(line[name.len() + 1..].trim().to_string()),
                    _ => {}
                }
            }
        }
        match (url, key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some(CdsConfig { url, key })
            }
            _ => None,
        }
    }

    fn split_key(&self) -> Result<(&str, &str), DownloadError> {
        self.key.split_once(':').ok_or(DownloadError::MalformedKey)
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// One retrieve task as the archive reports it. Polled replies may omit the
/// request id, so the client carries it forward itself.
#[derive(Debug, Deserialize)]
struct TaskReply {
    state: String,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    error: Option<TaskError>,
}

#[derive(Debug, Deserialize)]
struct TaskError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl TaskReply {
    fn failure_reason(&self) -> String {
        self.error
            .as_ref()
            .and_then(|e| e.reason.clone().or_else(|| e.message.clone()))
            .unwrap_or_else(|| "no reason given".to_string())
    }
}

pub struct CdsClient {
    http: Client,
    config: CdsConfig,
}

impl CdsClient {
    pub fn new(config: CdsConfig) -> CdsClient {
        CdsClient {
            http: Client::new(),
            config,
        }
    }

    /// Submits a retrieve request against `dataset`, waits for the archive to
    /// finish preparing it, and streams the result to `target`. The file is
    /// staged in a sibling temp file and only moved into place once complete,
    /// so a failed download never leaves a partial `target` behind.
    pub async fn retrieve(
        &self,
        dataset: &str,
        request: &CdsRequest,
        target: &Path,
    ) -> Result<(), DownloadError> {
        let submit_url = format!("{}/resources/{}", self.config.base(), dataset);
        info!("Submitting retrieve request to {}", submit_url);

        let reply = self.submit(&submit_url, request).await?;
        let reply = self.wait_until_complete(reply).await?;
        let location = reply.location.ok_or_else(|| {
            DownloadError::UnexpectedReply("completed task without a download location".to_string())
        })?;

        self.fetch_to_file(&location, target).await
    }

    async fn submit(
        &self,
        url: &str,
        request: &CdsRequest,
    ) -> Result<TaskReply, DownloadError> {
        let (uid, secret) = self.config.split_key()?;
        let response = self
            .http
            .post(url)
            .basic_auth(uid, Some(secret))
            .json(request)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;
        let response = Self::check_status(url, response)?;
        response
            .json::<TaskReply>()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))
    }

    async fn poll(&self, request_id: &str) -> Result<TaskReply, DownloadError> {
        let url = format!("{}/tasks/{}", self.config.base(), request_id);
        let (uid, secret) = self.config.split_key()?;
        let response = self
            .http
            .get(&url)
            .basic_auth(uid, Some(secret))
            .send()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.clone(), e))?;
        let response = Self::check_status(&url, response)?;
        response
            .json::<TaskReply>()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url, e))
    }

    async fn wait_until_complete(&self, mut reply: TaskReply) -> Result<TaskReply, DownloadError> {
        loop {
            match reply.state.as_str() {
                "completed" => return Ok(reply),
                "failed" => {
                    let request_id = reply.request_id.clone().unwrap_or_default();
                    let reason = reply.failure_reason();
                    warn!("Archive task {} failed: {}", request_id, reason);
                    return Err(DownloadError::TaskFailed { request_id, reason });
                }
                "queued" | "running" => {
                    let request_id = reply.request_id.clone().ok_or_else(|| {
                        DownloadError::UnexpectedReply(
                            "pending task without a request id".to_string(),
                        )
                    })?;
                    tokio::time::sleep(POLL_INTERVAL).await;
                    reply = self.poll(&request_id).await?;
                    reply.request_id.get_or_insert(request_id);
                }
                other => {
                    return Err(DownloadError::UnexpectedReply(format!(
                        "unknown task state '{other}'"
                    )))
                }
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, target: &Path) -> Result<(), DownloadError> {
        info!("Downloading prepared file from {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;
        let response = Self::check_status(url, response)?;

        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);

        let staging_dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let temp = NamedTempFile::new_in(&staging_dir)?;
        let mut file = tokio::fs::File::create(temp.path()).await?;

        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;
        drop(file);

        temp.persist(target)
            .map_err(|e| DownloadError::Persist(target.to_path_buf(), e.error))?;
        info!("Downloaded {} bytes to {:?}", written, target);
        Ok(())
    }

    fn check_status(
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DownloadError> {
        match response.error_for_status() {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                Err(if let Some(status) = e.status() {
                    DownloadError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    DownloadError::NetworkRequest(url.to_string(), e)
                })
            }
        }
    }
}
