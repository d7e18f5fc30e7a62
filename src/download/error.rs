use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("No archive credentials found (set CDSAPI_URL and CDSAPI_KEY, or write ~/.cdsapirc)")]
    MissingCredentials,

    #[error("Malformed credentials in '{0}': expected 'url:' and 'key:' lines")]
    MalformedCredentials(PathBuf),

    #[error("Malformed API key: expected '<uid>:<secret>'")]
    MalformedKey,

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Archive task {request_id} failed: {reason}")]
    TaskFailed { request_id: String, reason: String },

    #[error("Unexpected reply from the archive: {0}")]
    UnexpectedReply(String),

    #[error("Data download failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Failed to move downloaded file into place at '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Final year {0} is outside the archive's 1979..=2019 index window")]
    FinalYearOutOfRange(i32),
}
