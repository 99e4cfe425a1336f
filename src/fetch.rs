use std::path::Path;

use log::info;
use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::error::{Error, NetworkError, NetworkErrorKind};

/// [Fetcher] retrieves one remote file into a local path.
/// Failures are returned to the caller, which decides what to do next.
pub trait Fetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), Error>;
}

/// HTTP(s) [Fetcher]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a new [HttpFetcher], each request being bounded by `timeout`
    pub fn new(timeout: std::time::Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;

        Ok(Self { client })
    }
}

fn classify(e: &reqwest::Error) -> NetworkErrorKind {
    if e.is_timeout() {
        NetworkErrorKind::Timeout
    } else if e.is_connect() {
        NetworkErrorKind::Connection
    } else if let Some(status) = e.status() {
        NetworkErrorKind::HttpStatus(status.as_u16())
    } else {
        NetworkErrorKind::Request
    }
}

fn network_error(url: &str, e: &reqwest::Error) -> Error {
    Error::Network(NetworkError {
        url: url.to_string(),
        kind: classify(e),
        details: e.to_string(),
    })
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), Error> {
        info!("Attempting to download: {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Network(NetworkError {
                url: url.to_string(),
                kind: NetworkErrorKind::HttpStatus(status.as_u16()),
                details: status.canonical_reason().unwrap_or_default().to_string(),
            }));
        }

        let mut fd = File::create(destination)
            .await
            .map_err(|e| Error::file_access(destination, e))?;

        while let Some(chunk) = response.chunk().await.map_err(|e| network_error(url, &e))? {
            fd.write_all(&chunk)
                .await
                .map_err(|e| Error::file_access(destination, e))?;
        }

        fd.flush()
            .await
            .map_err(|e| Error::file_access(destination, e))?;

        info!("Successfully downloaded to: {}", destination.display());
        Ok(())
    }
}
