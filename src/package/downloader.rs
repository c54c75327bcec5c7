use crate::http::config::HttpConfig;
use crate::http::reqwest::{try_build_reqwest_client, ReqwestBuildError};
use reqwest::blocking::Client;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not download: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(String),
    #[error("writing package archive `{path}`: {err}")]
    Io { path: String, err: std::io::Error },
    #[error("{0}")]
    Client(#[from] ReqwestBuildError),
}

/// An interface for fetching the agent package archive into a local file.
pub trait AgentDownloader {
    /// Downloads `url` into `destination`. The destination is created from scratch on every call.
    fn download(&self, url: &Url, destination: &Path) -> Result<(), DownloadError>;
}

/// Downloads the package with a blocking HTTP GET.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn try_new(config: HttpConfig) -> Result<Self, DownloadError> {
        Ok(Self {
            client: try_build_reqwest_client(config)?,
        })
    }
}

impl AgentDownloader for HttpDownloader {
    fn download(&self, url: &Url, destination: &Path) -> Result<(), DownloadError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| DownloadError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        let io_error = |err| DownloadError::Io {
            path: destination.to_string_lossy().into(),
            err,
        };
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut file = File::create(destination).map_err(io_error)?;
        let written = response
            .copy_to(&mut file)
            .map_err(|err| DownloadError::Request(err.to_string()))?;
        file.sync_all().map_err(io_error)?;

        debug!("Package archive written to {} ({written} bytes)", destination.display());
        Ok(())
    }
}
