use super::downloader::{AgentDownloader, DownloadError};
use super::extract::{extract_tar_gz, ExtractError};
use super::url::{DownloadTarget, InvalidUrlError};
use crate::config::SealightsOptions;
use crate::utils::retry::{retry, RetryPolicy, Sleeper, ThreadSleeper};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{0}")]
    InvalidUrl(#[from] InvalidUrlError),
    #[error("download attempts exceeded. Last error: {0}")]
    Download(#[source] DownloadError),
    #[error("{0}")]
    Extract(#[from] ExtractError),
}

/// Fetches the agent package and unpacks it into the installation directory.
pub struct AgentInstaller<'a, D, S = ThreadSleeper>
where
    D: AgentDownloader,
    S: Sleeper,
{
    options: &'a SealightsOptions,
    downloader: D,
    sleeper: S,
    retry_policy: RetryPolicy,
    download_dir: PathBuf,
}

impl<'a, D> AgentInstaller<'a, D>
where
    D: AgentDownloader,
{
    /// The archive is downloaded into the OS temporary directory, up to 3 attempts.
    pub fn new(options: &'a SealightsOptions, downloader: D) -> Self {
        Self {
            options,
            downloader,
            sleeper: ThreadSleeper,
            retry_policy: RetryPolicy::default(),
            download_dir: std::env::temp_dir(),
        }
    }
}

impl<'a, D, S> AgentInstaller<'a, D, S>
where
    D: AgentDownloader,
    S: Sleeper,
{
    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    pub fn with_download_dir(self, download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            ..self
        }
    }

    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> AgentInstaller<'a, D, T> {
        AgentInstaller {
            options: self.options,
            downloader: self.downloader,
            sleeper,
            retry_policy: self.retry_policy,
            download_dir: self.download_dir,
        }
    }

    /// Downloads the agent package and extracts it into `installation_path`.
    pub fn install(&self, installation_path: &Path) -> Result<(), InstallError> {
        let target = DownloadTarget::resolve(self.options, &self.download_dir)?;
        self.download_package(&target)?;

        extract_tar_gz(&target.archive_path, installation_path).inspect_err(|_| {
            error!("Sealights. Failed to extract package.");
        })?;

        info!("Sealights. Package installed.");
        Ok(())
    }

    fn download_package(&self, target: &DownloadTarget) -> Result<(), InstallError> {
        info!("Sealights. Download package started. From '{target}'");

        retry(&self.retry_policy, &self.sleeper, || {
            self.downloader.download(&target.url, &target.archive_path)
        })
        .map_err(|err| {
            error!("Sealights. Failed to download package.");
            InstallError::Download(err)
        })?;

        info!("Sealights. Download finished.");
        Ok(())
    }
}
