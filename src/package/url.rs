use crate::config::SealightsOptions;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

/// File name of the downloaded archive inside the download directory.
pub const PACKAGE_ARCHIVE_NAME: &str = "sealights-agent.tar.gz";
pub const DEFAULT_LAB_ID: &str = "agents";
pub const DEFAULT_VERSION: &str = "latest";

const PACKAGE_HOST: &str = "sealights.co";
const PLATFORM_SEGMENT: &str = "dotnetcore";
const ARTIFACT_PREFIX: &str = "sealights-dotnet-agent";

#[derive(Debug, thiserror::Error)]
#[error("invalid agent download url `{url}`: {err}")]
pub struct InvalidUrlError {
    pub url: String,
    pub err: url::ParseError,
}

/// Where to fetch the agent package from and where to store the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTarget {
    pub url: Url,
    pub archive_path: PathBuf,
}

impl DownloadTarget {
    pub fn resolve(
        options: &SealightsOptions,
        download_dir: &Path,
    ) -> Result<Self, InvalidUrlError> {
        let url = package_url(options);
        let url = Url::parse(&url).map_err(|err| InvalidUrlError { url, err })?;
        Ok(Self {
            url,
            archive_path: download_dir.join(PACKAGE_ARCHIVE_NAME),
        })
    }
}

impl Display for DownloadTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

fn package_url(options: &SealightsOptions) -> String {
    if !options.custom_agent_url.is_empty() {
        return options.custom_agent_url.clone();
    }

    let lab_id = non_empty_or(&options.lab_id, DEFAULT_LAB_ID);
    let version = non_empty_or(&options.version, DEFAULT_VERSION);

    format!("https://{lab_id}.{PACKAGE_HOST}/{PLATFORM_SEGMENT}/{ARTIFACT_PREFIX}-{version}.tar.gz")
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}
