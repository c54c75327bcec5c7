//! Staging hook wiring the Sealights pipeline together.
use crate::config::{ConfigExtractor, SealightsOptions};
use crate::http::config::HttpConfig;
use crate::launcher::{AgentPaths, CommandBuildError, CommandLineBuilder, TargetOs};
use crate::package::downloader::{AgentDownloader, DownloadError, HttpDownloader};
use crate::package::installer::{AgentInstaller, InstallError};
use crate::package::url::DEFAULT_VERSION;
use crate::start_command::locator::StartCommandLocator;
use crate::start_command::release::{ReleaseDescriptor, ReleaseFile};
use crate::start_command::writer::persist;
use crate::start_command::StartCommandError;
use crate::utils::retry::RetryPolicy;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Directory the agent is installed into, relative to the dependency slot.
pub const AGENT_DIR_NAME: &str = "sealights";
/// Directory of the .NET runtime installed by the buildpack, relative to the dependency slot.
pub const RUNTIME_DIR_NAME: &str = "dotnet-sdk";
/// Variable resolving to the dependencies root when the application starts.
const DEPS_DIR_VARIABLE: &str = "${DEPS_DIR}";

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Download(#[from] DownloadError),
    #[error("{0}")]
    Install(#[from] InstallError),
    #[error("{0}")]
    StartCommand(#[from] StartCommandError),
    #[error("{0}")]
    CommandBuild(#[from] CommandBuildError),
}

/// Locations provided by the staging host.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingPaths {
    /// Application root holding `Procfile` or `manifest.yml`.
    pub build_dir: PathBuf,
    pub deps_dir: PathBuf,
    pub deps_idx: String,
}

impl StagingPaths {
    pub fn install_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx).join(AGENT_DIR_NAME)
    }

    /// Agent locations as the application sees them at launch time.
    pub fn agent_paths(&self, os: TargetOs) -> AgentPaths {
        let slot = os.join(DEPS_DIR_VARIABLE, &self.deps_idx);
        AgentPaths {
            install_dir: self.install_dir(),
            agent_dir: os.join(&slot, AGENT_DIR_NAME),
            runtime_dir: os.join(&slot, RUNTIME_DIR_NAME),
        }
    }
}

/// Runs after the application has been compiled: installs the agent and makes the start command
/// launch the application through it.
pub struct SealightsHook<R = ReleaseFile> {
    options: Option<SealightsOptions>,
    release: R,
    retry_policy: RetryPolicy,
    download_dir: PathBuf,
    target_os: TargetOs,
}

impl SealightsHook<ReleaseFile> {
    /// Reads the configuration from the service bindings of the current process.
    pub fn from_env(release: ReleaseFile) -> Self {
        Self::new(ConfigExtractor::from_env(), release)
    }
}

impl<R: ReleaseDescriptor> SealightsHook<R> {
    /// `options` is `None` when the integration is not configured, which turns the hook into a no-op.
    pub fn new(options: Option<SealightsOptions>, release: R) -> Self {
        Self {
            options,
            release,
            retry_policy: RetryPolicy::default(),
            download_dir: std::env::temp_dir(),
            target_os: TargetOs::current(),
        }
    }

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

    pub fn with_target_os(self, target_os: TargetOs) -> Self {
        Self { target_os, ..self }
    }

    pub fn is_enabled(&self) -> bool {
        self.options.is_some()
    }

    pub fn after_compile(self, paths: &StagingPaths) -> Result<(), HookError> {
        let Some(options) = self.options.as_ref() else {
            debug!("Sealights service isn't configured");
            return Ok(());
        };
        let downloader = HttpDownloader::try_new(HttpConfig::from_options(options))?;
        self.provision(paths, downloader)
    }

    fn provision<D: AgentDownloader>(
        self,
        paths: &StagingPaths,
        downloader: D,
    ) -> Result<(), HookError> {
        let Some(options) = self.options else {
            return Ok(());
        };
        info!("Sealights. Service is enabled");

        AgentInstaller::new(&options, downloader)
            .with_retry_policy(self.retry_policy)
            .with_download_dir(self.download_dir)
            .install(&paths.install_dir())?;

        let mut start_command =
            StartCommandLocator::new(paths.build_dir.clone(), self.release).locate()?;
        let original_command = start_command.command()?;

        let agent_paths = paths.agent_paths(self.target_os);
        let new_command = CommandLineBuilder::new(&options, &agent_paths)
            .with_target_os(self.target_os)
            .build(&original_command)?;

        persist(&mut start_command, &new_command)?;

        let version = if options.version.is_empty() {
            DEFAULT_VERSION
        } else {
            &options.version
        };
        info!(
            "Sealights. Agent {version} configured through {}",
            start_command.kind()
        );
        Ok(())
    }
}
