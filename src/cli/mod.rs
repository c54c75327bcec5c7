use std::path::PathBuf;

use clap::Parser;
use tracing::metadata::LevelFilter;

use crate::hook::StagingPaths;
use crate::start_command::release::{ReleaseFile, DEFAULT_RELEASE_FILE};
use crate::utils::retry::RetryPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Application root holding the compiled application.
    #[arg(long, env = "BUILD_DIR")]
    build_dir: PathBuf,

    /// Root of the dependency slots of the staging host.
    #[arg(long, env = "DEPS_DIR")]
    deps_dir: PathBuf,

    /// Dependency slot assigned to the buildpack.
    #[arg(long, env = "DEPS_IDX", default_value_t = String::from("0"))]
    deps_idx: String,

    /// Release step file used when the application has no Procfile nor manifest.
    #[arg(long, env = "SEALIGHTS_RELEASE_FILE", default_value = DEFAULT_RELEASE_FILE)]
    release_file: PathBuf,

    /// Attempts made to download the agent package.
    #[arg(long, env = "SEALIGHTS_MAX_DOWNLOAD_RETRIES", default_value_t = 3)]
    max_download_retries: usize,

    #[arg(long)]
    verbose: bool,
}

impl Cli {
    /// Parses command line arguments
    pub fn init_hook_cli() -> Self {
        Self::parse()
    }

    pub fn staging_paths(&self) -> StagingPaths {
        StagingPaths {
            build_dir: self.build_dir.clone(),
            deps_dir: self.deps_dir.clone(),
            deps_idx: self.deps_idx.clone(),
        }
    }

    pub fn release_file(&self) -> ReleaseFile {
        ReleaseFile::new(self.release_file.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_max_attempts(self.max_download_retries)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}
