//! Start command representations supported by the hook and the logic to find and rewrite them.
//!
//! Exactly one representation is used per staging run, selected by [locator::StartCommandLocator]
//! and written back through [writer::persist].
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use thiserror::Error;

pub mod locator;
pub mod manifest;
pub mod procfile;
pub mod release;
pub mod writer;

use manifest::Manifest;
use procfile::{Procfile, WEB_ROLE};
use release::ReleaseDescriptor;

#[derive(Debug, Error)]
pub enum StartCommandError {
    #[error("no supported start command format detected in `{0}`")]
    NotDetected(String),
    #[error("reading `{path}`: {err}")]
    Read { path: String, err: std::io::Error },
    #[error("writing `{path}`: {err}")]
    Write { path: String, err: std::io::Error },
    #[error("invalid start command definition: {0}")]
    Parse(String),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("start command not found: {0}")]
    MissingCommand(String),
}

/// The start command source detected for the application.
pub enum StartCommand<R> {
    Procfile { path: PathBuf, procfile: Procfile },
    Manifest { path: PathBuf, manifest: Manifest },
    Release(R),
}

/// Release descriptors are opaque accessors, so only the variant is shown for them.
impl<R> Debug for StartCommand<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procfile { path, procfile } => f
                .debug_struct("Procfile")
                .field("path", path)
                .field("procfile", procfile)
                .finish(),
            Self::Manifest { path, manifest } => f
                .debug_struct("Manifest")
                .field("path", path)
                .field("manifest", manifest)
                .finish(),
            Self::Release(_) => f.write_str("Release(..)"),
        }
    }
}

impl<R: ReleaseDescriptor> StartCommand<R> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Procfile { .. } => "Procfile",
            Self::Manifest { .. } => "manifest",
            Self::Release(_) => "release descriptor",
        }
    }

    /// The current start command of the application.
    pub fn command(&self) -> Result<String, StartCommandError> {
        match self {
            Self::Procfile { procfile, .. } => {
                procfile.command(WEB_ROLE).map(String::from).ok_or_else(|| {
                    StartCommandError::MissingCommand(format!("Procfile role `{WEB_ROLE}`"))
                })
            }
            Self::Manifest { manifest, .. } => manifest.command().map(String::from),
            Self::Release(release) => release.start_command(),
        }
    }
}
