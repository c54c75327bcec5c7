use super::manifest::Manifest;
use super::procfile::Procfile;
use super::release::ReleaseDescriptor;
use super::{StartCommand, StartCommandError};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const PROCFILE_NAME: &str = "Procfile";
pub const MANIFEST_NAME: &str = "manifest.yml";

/// Detects which start command representation the application uses.
///
/// Sources are probed in a fixed order: `Procfile`, `manifest.yml` and finally the platform
/// release descriptor, which is usually synthesized by the buildpack when neither file exists.
pub struct StartCommandLocator<R> {
    build_dir: PathBuf,
    release: R,
}

impl<R: ReleaseDescriptor> StartCommandLocator<R> {
    pub fn new(build_dir: PathBuf, release: R) -> Self {
        Self { build_dir, release }
    }

    pub fn locate(self) -> Result<StartCommand<R>, StartCommandError> {
        let procfile_path = self.build_dir.join(PROCFILE_NAME);
        if procfile_path.is_file() {
            debug!("Sealights. Using {}", procfile_path.display());
            let procfile = Procfile::parse(&read(&procfile_path)?)
                .inspect_err(|err| log_parse_error(&procfile_path, err))?;
            return Ok(StartCommand::Procfile {
                path: procfile_path,
                procfile,
            });
        }

        let manifest_path = self.build_dir.join(MANIFEST_NAME);
        if manifest_path.is_file() {
            debug!("Sealights. Using {}", manifest_path.display());
            let manifest = Manifest::parse(&read(&manifest_path)?)
                .inspect_err(|err| log_parse_error(&manifest_path, err))?;
            return Ok(StartCommand::Manifest {
                path: manifest_path,
                manifest,
            });
        }

        if self.release.is_available() {
            debug!("Sealights. Using release descriptor");
            return Ok(StartCommand::Release(self.release));
        }

        Err(StartCommandError::NotDetected(self.build_dir.to_string_lossy().into()))
    }
}

fn read(path: &Path) -> Result<String, StartCommandError> {
    std::fs::read_to_string(path).map_err(|err| {
        error!("Sealights. Failed to read {}: {err}", path.display());
        StartCommandError::Read {
            path: path.to_string_lossy().into(),
            err,
        }
    })
}

fn log_parse_error(path: &Path, err: &StartCommandError) {
    error!("Sealights. Failed to parse {}: {err}", path.display());
}
