use super::procfile::WEB_ROLE;
use super::release::ReleaseDescriptor;
use super::{StartCommand, StartCommandError};
use std::path::Path;
use tracing::{error, info};

/// Stores `new_command` in the representation it was read from, leaving everything else as is.
pub fn persist<R: ReleaseDescriptor>(
    start_command: &mut StartCommand<R>,
    new_command: &str,
) -> Result<(), StartCommandError> {
    match start_command {
        StartCommand::Procfile { path, procfile } => {
            procfile.set_command(WEB_ROLE, new_command.to_string())?;
            write(path, procfile.to_yaml()?)?;
        }
        StartCommand::Manifest { path, manifest } => {
            manifest.set_command(new_command.to_string())?;
            write(path, manifest.to_yaml()?)?;
        }
        StartCommand::Release(release) => release.set_start_command(new_command)?,
    }
    info!("Sealights. Start command updated in {}", start_command.kind());
    Ok(())
}

fn write(path: &Path, content: String) -> Result<(), StartCommandError> {
    std::fs::write(path, content).map_err(|err| {
        error!("Sealights. Failed to write {}: {err}", path.display());
        StartCommandError::Write {
            path: path.to_string_lossy().into(),
            err,
        }
    })
}
