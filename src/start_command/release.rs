use super::StartCommandError;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Release step file written by the .NET Core buildpack during finalize.
pub const DEFAULT_RELEASE_FILE: &str = "/tmp/dotnet-core-buildpack-release-step.yml";

const PROCESS_TYPES_KEY: &str = "default_process_types";
const WEB_PROCESS_KEY: &str = "web";

/// Platform release descriptor exposing the effective start command of the application.
/// Values are loaded on demand, every call goes to the backing storage.
pub trait ReleaseDescriptor {
    /// Whether the descriptor exists and can be used as a start command source.
    fn is_available(&self) -> bool;
    fn start_command(&self) -> Result<String, StartCommandError>;
    fn set_start_command(&self, command: &str) -> Result<(), StartCommandError>;
}

/// [ReleaseDescriptor] backed by the release step YAML file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseFile {
    path: PathBuf,
}

impl Default for ReleaseFile {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_RELEASE_FILE))
    }
}

impl ReleaseFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Value, StartCommandError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|err| StartCommandError::Read {
                path: self.path.to_string_lossy().into(),
                err,
            })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl ReleaseDescriptor for ReleaseFile {
    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn start_command(&self) -> Result<String, StartCommandError> {
        self.load()?
            .get(PROCESS_TYPES_KEY)
            .and_then(|types| types.get(WEB_PROCESS_KEY))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                StartCommandError::MissingCommand(format!(
                    "{PROCESS_TYPES_KEY}.{WEB_PROCESS_KEY} in `{}`",
                    self.path.display()
                ))
            })
    }

    fn set_start_command(&self, command: &str) -> Result<(), StartCommandError> {
        let mut document = match self.load()? {
            Value::Null => Value::Mapping(Mapping::new()),
            document => document,
        };
        let root = document.as_mapping_mut().ok_or_else(|| {
            StartCommandError::Parse(format!("`{}` is not a YAML mapping", self.path.display()))
        })?;

        let process_types = root
            .entry(Value::from(PROCESS_TYPES_KEY))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let process_types = process_types.as_mapping_mut().ok_or_else(|| {
            StartCommandError::Parse(format!(
                "`{PROCESS_TYPES_KEY}` in `{}` is not a YAML mapping",
                self.path.display()
            ))
        })?;
        process_types.insert(Value::from(WEB_PROCESS_KEY), Value::from(command));

        let content = serde_yaml::to_string(&document)?;
        std::fs::write(&self.path, content).map_err(|err| StartCommandError::Write {
            path: self.path.to_string_lossy().into(),
            err,
        })
    }
}
