//! Rewrites the application start command so the Sealights agent wraps the application.
use std::path::PathBuf;
use thiserror::Error;

pub mod builder;
pub mod env_script;
pub mod launch;

pub use builder::CommandLineBuilder;

#[derive(Debug, Error)]
pub enum CommandBuildError {
    #[error("launch marker `{marker}` not found in start command `{command}`")]
    LaunchMarkerNotFound { marker: String, command: String },
    #[error("nothing to launch after `{0}`")]
    EmptyPayload(String),
    #[error("writing environment script `{path}`: {err}")]
    EnvScript { path: String, err: std::io::Error },
}

/// Operating system the application is launched on. It drives path separators, shell syntax
/// and binary names in the generated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Linux,
    Windows,
}

impl TargetOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Joins `name` to a directory expressed as it will be seen at launch time.
    pub fn join(&self, dir: &str, name: &str) -> String {
        let separator = match self {
            Self::Linux => '/',
            Self::Windows => '\\',
        };
        format!("{}{separator}{name}", dir.trim_end_matches(separator))
    }

    /// Shell variable expanding to the current directory at launch time.
    pub fn current_dir_variable(&self) -> &'static str {
        match self {
            Self::Linux => "${PWD}",
            Self::Windows => "%cd%",
        }
    }

    /// Wraps `value` in double quotes so the launching shell passes it as a single argument.
    /// Variable references such as `${PORT}` are left expandable.
    pub fn quote(&self, value: &str) -> String {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for c in value.chars() {
            let escaped = match self {
                Self::Linux => matches!(c, '"' | '\\' | '`'),
                Self::Windows => c == '"',
            };
            if escaped {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    }

    pub fn agent_executable(&self) -> &'static str {
        match self {
            Self::Linux => "SL.DotNet",
            Self::Windows => "SL.DotNet.exe",
        }
    }

    pub fn dotnet_executable(&self) -> &'static str {
        match self {
            Self::Linux => "dotnet",
            Self::Windows => "dotnet.exe",
        }
    }
}

/// Locations of the agent and the .NET runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPaths {
    /// Directory the agent package was extracted into while staging.
    pub install_dir: PathBuf,
    /// The same directory as referenced from the start command when the application launches.
    pub agent_dir: String,
    /// Directory holding the `dotnet` binary when the application launches.
    pub runtime_dir: String,
}
