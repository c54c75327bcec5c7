use super::{CommandBuildError, TargetOs};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROFILER_ID: &str = "{01CA2C22-DC03-4FF5-8350-59E32A3536BA}";

/// Script setting up the CoreCLR profiler so the application reports to the Sealights collector
/// identified by the session key.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvScript {
    os: TargetOs,
    variables: Vec<(&'static str, String)>,
}

impl EnvScript {
    /// `agent_dir` is the agent location as seen by the application at launch time.
    pub fn new(os: TargetOs, agent_dir: &str, session_key: &str) -> Self {
        let (profiler_32, profiler_64) = match os {
            TargetOs::Linux => (
                "libSL.DotNet.ProfilerLib.Linux.so",
                "libSL.DotNet.ProfilerLib.Linux.so",
            ),
            TargetOs::Windows => (
                "SL.DotNet.ProfilerLib.Windows_x86.dll",
                "SL.DotNet.ProfilerLib.Windows_x64.dll",
            ),
        };
        let variables = vec![
            ("CORECLR_ENABLE_PROFILING", "1".to_string()),
            ("CORECLR_PROFILER", PROFILER_ID.to_string()),
            ("CORECLR_PROFILER_PATH_32", os.join(agent_dir, profiler_32)),
            ("CORECLR_PROFILER_PATH_64", os.join(agent_dir, profiler_64)),
            ("SL_CollectorId", session_key.to_string()),
        ];
        Self { os, variables }
    }

    pub fn file_name(&self) -> &'static str {
        match self.os {
            TargetOs::Linux => "sealights.envrc",
            TargetOs::Windows => "sealights.bat",
        }
    }

    pub fn content(&self) -> String {
        let keyword = match self.os {
            TargetOs::Linux => "export",
            TargetOs::Windows => "set",
        };
        self.variables
            .iter()
            .map(|(name, value)| format!("{keyword} {name}={value}\n"))
            .collect()
    }

    /// Command loading the script into the launching shell. `agent_dir` is the launch-time location
    /// of the directory the script was written to.
    pub fn source_command(&self, agent_dir: &str) -> String {
        let script = self.os.join(agent_dir, self.file_name());
        match self.os {
            TargetOs::Linux => format!(". {script}"),
            TargetOs::Windows => format!("call {script}"),
        }
    }

    /// Writes the script into `install_dir` and returns its path.
    pub fn write_to(&self, install_dir: &Path) -> Result<PathBuf, CommandBuildError> {
        let path = install_dir.join(self.file_name());
        std::fs::create_dir_all(install_dir)
            .and_then(|_| std::fs::write(&path, self.content()))
            .map_err(|err| CommandBuildError::EnvScript {
                path: path.to_string_lossy().into(),
                err,
            })?;
        debug!("Sealights. Environment script written to {}", path.display());
        Ok(path)
    }
}
