use super::StartCommandError;
use serde_yaml::{Mapping, Value};

/// Process role rewritten to launch the agent.
pub const WEB_ROLE: &str = "web";

/// In-memory form of a `Procfile`: a YAML mapping from process role to command, in file order.
/// Comments and quoting are handled by the YAML parser, so values are the plain commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Procfile {
    processes: Mapping,
}

impl Procfile {
    /// Parses the Procfile content. An empty file has no roles; anything other than a mapping
    /// of roles is rejected.
    pub fn parse(content: &str) -> Result<Self, StartCommandError> {
        let processes = match serde_yaml::from_str(content)? {
            Value::Mapping(processes) => processes,
            Value::Null => Mapping::new(),
            _ => {
                return Err(StartCommandError::Parse(
                    "Procfile is not a mapping of process roles".to_string(),
                ))
            }
        };
        Ok(Self { processes })
    }

    /// Command of `role`. Roles whose value is not a string have no usable command.
    pub fn command(&self, role: &str) -> Option<&str> {
        self.processes.get(role).and_then(Value::as_str)
    }

    /// Replaces the command of an existing role, keeping its position.
    pub fn set_command(&mut self, role: &str, command: String) -> Result<(), StartCommandError> {
        let current = self
            .processes
            .get_mut(role)
            .ok_or_else(|| StartCommandError::MissingCommand(format!("Procfile role `{role}`")))?;
        *current = Value::from(command);
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, StartCommandError> {
        Ok(serde_yaml::to_string(&self.processes)?)
    }
}
