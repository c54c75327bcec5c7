use super::CommandBuildError;

/// Keyword after which the original start command launches the application.
pub const LAUNCH_MARKER: &str = "exec ";

/// A start command split at the launch marker.
///
/// `prefix` holds the environment setup (directory changes, chained commands) up to and including
/// the marker and is never modified. `payload` is the application invocation to be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchCommand<'a> {
    pub prefix: &'a str,
    pub payload: &'a str,
}

impl<'a> LaunchCommand<'a> {
    /// Splits `command` at the first occurrence of [LAUNCH_MARKER]. A command without the marker,
    /// or with nothing after it, cannot be wrapped safely and is rejected.
    pub fn split(command: &'a str) -> Result<Self, CommandBuildError> {
        let index = command
            .find(LAUNCH_MARKER)
            .ok_or_else(|| CommandBuildError::LaunchMarkerNotFound {
                marker: LAUNCH_MARKER.to_string(),
                command: command.to_string(),
            })?;
        let (prefix, payload) = command.split_at(index + LAUNCH_MARKER.len());
        if payload.trim().is_empty() {
            return Err(CommandBuildError::EmptyPayload(prefix.to_string()));
        }
        Ok(Self { prefix, payload })
    }
}
