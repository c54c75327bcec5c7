use std::collections::BTreeMap;

/// Extra agent flags provided through the `agentArgs` credential, keyed by flag name
/// (without the leading dashes). Ordered so the generated command line is reproducible.
pub type AgentArgs = BTreeMap<String, String>;

/// Validated Sealights configuration for a single staging run.
///
/// Values that were not provided in the service binding are empty strings, which keeps the
/// flag mapping simple: a flag is emitted only when its source value is non-empty.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SealightsOptions {
    pub version: String,
    pub token: String,
    pub token_file: String,
    pub bs_id: String,
    pub bs_id_file: String,
    pub target: String,
    pub working_dir: String,
    pub target_args: String,
    pub profiler_log_dir: String,
    pub profiler_log_level: String,
    pub custom_agent_url: String,
    pub lab_id: String,
    pub custom_command: String,
    pub tags: String,
    pub tools: String,
    pub proxy: String,
    pub proxy_username: String,
    pub proxy_password: String,
    pub log_filename: String,
    pub ignore_certificate_errors: bool,
    pub not_cli: bool,
    pub agent_args: AgentArgs,
}

impl SealightsOptions {
    /// Whether any of the access token sources is present.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty() || !self.token_file.is_empty()
    }

    /// Whether any of the build session id sources is present.
    pub fn has_build_session_id(&self) -> bool {
        !self.bs_id.is_empty() || !self.bs_id_file.is_empty()
    }

    /// Returns the extra flag value configured for `name`, if any.
    pub fn agent_arg(&self, name: &str) -> Option<&str> {
        self.agent_args.get(name).map(String::as_str)
    }

    /// Whether the given flag was set explicitly through `agentArgs`.
    pub fn overrides_flag(&self, name: &str) -> bool {
        self.agent_args.contains_key(name)
    }
}
