use super::options::{AgentArgs, SealightsOptions};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Environment variable holding the service bindings document.
pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";
/// Case-insensitive token identifying the Sealights binding by name.
pub const SERVICE_NAME_MARKER: &str = "sealights";

/// A single service binding. Unnamed bindings are kept so they don't invalidate the document.
#[derive(Debug, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credentials: Option<Map<String, Value>>,
}

/// Binding groups keyed by service label. A `BTreeMap` makes the scan order deterministic:
/// groups are visited by name, bindings in document order.
pub type ServiceBindings = BTreeMap<String, Vec<ServiceBinding>>;

/// Builds [SealightsOptions] out of the service bindings exposed to the staging process.
///
/// Absence of configuration is an expected outcome: every problem found here (missing or
/// malformed document, no Sealights binding, missing credentials) results in `None`.
pub struct ConfigExtractor;

impl ConfigExtractor {
    /// Reads the bindings document from [VCAP_SERVICES_ENV].
    pub fn from_env() -> Option<SealightsOptions> {
        match std::env::var(VCAP_SERVICES_ENV) {
            Ok(document) => Self::extract(&document),
            Err(err) => {
                debug!("Failed to read {VCAP_SERVICES_ENV}: {err}");
                None
            }
        }
    }

    /// Parses the serialized bindings document and extracts the first Sealights binding.
    pub fn extract(document: &str) -> Option<SealightsOptions> {
        let bindings: ServiceBindings = match serde_json::from_str(document) {
            Ok(bindings) => bindings,
            Err(err) => {
                debug!("Failed to unmarshal {VCAP_SERVICES_ENV}: {err}");
                return None;
            }
        };
        Self::from_bindings(&bindings)
    }

    pub fn from_bindings(bindings: &ServiceBindings) -> Option<SealightsOptions> {
        let binding = bindings
            .values()
            .flatten()
            .find(|binding| {
                binding
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(SERVICE_NAME_MARKER))
            })?;

        let empty = Map::new();
        let credentials = Credentials(binding.credentials.as_ref().unwrap_or(&empty));
        let options = credentials.options();

        if !options.has_token() {
            warn!("Sealights access token isn't provided");
            return None;
        }
        if !options.has_build_session_id() {
            warn!("Sealights build session id isn't provided");
            return None;
        }

        Some(options)
    }
}

/// Typed accessors over the free-form credentials mapping. Wrong-typed values read as absent.
struct Credentials<'a>(&'a Map<String, Value>);

impl Credentials<'_> {
    fn options(&self) -> SealightsOptions {
        SealightsOptions {
            version: self.string("version"),
            token: self.string("token"),
            token_file: self.string("tokenFile"),
            bs_id: self.string("bsId"),
            bs_id_file: self.string("bsIdFile"),
            target: self.string("target"),
            working_dir: self.string("workingDir"),
            target_args: self.string("targetArgs"),
            profiler_log_dir: self.string("profilerLogDir"),
            profiler_log_level: self.string("profilerLogLevel"),
            custom_agent_url: self.string("customAgentUrl"),
            lab_id: self.string("labId"),
            custom_command: self.string("customCommand"),
            tags: self.string("tags"),
            tools: self.string("tools"),
            proxy: self.string("proxy"),
            proxy_username: self.string("proxyUsername"),
            proxy_password: self.string("proxyPassword"),
            log_filename: self.string("logFilename"),
            ignore_certificate_errors: self.toggle("ignoreCertificateErrors"),
            not_cli: self.toggle("notCli"),
            agent_args: self.agent_args("agentArgs"),
        }
    }

    fn string(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(value)) => value.clone(),
            _ => String::new(),
        }
    }

    fn toggle(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => value.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn agent_args(&self, key: &str) -> AgentArgs {
        let Some(Value::Object(args)) = self.0.get(key) else {
            return AgentArgs::new();
        };
        args.iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::String(value) => value.clone(),
                    Value::Number(value) => value.to_string(),
                    Value::Bool(value) => value.to_string(),
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect()
    }
}
