use super::env_script::EnvScript;
use super::launch::LaunchCommand;
use super::{AgentPaths, CommandBuildError, TargetOs};
use crate::config::SealightsOptions;
use tracing::{debug, info};

/// Agent mode wrapping the target process.
const AGENT_MODE: &str = "testListener";
/// Runtime interpreter recognised at the start of the launch payload.
const INTERPRETER: &str = "dotnet";
/// Keyword prepended to the target arguments.
const TEST_KEYWORD: &str = "test";
/// Extra flag enabling the profiler environment for a background collector.
pub const SESSION_KEY_FLAG: &str = "sessionKey";

const TOKEN_FLAG: &str = "token";
const TOKEN_FILE_FLAG: &str = "tokenfile";
const BUILD_SESSION_ID_FLAG: &str = "buildSessionId";
const BUILD_SESSION_ID_FILE_FLAG: &str = "buildSessionIdFile";
const WORKING_DIR_FLAG: &str = "workingDir";
const TARGET_FLAG: &str = "target";
const TARGET_ARGS_FLAG: &str = "targetArgs";

/// Builds the start command running the application through the Sealights agent.
///
/// Computed flags are skipped when the same flag is present in the `agentArgs` options, which are
/// always emitted verbatim after the computed ones, sorted by name.
pub struct CommandLineBuilder<'a> {
    options: &'a SealightsOptions,
    paths: &'a AgentPaths,
    os: TargetOs,
}

impl<'a> CommandLineBuilder<'a> {
    pub fn new(options: &'a SealightsOptions, paths: &'a AgentPaths) -> Self {
        Self {
            options,
            paths,
            os: TargetOs::current(),
        }
    }

    pub fn with_target_os(self, os: TargetOs) -> Self {
        Self { os, ..self }
    }

    /// Returns the rewritten start command. The text up to the launch marker is kept untouched.
    pub fn build(&self, original_command: &str) -> Result<String, CommandBuildError> {
        let launch = LaunchCommand::split(original_command)?;

        if !self.options.custom_command.is_empty() {
            info!("Sealights. Using custom start command");
            return Ok(format!("{}{}", launch.prefix, self.options.custom_command));
        }

        let invocation = self.agent_invocation(launch.payload);

        let Some(session_key) = self.options.agent_arg(SESSION_KEY_FLAG) else {
            return Ok(format!("{}{invocation}", launch.prefix));
        };

        let script = EnvScript::new(self.os, &self.paths.agent_dir, session_key);
        script.write_to(&self.paths.install_dir)?;
        debug!("Sealights. Chaining the profiler environment before the application");

        Ok(format!(
            "{}{invocation} && {} && {}",
            launch.prefix,
            script.source_command(&self.paths.agent_dir),
            launch.payload
        ))
    }

    fn agent_invocation(&self, payload: &str) -> String {
        let agent = self
            .os
            .join(&self.paths.agent_dir, self.os.agent_executable());
        let flags = self.flags(payload);

        let mut invocation = format!("{agent} {AGENT_MODE}");
        for (name, value) in flags {
            invocation.push_str(&format!(" --{name} {value}"));
        }
        invocation
    }

    fn flags(&self, payload: &str) -> Vec<(String, String)> {
        let options = self.options;
        let mut flags = Flags::new(options);

        if !options.overrides_flag(TOKEN_FLAG) && !options.overrides_flag(TOKEN_FILE_FLAG) {
            if options.token_file.is_empty() {
                flags.push(TOKEN_FLAG, &options.token);
            } else {
                flags.push(TOKEN_FILE_FLAG, &options.token_file);
            }
        }

        if !options.overrides_flag(BUILD_SESSION_ID_FLAG)
            && !options.overrides_flag(BUILD_SESSION_ID_FILE_FLAG)
        {
            if options.bs_id_file.is_empty() {
                flags.push(BUILD_SESSION_ID_FLAG, &options.bs_id);
            } else {
                flags.push(BUILD_SESSION_ID_FILE_FLAG, &options.bs_id_file);
            }
        }

        let working_dir = non_empty_or(&options.working_dir, self.os.current_dir_variable());
        flags.push(WORKING_DIR_FLAG, working_dir);

        let (target, target_args) = self.target(payload);
        flags.push(TARGET_FLAG, &target);
        flags.push(TARGET_ARGS_FLAG, &self.os.quote(&target_args));

        flags.push("profilerLogDir", &options.profiler_log_dir);
        flags.push("profilerLogLevel", &options.profiler_log_level);
        flags.push("tags", &options.tags);
        flags.push("tools", &options.tools);
        flags.push("proxy", &options.proxy);
        flags.push("proxyUsername", &options.proxy_username);
        flags.push("proxyPassword", &options.proxy_password);
        flags.push_toggle("ignoreCertificateErrors", options.ignore_certificate_errors);
        flags.push_toggle("notCli", options.not_cli);
        if !options.log_filename.is_empty() {
            flags.push_toggle("logAppendFile", true);
            flags.push("logFilename", &options.log_filename);
        }

        let mut flags = flags.0;
        flags.extend(
            options
                .agent_args
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        flags
    }

    /// Target program and arguments. Explicit options win over the values derived from the payload.
    fn target(&self, payload: &str) -> (String, String) {
        let payload = payload.trim();
        let (derived_target, derived_args) = match strip_interpreter(payload) {
            Some(args) => (INTERPRETER.to_string(), args),
            None => (
                self.os
                    .join(&self.paths.runtime_dir, self.os.dotnet_executable()),
                payload,
            ),
        };

        let target = non_empty_or(&self.options.target, &derived_target).to_string();
        let target_args = if self.options.target_args.is_empty() {
            format!("{TEST_KEYWORD} {derived_args}").trim_end().to_string()
        } else {
            self.options.target_args.clone()
        };
        (target, target_args)
    }
}

/// Computed flags, skipping empty values and names overridden through `agentArgs`.
struct Flags<'a>(Vec<(String, String)>, &'a SealightsOptions);

impl<'a> Flags<'a> {
    fn new(options: &'a SealightsOptions) -> Self {
        Self(Vec::new(), options)
    }

    fn push(&mut self, name: &str, value: &str) {
        if !value.is_empty() && !self.1.overrides_flag(name) {
            self.0.push((name.to_string(), value.to_string()));
        }
    }

    fn push_toggle(&mut self, name: &str, enabled: bool) {
        if enabled {
            self.push(name, "true");
        }
    }
}

/// Returns the interpreter arguments if `payload` starts with the interpreter name.
fn strip_interpreter(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix(INTERPRETER)?;
    if rest.is_empty() {
        Some(rest)
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentArgs;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const ORIGINAL: &str = "cd /app && exec dotnet ./app.dll --server.urls http://0.0.0.0:5000";

    fn paths() -> AgentPaths {
        AgentPaths {
            install_dir: PathBuf::from("/tmp/deps/0/sealights"),
            agent_dir: "/home/vcap/deps/0/sealights".to_string(),
            runtime_dir: "/home/vcap/deps/0/dotnet-sdk".to_string(),
        }
    }

    fn options() -> SealightsOptions {
        SealightsOptions {
            token: "abc123".to_string(),
            bs_id: "sess1".to_string(),
            ..Default::default()
        }
    }

    fn build(options: &SealightsOptions, original: &str) -> String {
        let paths = paths();
        CommandLineBuilder::new(options, &paths)
            .with_target_os(TargetOs::Linux)
            .build(original)
            .unwrap()
    }

    fn agent_args(args: &[(&str, &str)]) -> AgentArgs {
        args.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn wraps_dotnet_invocation() {
        let command = build(&options(), ORIGINAL);

        let payload = command.strip_prefix("cd /app && exec ").unwrap();
        assert!(payload.starts_with("/home/vcap/deps/0/sealights/SL.DotNet testListener "));
        assert!(payload.contains(" --token abc123"));
        assert!(payload.contains(" --buildSessionId sess1"));
        assert!(payload.contains(" --workingDir ${PWD}"));
        assert!(payload.contains(" --target dotnet "));
        assert!(payload
            .contains(r#" --targetArgs "test ./app.dll --server.urls http://0.0.0.0:5000""#));
        assert!(!payload.contains("&&"));
        assert!(!payload.contains("--tokenfile"));
        assert!(!payload.contains("--profilerLogDir"));
    }

    #[test]
    fn exact_command_for_minimal_options() {
        assert_eq!(
            build(&options(), ORIGINAL),
            "cd /app && exec /home/vcap/deps/0/sealights/SL.DotNet testListener \
             --token abc123 --buildSessionId sess1 --workingDir ${PWD} --target dotnet \
             --targetArgs \"test ./app.dll --server.urls http://0.0.0.0:5000\""
        );
    }

    #[test]
    fn quoted_arguments_stay_single_arguments() {
        let command = build(
            &options(),
            r#"cd /app && exec dotnet app.dll --name "my app" --dir C:\data --cmd `id` --port ${PORT}"#,
        );

        assert!(command.ends_with(
            r#" --targetArgs "test app.dll --name \"my app\" --dir C:\\data --cmd \`id\` --port ${PORT}""#
        ));
    }

    #[cfg(unix)]
    #[test]
    fn shell_receives_original_arguments() {
        let command = build(
            &options(),
            r#"cd /app && exec dotnet app.dll --name "my app" --dir C:\data --cmd `id` --port ${PORT}"#,
        );
        let (_, target_args) = command.split_once(" --targetArgs ").unwrap();

        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf '%s|' {target_args}"))
            .env("PORT", "8080")
            .output()
            .unwrap();

        assert_eq!(
            String::from_utf8(output.stdout).unwrap(),
            r#"test app.dll --name "my app" --dir C:\data --cmd `id` --port 8080|"#
        );
    }

    #[test]
    fn self_contained_app_runs_through_runtime_dir() {
        let command = build(&options(), "cd ${DEPS_DIR}/0/publish && exec ./MyApp --port 8080");

        assert!(command.starts_with("cd ${DEPS_DIR}/0/publish && exec "));
        assert!(command.contains(" --target /home/vcap/deps/0/dotnet-sdk/dotnet "));
        assert!(command.contains(r#" --targetArgs "test ./MyApp --port 8080""#));
    }

    #[test]
    fn interpreter_prefix_is_a_whole_word() {
        let command = build(&options(), "exec dotnetapp --flag");

        assert!(command.contains(" --target /home/vcap/deps/0/dotnet-sdk/dotnet "));
        assert!(command.contains(r#" --targetArgs "test dotnetapp --flag""#));
    }

    #[rstest]
    #[case::token_file("", "/etc/token", "--tokenfile /etc/token", "--token ")]
    #[case::both_given("abc", "/etc/token", "--tokenfile /etc/token", "--token ")]
    #[case::token_only("abc", "", "--token abc", "--tokenfile")]
    fn token_flags_are_exclusive(
        #[case] token: &str,
        #[case] token_file: &str,
        #[case] expected: &str,
        #[case] unexpected: &str,
    ) {
        let options = SealightsOptions {
            token: token.to_string(),
            token_file: token_file.to_string(),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert!(command.contains(expected));
        assert!(!command.contains(unexpected));
    }

    #[test]
    fn session_id_file_wins() {
        let options = SealightsOptions {
            bs_id_file: "/etc/bsid".to_string(),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert!(command.contains(" --buildSessionIdFile /etc/bsid"));
        assert!(!command.contains("--buildSessionId "));
    }

    #[test]
    fn explicit_target_options_win() {
        let options = SealightsOptions {
            target: "/usr/bin/dotnet".to_string(),
            target_args: "test other.dll".to_string(),
            working_dir: "/app".to_string(),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert!(command.contains(" --target /usr/bin/dotnet "));
        assert!(command.contains(r#" --targetArgs "test other.dll""#));
        assert!(command.contains(" --workingDir /app"));
        assert!(!command.contains("${PWD}"));
    }

    #[test]
    fn agent_args_suppress_derived_flags() {
        let options = SealightsOptions {
            agent_args: agent_args(&[
                ("target", "custom-target"),
                ("targetArgs", "custom-args"),
                ("token", "from-args"),
            ]),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert!(command.contains(" --target custom-target"));
        assert!(command.contains(" --targetArgs custom-args"));
        assert!(command.contains(" --token from-args"));
        assert!(!command.contains("--target dotnet"));
        assert!(!command.contains("test ./app.dll"));
        assert!(!command.contains("abc123"));
        assert_eq!(command.matches("--target ").count(), 1);
        assert_eq!(command.matches("--targetArgs ").count(), 1);
    }

    #[test]
    fn optional_flags() {
        let options = SealightsOptions {
            profiler_log_dir: "/tmp/logs".to_string(),
            profiler_log_level: "7".to_string(),
            tags: "cf".to_string(),
            tools: "buildpack".to_string(),
            proxy: "http://proxy:3128".to_string(),
            proxy_username: "user".to_string(),
            proxy_password: "secret".to_string(),
            ignore_certificate_errors: true,
            not_cli: true,
            log_filename: "/tmp/collector.log".to_string(),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        for flag in [
            " --profilerLogDir /tmp/logs",
            " --profilerLogLevel 7",
            " --tags cf",
            " --tools buildpack",
            " --proxy http://proxy:3128",
            " --proxyUsername user",
            " --proxyPassword secret",
            " --ignoreCertificateErrors true",
            " --notCli true",
            " --logAppendFile true",
            " --logFilename /tmp/collector.log",
        ] {
            assert!(command.contains(flag), "missing `{flag}` in `{command}`");
        }
    }

    #[test]
    fn disabled_toggles_are_not_emitted() {
        let command = build(&options(), ORIGINAL);

        assert!(!command.contains("--ignoreCertificateErrors"));
        assert!(!command.contains("--notCli"));
        assert!(!command.contains("--logAppendFile"));
    }

    #[test]
    fn extra_flags_are_emitted_verbatim() {
        let options = SealightsOptions {
            agent_args: agent_args(&[("labId", "lab1"), ("appName", "my-app")]),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert!(command.contains(" --labId lab1"));
        assert!(command.contains(" --appName my-app"));
    }

    #[test]
    fn custom_command_replaces_invocation() {
        let options = SealightsOptions {
            custom_command: "/opt/agent/run --all".to_string(),
            agent_args: agent_args(&[("sessionKey", "key1")]),
            ..options()
        };

        let command = build(&options, ORIGINAL);

        assert_eq!(command, "cd /app && exec /opt/agent/run --all");
    }

    #[test]
    fn session_key_chains_environment_script() {
        let dir = tempdir().unwrap();
        let paths = AgentPaths {
            install_dir: dir.path().join("sealights"),
            ..paths()
        };
        let options = SealightsOptions {
            agent_args: agent_args(&[("sessionKey", "key1")]),
            ..options()
        };

        let command = CommandLineBuilder::new(&options, &paths)
            .with_target_os(TargetOs::Linux)
            .build(ORIGINAL)
            .unwrap();

        let (invocation, rest) = command.split_once(" && . ").unwrap();
        assert!(invocation.starts_with("cd /app && exec /home/vcap/deps/0/sealights/SL.DotNet"));
        assert!(invocation.contains(" --sessionKey key1"));
        assert_eq!(
            rest,
            "/home/vcap/deps/0/sealights/sealights.envrc && \
             dotnet ./app.dll --server.urls http://0.0.0.0:5000"
        );
        let script =
            std::fs::read_to_string(dir.path().join("sealights").join("sealights.envrc")).unwrap();
        assert!(script.contains("export SL_CollectorId=key1\n"));
        assert!(script.contains(
            "export CORECLR_PROFILER_PATH_64=/home/vcap/deps/0/sealights/libSL.DotNet.ProfilerLib.Linux.so\n"
        ));
    }

    #[test]
    fn windows_command() {
        let paths = AgentPaths {
            install_dir: PathBuf::from("C:\\staging\\sealights"),
            agent_dir: "C:\\deps\\0\\sealights".to_string(),
            runtime_dir: "C:\\deps\\0\\dotnet-sdk".to_string(),
        };
        let options = options();

        let command = CommandLineBuilder::new(&options, &paths)
            .with_target_os(TargetOs::Windows)
            .build("cd C:\\app && exec .\\app.exe")
            .unwrap();

        assert!(command.starts_with("cd C:\\app && exec C:\\deps\\0\\sealights\\SL.DotNet.exe testListener"));
        assert!(command.contains(" --workingDir %cd%"));
        assert!(command.contains(" --target C:\\deps\\0\\dotnet-sdk\\dotnet.exe "));
    }

    #[test]
    fn missing_marker_fails() {
        let paths = paths();
        let options = options();
        let result = CommandLineBuilder::new(&options, &paths).build("dotnet ./app.dll");

        assert_matches!(result, Err(CommandBuildError::LaunchMarkerNotFound { .. }));
    }

    #[test]
    fn prefix_is_preserved_verbatim() {
        let original = "export A=1 ;  cd '/my app'  &&   exec   dotnet x.dll";

        let command = build(&options(), original);

        assert!(command.starts_with("export A=1 ;  cd '/my app'  &&   exec "));
        assert!(command.contains(r#" --targetArgs "test x.dll""#));
    }
}
