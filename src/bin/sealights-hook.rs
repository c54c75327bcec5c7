use std::process::ExitCode;

use tracing::{error, info};

use sealights_hook::cli::Cli;
use sealights_hook::hook::{HookError, SealightsHook};
use sealights_hook::logging::Logging;

fn main() -> ExitCode {
    let cli = Cli::init_hook_cli();

    if let Err(err) = Logging::try_init(cli.log_level()) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match _main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Sealights. Staging hook failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn _main(cli: Cli) -> Result<(), HookError> {
    let hook = SealightsHook::from_env(cli.release_file()).with_retry_policy(cli.retry_policy());
    if !hook.is_enabled() {
        info!("Sealights service isn't configured, skipping");
        return Ok(());
    }
    hook.after_compile(&cli.staging_paths())
}
