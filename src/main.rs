use std::process::ExitCode;

use clap::Parser;
use csqlp::{
    check_dependencies, color_enabled_stderr, display_for_error, exit_code_for_error,
    log_error_stderr, log_warn_stderr, CsqlpError, GcloudInventory, ProcessLauncher, ProxyExit,
    Settings, TermChooser,
};

#[derive(Parser, Debug)]
#[command(
    name = "csqlp",
    version,
    long_version = csqlp::banner::LONG_VERSION,
    about = "Pick a GCP project and Cloud SQL instance, then run cloud_sql_proxy for it.",
    after_help = "Environment: CSQLP_GCLOUD, CSQLP_PROXY, CSQLP_LIST_TIMEOUT_SECS, CSQLP_COLOR, NO_COLOR, CSQLP_TRACING_FMT, RUST_LOG"
)]
struct Cli {}

fn session(settings: &Settings) -> Result<ProxyExit, CsqlpError> {
    let tools = check_dependencies(settings)?;
    let inventory = GcloudInventory::new(tools.gcloud, settings.list_timeout);
    let mut chooser = TermChooser::new();
    let mut launcher = ProcessLauncher::new(tools.proxy);
    csqlp::flow::run(&inventory, &mut chooser, &mut launcher)
}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    let settings = Settings::from_env();
    if let Some(mode) = settings.color {
        csqlp::set_color_mode(mode);
    }
    csqlp::telemetry_init(settings.tracing_fmt);

    let use_err = color_enabled_stderr();
    csqlp::banner::print_startup_banner(use_err);

    match session(&settings) {
        Ok(exit) => ExitCode::from(exit.exit_code()),
        Err(e) if e.is_cancelled() => {
            log_warn_stderr(use_err, "Bye!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = ?e, "csqlp failed");
            log_error_stderr(use_err, &display_for_error(&e));
            ExitCode::from(exit_code_for_error(&e))
        }
    }
}
