use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

static INIT: OnceCell<()> = OnceCell::new();

/// Install the fmt subscriber when `CSQLP_TRACING_FMT=1`.
///
/// Events go to stderr so they interleave with the proxy's own log stream;
/// `RUST_LOG` selects the filter (default `warn`). Returns false when tracing
/// stays disabled or a global subscriber was already set.
pub fn telemetry_init(enabled: bool) -> bool {
    if !enabled || INIT.get().is_some() {
        return false;
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::new(filter);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("csqlp: tracing init skipped (global subscriber already set)");
        return false;
    }

    let _ = INIT.set(());
    true
}
