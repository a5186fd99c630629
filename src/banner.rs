/// One-line header printed before the flow starts.
pub fn startup_banner() -> String {
    format!("Cloud SQL Proxy (csqlp) v{}", env!("CARGO_PKG_VERSION"))
}

/// Long `--version` text with build provenance baked in by build.rs.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt: ",
    env!("CSQLP_BUILD_DATE"),
    "\ntarget: ",
    env!("CSQLP_BUILD_TARGET"),
    "\nprofile: ",
    env!("CSQLP_BUILD_PROFILE"),
);

pub fn print_startup_banner(use_color: bool) {
    eprintln!("{}", crate::paint(use_color, "\x1b[1m", &startup_banner()));
}
