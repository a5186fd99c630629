//! Small utilities shared by the listing, prompt and launch steps.

pub mod exec;
#[cfg(unix)]
pub mod signals;

pub use exec::{ExecOutput, ExecRequest, ExecService};
