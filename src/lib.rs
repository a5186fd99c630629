//! csqlp: pick a GCP project and Cloud SQL instance interactively, then run
//! `cloud_sql_proxy` for it on a local port.
//!
//! The binary wires these pieces together in [`flow::run`]:
//! - [`deps`]: PATH preflight for `gcloud` and `cloud_sql_proxy`
//! - [`gcloud`]: JSON listings of projects and instances
//! - [`select`]: menus and the port prompt
//! - [`proxy`]: spawn, stderr passthrough, signal forwarding

pub mod banner;
pub mod color;
pub mod config;
pub mod deps;
pub mod errors;
pub mod flow;
pub mod gcloud;
pub mod models;
pub mod proxy;
pub mod select;
pub mod telemetry;
pub mod ui;
pub mod util;

pub use color::{
    color_enabled_stderr, log_error_stderr, log_warn_stderr, paint,
    set_color_mode, ColorMode,
};
pub use config::Settings;
pub use deps::{check_dependencies, ResolvedTools};
pub use errors::{display_for_error, exit_code_for_error, CsqlpError};
pub use gcloud::{GcloudInventory, Inventory};
pub use models::{InstanceRecord, ProjectRecord};
pub use proxy::{proxy_instances_arg, Launcher, ProcessLauncher, ProxyExit};
pub use select::{Chooser, Kind, DEFAULT_PORT};
pub use telemetry::telemetry_init;
pub use ui::TermChooser;
