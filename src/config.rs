//! Runtime settings read from the environment once at startup.
//!
//! There is no configuration file; every knob is an environment variable so
//! the interactive flow itself stays flag-free.

use std::env;
use std::time::Duration;

use crate::color::{parse_color_mode, ColorMode};

pub const DEFAULT_GCLOUD: &str = "gcloud";
pub const DEFAULT_PROXY: &str = "cloud_sql_proxy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Executable name or path of the listing tool.
    pub gcloud_bin: String,
    /// Executable name or path of the proxy.
    pub proxy_bin: String,
    /// Zero waits forever.
    pub list_timeout: Duration,
    pub color: Option<ColorMode>,
    pub tracing_fmt: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gcloud_bin: DEFAULT_GCLOUD.to_string(),
            proxy_bin: DEFAULT_PROXY.to_string(),
            list_timeout: Duration::ZERO,
            color: None,
            tracing_fmt: false,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build settings from an arbitrary key lookup; unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let list_timeout = non_empty(lookup("CSQLP_LIST_TIMEOUT_SECS"))
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.list_timeout);
        Self {
            gcloud_bin: non_empty(lookup("CSQLP_GCLOUD")).unwrap_or(defaults.gcloud_bin),
            proxy_bin: non_empty(lookup("CSQLP_PROXY")).unwrap_or(defaults.proxy_bin),
            list_timeout,
            color: non_empty(lookup("CSQLP_COLOR")).and_then(|v| parse_color_mode(&v)),
            tracing_fmt: lookup("CSQLP_TRACING_FMT").as_deref().map(str::trim) == Some("1"),
        }
    }
}
