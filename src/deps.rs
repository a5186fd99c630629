//! Preflight: make sure both external tools resolve on PATH before any subprocess runs.

use std::path::PathBuf;

use crate::config::Settings;
use crate::errors::CsqlpError;

pub const GCLOUD_HINT: &str = "https://cloud.google.com/sdk/gcloud";
pub const PROXY_HINT: &str = "https://cloud.google.com/sql/docs/mysql/connect-admin-proxy";

/// An external executable the flow needs, plus what to tell the operator when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name or path handed to `which`.
    pub bin: String,
    /// Human label used in the error line.
    pub label: String,
    pub hint: &'static str,
}

impl Dependency {
    pub fn gcloud(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
            label: format!("{bin} cli"),
            hint: GCLOUD_HINT,
        }
    }

    pub fn proxy(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
            label: bin.to_string(),
            hint: PROXY_HINT,
        }
    }
}

/// Absolute paths of the tools, as resolved by the preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub gcloud: PathBuf,
    pub proxy: PathBuf,
}

/// Resolve one dependency; never spawns anything.
pub fn resolve(dep: &Dependency) -> Result<PathBuf, CsqlpError> {
    which::which(&dep.bin).map_err(|e| {
        tracing::debug!(bin = %dep.bin, error = %e, "dependency lookup failed");
        CsqlpError::MissingDependency {
            label: dep.label.clone(),
            tool: dep.bin.clone(),
            hint: dep.hint.to_string(),
        }
    })
}

/// Check listing tool first, then the proxy; the first missing one wins.
pub fn check_dependencies(settings: &Settings) -> Result<ResolvedTools, CsqlpError> {
    let gcloud = resolve(&Dependency::gcloud(&settings.gcloud_bin))?;
    let proxy = resolve(&Dependency::proxy(&settings.proxy_bin))?;
    tracing::info!(gcloud = %gcloud.display(), proxy = %proxy.display(), "dependencies resolved");
    Ok(ResolvedTools { gcloud, proxy })
}
