//! Resource listing through the gcloud CLI.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::CsqlpError;
use crate::models::{parse_instances, parse_projects, InstanceRecord, ProjectRecord};
use crate::ui::Spinner;
use crate::util::{ExecRequest, ExecService};

/// Where projects and instances come from.
pub trait Inventory {
    fn list_projects(&self) -> Result<Vec<ProjectRecord>, CsqlpError>;
    fn list_instances(&self, project_id: &str) -> Result<Vec<InstanceRecord>, CsqlpError>;
}

/// Argument vector for listing all visible projects.
pub fn projects_list_args() -> Vec<String> {
    vec![
        "projects".to_string(),
        "list".to_string(),
        "--format=json".to_string(),
    ]
}

/// Argument vector for listing Cloud SQL instances of one project.
///
/// The project id is a single argv element; it never passes through a shell.
pub fn instances_list_args(project_id: &str) -> Vec<String> {
    vec![
        "sql".to_string(),
        "instances".to_string(),
        "list".to_string(),
        format!("--project={project_id}"),
        "--format=json".to_string(),
    ]
}

#[derive(Debug, Clone)]
pub struct GcloudInventory {
    program: PathBuf,
    exec: ExecService,
    show_progress: bool,
}

impl GcloudInventory {
    /// `timeout` of zero waits for gcloud indefinitely.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            exec: ExecService::new(timeout),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run gcloud with `args` and return its stdout; non-zero exit surfaces stderr.
    fn run(&self, message: &str, args: Vec<String>) -> Result<String, CsqlpError> {
        let _spinner = self.show_progress.then(|| Spinner::start(message));
        let request = ExecRequest::new(OsString::from(self.program.as_os_str()))
            .args(args)
            // stdin is closed; make sure gcloud fails instead of waiting on a question
            .env("CLOUDSDK_CORE_DISABLE_PROMPTS", "1");
        let out = self
            .exec
            .run(request)
            .map_err(|e| CsqlpError::Listing(format!("{e:#}")))?;
        if !out.status.success() {
            let diag = out.stderr.trim();
            let msg = if diag.is_empty() {
                format!("{} exited with {}", self.program.display(), out.status)
            } else {
                diag.to_string()
            };
            tracing::warn!(status = ?out.status, "listing command failed");
            return Err(CsqlpError::Listing(msg));
        }
        tracing::debug!(bytes = out.stdout.len(), elapsed = ?out.duration, "listing done");
        Ok(out.stdout)
    }
}

impl Inventory for GcloudInventory {
    fn list_projects(&self) -> Result<Vec<ProjectRecord>, CsqlpError> {
        let raw = self.run("Fetching projects", projects_list_args())?;
        parse_projects(&raw)
    }

    fn list_instances(&self, project_id: &str) -> Result<Vec<InstanceRecord>, CsqlpError> {
        let raw = self.run("Fetching instances", instances_list_args(project_id))?;
        parse_instances(&raw)
    }
}
