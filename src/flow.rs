//! The interactive pipeline: project → instance → port → proxy.

use crate::errors::CsqlpError;
use crate::gcloud::Inventory;
use crate::proxy::{Launcher, ProxyExit};
use crate::select::{select_one, select_port, Chooser, Kind};

/// Run the selection flow against already-checked tools.
///
/// Each step consumes the previous step's value; the first error or
/// cancellation ends the run without touching later steps.
pub fn run(
    inventory: &dyn Inventory,
    chooser: &mut dyn Chooser,
    launcher: &mut dyn Launcher,
) -> Result<ProxyExit, CsqlpError> {
    let projects = inventory.list_projects()?;
    tracing::debug!(count = projects.len(), "projects listed");
    let project = select_one(
        chooser,
        Kind::Project,
        &projects,
        |p| p.display_name.as_str(),
        |p| p.project_id.as_str(),
    )?;

    let instances = inventory.list_instances(&project.project_id)?;
    tracing::debug!(count = instances.len(), project = %project.project_id, "instances listed");
    let instance = select_one(
        chooser,
        Kind::Instance,
        &instances,
        |i| i.display_name.as_str(),
        |i| i.connection_name.as_str(),
    )?;

    let port = select_port(chooser)?;

    launcher.launch(instance, port)
}


#[cfg(all(test, unix))]
mod process_tests {
    //! Real gcloud/proxy processes (shell fakes) with a scripted chooser.
    use super::*;
    use crate::gcloud::GcloudInventory;
    use crate::proxy::ProcessLauncher;
    use crate::select::testing::ScriptedChooser;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn exe(dir: &Path, name: &str, body: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, format!("#!/bin/sh\n{body}\n")).expect("write");
        std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        p
    }

    #[test]
    fn test_scenario_with_process_fakes() {
        let _serial = crate::util::signals::serial();
        let td = tempfile::tempdir().expect("tmpdir");
        let log = td.path().join("calls.log");
        let gcloud = exe(
            td.path(),
            "gcloud",
            &format!(
                r#"echo "gcloud $*" >> {log}
case "$1" in
  projects) echo '[{{"name":"Proj A","projectId":"p1","projectNumber":"1"}}]' ;;
  sql) [ "$4" = "--project=p1" ] && echo '[{{"name":"Inst 1","connectionName":"p1:region:inst1"}}]' ;;
esac"#,
                log = log.display()
            ),
        );
        let proxy = exe(
            td.path(),
            "cloud_sql_proxy",
            &format!(r#"echo "proxy $*" >> {}"#, log.display()),
        );

        let inv = GcloudInventory::new(gcloud, Duration::ZERO).with_progress(false);
        let mut chooser = ScriptedChooser::new(&[Some("Proj A"), Some("Inst 1")], &[Some(5432)]);
        let mut launcher = ProcessLauncher::new(proxy);
        let exit = run(&inv, &mut chooser, &mut launcher).expect("flow");
        assert_eq!(exit.code, Some(0));

        let calls = std::fs::read_to_string(&log).expect("log");
        let lines: Vec<&str> = calls.lines().collect();
        assert_eq!(
            lines,
            vec![
                "gcloud projects list --format=json",
                "gcloud sql instances list --project=p1 --format=json",
                "proxy -instances=p1:region:inst1=tcp:5432",
            ]
        );
    }
}
