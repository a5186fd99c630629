/*!
Test support helpers shared across integration tests.

- fake_tool(dir, name, body): write an executable /bin/sh script
- run_csqlp(envs): run the built binary with stdin closed and capture output
- PtySession::spawn(envs): run the built binary on a pseudo-terminal and type into it

Fakes append their argv to a log file so tests can assert which subprocesses ran.
*/

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Write an executable shell script named `name` into `dir`.
#[allow(dead_code)]
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let p = dir.join(name);
    std::fs::write(&p, format!("#!/bin/sh\n{body}\n")).expect("write fake tool");
    std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    p
}

/// Script body that records its invocation in `log` before running `rest`.
#[allow(dead_code)]
pub fn logging_body(log: &Path, tag: &str, rest: &str) -> String {
    format!("echo \"{tag} $*\" >> {}\n{rest}", log.display())
}

fn csqlp_command(envs: &[(&str, String)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csqlp"));
    cmd.env_remove("CSQLP_GCLOUD")
        .env_remove("CSQLP_PROXY")
        .env_remove("CSQLP_TRACING_FMT")
        .env("NO_COLOR", "1");
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd
}

/// Run csqlp non-interactively with the given environment overrides.
#[allow(dead_code)]
pub fn run_csqlp(envs: &[(&str, String)]) -> Output {
    csqlp_command(envs)
        .stdin(Stdio::null())
        .output()
        .expect("run csqlp")
}

/// csqlp attached to the slave side of a pty; all three std streams share it,
/// so `output()` is stdout and stderr interleaved as a terminal would show them.
#[cfg(unix)]
#[allow(dead_code)]
pub struct PtySession {
    child: std::process::Child,
    keys: std::fs::File,
    screen: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
    reader: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
#[allow(dead_code)]
impl PtySession {
    pub fn spawn(envs: &[(&str, String)]) -> Self {
        use nix::pty::{openpty, Winsize};
        use std::io::Read;

        let size = Winsize {
            ws_row: 24,
            ws_col: 100,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let pty = openpty(Some(&size), None).expect("openpty");
        let slave = std::fs::File::from(pty.slave);
        let child = {
            let mut cmd = csqlp_command(envs);
            cmd.env("TERM", "xterm")
                .stdin(Stdio::from(slave.try_clone().expect("dup pty")))
                .stdout(Stdio::from(slave.try_clone().expect("dup pty")))
                .stderr(Stdio::from(slave));
            cmd.spawn().expect("spawn csqlp on pty")
            // cmd drops here, closing our copies of the slave side.
        };

        let mut master = std::fs::File::from(pty.master);
        let keys = master.try_clone().expect("dup pty master");
        let screen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = screen.clone();
        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; 4096];
            // EIO once every slave descriptor is closed.
            while let Ok(n) = master.read(&mut buf) {
                if n == 0 {
                    break;
                }
                sink.lock().expect("screen lock").extend_from_slice(&buf[..n]);
            }
        });

        Self {
            child,
            keys,
            screen,
            reader: Some(reader),
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.screen.lock().expect("screen lock")).to_string()
    }

    /// Wait until `text` shows up on the terminal, then give the prompt a
    /// moment to switch the terminal into raw mode.
    pub fn wait_for(&self, text: &str) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
        while !self.output().contains(text) {
            assert!(
                std::time::Instant::now() < deadline,
                "timed out waiting for {text:?}; screen so far:\n{}",
                self.output()
            );
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        std::thread::sleep(std::time::Duration::from_millis(300));
    }

    pub fn send(&mut self, keys: &[u8]) {
        use std::io::Write;
        self.keys.write_all(keys).expect("write to pty");
        self.keys.flush().expect("flush pty");
    }

    /// Press Ctrl-C until csqlp exits. A ^C typed before the prompt enters raw
    /// mode is swallowed by the line discipline, hence the repeats.
    pub fn interrupt(&mut self) -> std::process::ExitStatus {
        for _ in 0..20 {
            self.send(b"\x03");
            if let Some(status) = self.wait_exit(std::time::Duration::from_millis(500)) {
                return status;
            }
        }
        let _ = self.child.kill();
        panic!("csqlp did not exit on Ctrl-C; screen:\n{}", self.output());
    }

    pub fn finish(&mut self) -> std::process::ExitStatus {
        match self.wait_exit(std::time::Duration::from_secs(20)) {
            Some(status) => status,
            None => {
                let _ = self.child.kill();
                panic!("csqlp did not exit; screen:\n{}", self.output());
            }
        }
    }

    fn wait_exit(&mut self, timeout: std::time::Duration) -> Option<std::process::ExitStatus> {
        use wait_timeout::ChildExt;
        let status = self.child.wait_timeout(timeout).expect("wait csqlp")?;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        Some(status)
    }
}

#[cfg(unix)]
impl Drop for PtySession {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[allow(dead_code)]
pub fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}
