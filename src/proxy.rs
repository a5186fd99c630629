//! Launch `cloud_sql_proxy` for the chosen instance and stay attached to it.
//!
//! The proxy is spawned directly (no shell) with a single `-instances=` argument.
//! Its stderr is pumped to ours chunk by chunk. While it runs, SIGINT/SIGTERM/SIGHUP
//! delivered to csqlp are recorded and turned into a SIGTERM for the proxy,
//! escalating to SIGKILL after a grace period; the child is always reaped.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::sys::signal::{self, SaFlags, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::color::{color_enabled_stderr, log_warn_stderr};
use crate::errors::CsqlpError;
use crate::models::InstanceRecord;
#[cfg(unix)]
use crate::util::signals::HandlerGuard;

/// Time the proxy gets to exit after a forwarded SIGTERM before it is killed.
pub const FORWARD_GRACE: Duration = Duration::from_secs(3);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long the stderr pump may keep draining after the proxy is reaped.
/// A descendant that inherited the pipe can hold it open indefinitely.
pub const PUMP_DRAIN: Duration = Duration::from_secs(1);

/// The one argument handed to the proxy: `-instances=<connectionName>=tcp:<port>`.
pub fn proxy_instances_arg(connection_name: &str, port: u16) -> String {
    format!("-instances={connection_name}=tcp:{port}")
}

/// How the proxy ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    /// csqlp itself received a termination signal and forwarded it.
    pub interrupted: bool,
}

impl ProxyExit {
    fn from_status(status: ExitStatus, interrupted: bool) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;
        Self {
            code: status.code(),
            signal,
            interrupted,
        }
    }

    /// Exit status for csqlp: the proxy's own code, 128+signal when it was killed,
    /// 130 when the operator interrupted the session.
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            return 130;
        }
        match (self.code, self.signal) {
            (Some(c), _) => u8::try_from(c).unwrap_or(1),
            (None, Some(s)) => u8::try_from(128 + s).unwrap_or(1),
            (None, None) => 1,
        }
    }

    pub fn describe(&self) -> String {
        match (self.code, self.signal) {
            (Some(c), _) => format!("child process exited with code {c}"),
            (None, Some(s)) => format!("child process exited by signal {s}"),
            (None, None) => "child process exited".to_string(),
        }
    }
}

/// Runs the proxy for a selected instance; blocks until the proxy is gone.
pub trait Launcher {
    fn launch(&mut self, instance: &InstanceRecord, port: u16) -> Result<ProxyExit, CsqlpError>;
}

#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    grace: Duration,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            grace: FORWARD_GRACE,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, instance: &InstanceRecord, port: u16) -> Result<ProxyExit, CsqlpError> {
        let arg = proxy_instances_arg(&instance.connection_name, port);
        println!("Running command: {arg}");
        tracing::info!(program = %self.program.display(), %arg, "spawning proxy");

        // Handlers go in before spawn so no signal slips through unrecorded.
        let _forwarding = SignalForwarding::install();

        let mut cmd = Command::new(&self.program);
        cmd.arg(&arg).stdout(Stdio::inherit()).stderr(Stdio::piped());
        let child = cmd.spawn()?;
        let mut guard = ChildGuard::new(child);

        let stderr_pump = guard.child_mut().stderr.take().map(|stderr| {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let _ = tx.send(pump(stderr, io::stderr()));
            });
            rx
        });

        let status = supervise(guard.child_mut(), self.grace, take_pending_signal)?;
        guard.reaped();

        if let Some(rx) = stderr_pump {
            // The pump thread is detached on timeout; it ends when the last
            // writer closes the pipe or csqlp exits.
            match rx.recv_timeout(PUMP_DRAIN) {
                Ok(Ok(n)) => tracing::debug!(bytes = n, "proxy stderr closed"),
                Ok(Err(e)) => tracing::warn!(error = %e, "proxy stderr pump failed"),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    tracing::warn!("proxy stderr still open after exit; not waiting")
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    tracing::warn!("proxy stderr pump panicked")
                }
            }
        }

        let exit = ProxyExit::from_status(status, received_signal());
        println!("{}", exit.describe());
        Ok(exit)
    }
}

/// Copy every chunk from `reader` to `writer` as it arrives; returns bytes copied.
pub fn pump<R: Read, W: Write>(mut reader: R, mut writer: W) -> io::Result<u64> {
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        writer.flush()?;
        total += n as u64;
    }
}

/// Wait for `child`, forwarding termination when `stop_requested` fires.
///
/// The first request sends SIGTERM (plain kill on non-unix); if the child is
/// still alive after `grace`, it is killed. Returns the reaped status.
pub fn supervise<F>(
    child: &mut Child,
    grace: Duration,
    mut stop_requested: F,
) -> io::Result<ExitStatus>
where
    F: FnMut() -> bool,
{
    let mut kill_deadline: Option<Instant> = None;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if kill_deadline.is_none() && stop_requested() {
            tracing::info!(pid = child.id(), "forwarding termination to proxy");
            log_warn_stderr(color_enabled_stderr(), "Stopping cloud_sql_proxy...");
            terminate(child);
            kill_deadline = Some(Instant::now() + grace);
        }
        if let Some(deadline) = kill_deadline {
            if Instant::now() >= deadline {
                tracing::warn!(pid = child.id(), "proxy ignored SIGTERM; killing");
                let _ = child.kill();
                return child.wait();
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    let _ = signal::kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

/// Kills and reaps the child if supervision bails out early.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    fn reaped(&mut self) {
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

// Last termination signal seen while the proxy runs (0 = none).
static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);
// Sticky copy of PENDING_SIGNAL for reporting after the child is gone.
static RECEIVED_SIGNAL: AtomicI32 = AtomicI32::new(0);

#[cfg(unix)]
extern "C" fn record_signal(sig: i32) {
    PENDING_SIGNAL.store(sig, Ordering::SeqCst);
    RECEIVED_SIGNAL.store(sig, Ordering::SeqCst);
}

fn take_pending_signal() -> bool {
    PENDING_SIGNAL.swap(0, Ordering::SeqCst) != 0
}

fn received_signal() -> bool {
    RECEIVED_SIGNAL.load(Ordering::SeqCst) != 0
}

/// Records SIGINT/SIGTERM/SIGHUP for the lifetime of the value; restores the
/// previous dispositions on drop.
struct SignalForwarding {
    #[cfg(unix)]
    _handlers: HandlerGuard,
}

impl SignalForwarding {
    #[cfg(unix)]
    fn install() -> Self {
        PENDING_SIGNAL.store(0, Ordering::SeqCst);
        RECEIVED_SIGNAL.store(0, Ordering::SeqCst);
        Self {
            _handlers: HandlerGuard::install(
                &[Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP],
                record_signal,
                SaFlags::SA_RESTART,
            ),
        }
    }

    #[cfg(not(unix))]
    fn install() -> Self {
        Self {}
    }
}
