//! Scoped signal dispositions.
//!
//! Both the prompts and the proxy supervisor replace SIGINT (and friends) with
//! a recording handler for a bounded stretch of the session, then put back
//! whatever was there before.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Routes a set of signals to `handler` until dropped; the previous
/// dispositions are restored on drop.
pub struct HandlerGuard {
    previous: Vec<(Signal, SigAction)>,
}

impl HandlerGuard {
    /// `handler` must be async-signal-safe (atomics only).
    pub fn install(signals: &[Signal], handler: extern "C" fn(i32), flags: SaFlags) -> Self {
        let act = SigAction::new(SigHandler::Handler(handler), flags, SigSet::empty());
        let mut previous = Vec::with_capacity(signals.len());
        for &sig in signals {
            // SAFETY: callers pass handlers that only touch atomics.
            match unsafe { signal::sigaction(sig, &act) } {
                Ok(old) => previous.push((sig, old)),
                Err(e) => tracing::warn!(?sig, error = %e, "sigaction failed"),
            }
        }
        Self { previous }
    }
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        // Reverse order so repeated signals end up with their oldest disposition.
        for (sig, old) in self.previous.drain(..).rev() {
            // SAFETY: restoring a disposition previously returned by sigaction.
            let _ = unsafe { signal::sigaction(sig, &old) };
        }
    }
}

/// Serializes tests that swap process-wide signal handlers or raise signals.
#[cfg(test)]
pub(crate) fn serial() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
