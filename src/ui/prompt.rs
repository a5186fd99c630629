//! dialoguer-backed prompts.
//!
//! Esc or `q` in a menu, and Ctrl-C anywhere, come back as `Ok(None)`.
//!
//! In raw mode the terminal does not turn Ctrl-C into a signal; console reads
//! the byte, raises SIGINT itself and then reports an Interrupted read. Each
//! prompt therefore runs inside an [`InterruptScope`] that records SIGINT
//! instead of dying from it.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

#[cfg(unix)]
use nix::sys::signal::{SaFlags, Signal};

use crate::errors::CsqlpError;
use crate::select::{parse_port, Chooser, Kind};
#[cfg(unix)]
use crate::util::signals::HandlerGuard;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn note_interrupt(_sig: i32) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// SIGINT is recorded, not fatal, while a value of this type is alive.
pub(crate) struct InterruptScope {
    #[cfg(unix)]
    _handler: HandlerGuard,
}

impl InterruptScope {
    pub(crate) fn enter() -> Self {
        INTERRUPTED.store(false, Ordering::SeqCst);
        Self {
            // No SA_RESTART: a SIGINT from outside must also break the blocking read.
            #[cfg(unix)]
            _handler: HandlerGuard::install(&[Signal::SIGINT], note_interrupt, SaFlags::empty()),
        }
    }

    fn interrupted() -> bool {
        INTERRUPTED.swap(false, Ordering::SeqCst)
    }
}

fn map_prompt_error<T>(e: dialoguer::Error) -> Result<Option<T>, CsqlpError> {
    let dialoguer::Error::IO(ioe) = e;
    let interrupted = InterruptScope::interrupted();
    if interrupted || ioe.kind() == io::ErrorKind::Interrupted {
        let _ = Term::stderr().show_cursor();
        tracing::debug!(error = %ioe, "prompt interrupted");
        return Ok(None);
    }
    Err(CsqlpError::Io(ioe))
}

#[derive(Default)]
pub struct TermChooser {
    theme: ColorfulTheme,
}

impl TermChooser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Chooser for TermChooser {
    fn choose(&mut self, kind: Kind, titles: &[String]) -> Result<Option<usize>, CsqlpError> {
        let _scope = InterruptScope::enter();
        let res = Select::with_theme(&self.theme)
            .with_prompt(kind.prompt())
            .items(titles)
            .default(0)
            .interact_on_opt(&Term::stderr());
        match res {
            Ok(v) => Ok(v),
            Err(e) => map_prompt_error(e),
        }
    }

    fn input_port(&mut self, default: u16) -> Result<Option<u16>, CsqlpError> {
        let _scope = InterruptScope::enter();
        let res = Input::<String>::with_theme(&self.theme)
            .with_prompt("Input port")
            .default(default.to_string())
            .validate_with(|s: &String| parse_port(s, default).map(|_| ()))
            .interact_text_on(&Term::stderr());
        match res {
            Ok(s) => parse_port(&s, default).map(Some).map_err(CsqlpError::Message),
            Err(e) => map_prompt_error(e),
        }
    }
}
