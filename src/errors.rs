//! Error mapping guide:
//! - `Cancelled` is not a failure: main prints the farewell line and exits 0.
//! - Map io::ErrorKind::NotFound and missing tools to exit code 127; all others to 1.
//! - Keep user-visible texts stable; integration tests match on them.
use std::fmt;
use std::io;

/// Outcome of every step in the selection pipeline that did not produce its value.
#[derive(Debug)]
pub enum CsqlpError {
    /// The operator declined a prompt (Esc, `q`, Ctrl-C inside a menu).
    Cancelled,
    /// A required executable is not resolvable on PATH.
    MissingDependency {
        label: String,
        tool: String,
        hint: String,
    },
    /// The listing command could not run or exited non-zero.
    Listing(String),
    /// The listing command's stdout was not the expected JSON array.
    Parse(String),
    /// The listing returned nothing to choose from.
    Empty { kind: &'static str },
    Io(io::Error),
    Message(String),
}

impl From<io::Error> for CsqlpError {
    fn from(e: io::Error) -> Self {
        CsqlpError::Io(e)
    }
}

impl CsqlpError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CsqlpError::Cancelled)
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert CsqlpError to exit code (parity with io::Error mapping).
pub fn exit_code_for_error(e: &CsqlpError) -> u8 {
    match e {
        CsqlpError::Cancelled => 0,
        CsqlpError::MissingDependency { .. } => 127,
        CsqlpError::Io(ioe) => exit_code_for_io_error(ioe),
        CsqlpError::Listing(_)
        | CsqlpError::Parse(_)
        | CsqlpError::Empty { .. }
        | CsqlpError::Message(_) => 1,
    }
}

/// Render a user-facing string for CsqlpError.
pub fn display_for_error(e: &CsqlpError) -> String {
    match e {
        CsqlpError::Cancelled => "Bye!".to_string(),
        CsqlpError::MissingDependency { label, tool, hint } => format!(
            "Error: Could not find {label}. Make sure {tool} is installed and available on your PATH before running csqlp. Find more at {hint}"
        ),
        CsqlpError::Listing(s) => format!("Error: listing command failed: {s}"),
        CsqlpError::Parse(s) => format!("Error: could not parse listing output: {s}"),
        CsqlpError::Empty { kind } => format!("Error: no {kind}s found"),
        CsqlpError::Io(ioe) => format!("Error: {ioe}"),
        CsqlpError::Message(s) => format!("Error: {s}"),
    }
}

impl fmt::Display for CsqlpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_for_error(self))
    }
}

impl std::error::Error for CsqlpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsqlpError::Io(e) => Some(e),
            _ => None,
        }
    }
}
