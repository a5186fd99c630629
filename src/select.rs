//! Interactive selection: menus over listed records and the port prompt.
//!
//! The terminal side lives behind [`Chooser`] so the flow can be driven by a
//! scripted chooser in tests; [`crate::ui::TermChooser`] is the real one.

use crate::errors::CsqlpError;

/// Port offered when the operator just presses Enter.
pub const DEFAULT_PORT: u16 = 5432;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Project,
    Instance,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Project => "project",
            Kind::Instance => "instance",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Kind::Project => "Select project",
            Kind::Instance => "Select instance",
        }
    }
}

/// Source of operator decisions. `Ok(None)` means the operator backed out.
pub trait Chooser {
    /// Show `titles` in order and return the index of the confirmed entry.
    fn choose(&mut self, kind: Kind, titles: &[String]) -> Result<Option<usize>, CsqlpError>;

    /// Ask for a local port, offering `default`.
    fn input_port(&mut self, default: u16) -> Result<Option<u16>, CsqlpError>;
}

/// Present `items` by display name and return the record whose key matches the chosen entry.
///
/// The key is resolved against the original sequence, so with duplicate keys
/// the earliest record wins.
pub fn select_one<'a, T, N, K>(
    chooser: &mut dyn Chooser,
    kind: Kind,
    items: &'a [T],
    display_name_of: N,
    key_of: K,
) -> Result<&'a T, CsqlpError>
where
    N: Fn(&T) -> &str,
    K: Fn(&T) -> &str,
{
    if items.is_empty() {
        return Err(CsqlpError::Empty {
            kind: kind.as_str(),
        });
    }
    let titles: Vec<String> = items.iter().map(|t| display_name_of(t).to_string()).collect();
    let idx = chooser.choose(kind, &titles)?.ok_or(CsqlpError::Cancelled)?;
    let chosen = items.get(idx).ok_or_else(|| {
        CsqlpError::Message(format!("{} selection out of range: {idx}", kind.as_str()))
    })?;
    let key = key_of(chosen);
    let found = items
        .iter()
        .find(|t| key_of(*t) == key)
        .unwrap_or(chosen);
    tracing::info!(kind = kind.as_str(), key, "selected");
    Ok(found)
}

/// Ask for the local port; cancellation unwinds like the menus.
pub fn select_port(chooser: &mut dyn Chooser) -> Result<u16, CsqlpError> {
    let port = chooser
        .input_port(DEFAULT_PORT)?
        .ok_or(CsqlpError::Cancelled)?;
    tracing::info!(port, "port selected");
    Ok(port)
}

/// Validate free-form port input: empty takes `default`; otherwise a positive u16.
pub fn parse_port(input: &str, default: u16) -> Result<u16, String> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(default);
    }
    match s.parse::<u16>() {
        Ok(0) => Err("port must be greater than 0".to_string()),
        Ok(p) => Ok(p),
        Err(_) => Err(format!("not a valid port: {s}")),
    }
}
