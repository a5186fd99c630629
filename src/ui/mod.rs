//! Terminal surfaces: progress spinner and the interactive prompts.

pub mod prompt;
pub mod spinner;

pub use prompt::TermChooser;
pub use spinner::Spinner;
