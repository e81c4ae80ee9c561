//! Status lines on stderr.

use console::{Style, Term};

/// Width the status label is right-aligned to.
const LABEL_WIDTH: usize = 12;

/// Writes cargo-style status lines (`    Building notes -> public`).
pub(crate) struct Output {
    term: Term,
    label: Style,
    warning: Style,
    error: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().green().bold(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
        }
    }

    /// Print `msg` after a bold green, right-aligned `label`.
    pub(crate) fn status(&self, label: &str, msg: &str) {
        let label = self.label.apply_to(format!("{label:>LABEL_WIDTH$}"));
        let _ = self.term.write_line(&format!("{label} {msg}"));
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.warning.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.error.apply_to(msg).to_string());
    }
}
