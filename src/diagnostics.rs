//! Diagnostic sink for the netlist reader.
//!
//! Parsing problems that are not syntax errors (say, a reference to a name
//! that was never declared) are reported here instead of aborting the
//! parse. The graph itself never sees them.

use std::cell::Cell;

use log::{error, info, warn};

/// Severity of a reported diagnostic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Ignore,
    Note,
    Remark,
    Warning,
    Error,
    Fatal,
}

/// Counts diagnostics and forwards them to the logging facade.
///
/// The report counter is interior-mutable so that a parser and its visitor
/// can share one engine without threading `&mut` through both.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    reported: Cell<u32>,
    silent: bool,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that counts reports but never emits them. Useful in tests
    /// and when a caller only cares whether anything went wrong.
    pub fn silent() -> Self {
        Self {
            reported: Cell::new(0),
            silent: true,
        }
    }

    /// Reports a diagnostic at the given severity.
    pub fn report(&self, severity: Severity, message: &str) {
        self.reported.set(self.reported.get() + 1);
        if self.silent {
            return;
        }
        match severity {
            Severity::Ignore => {}
            Severity::Note | Severity::Remark => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error | Severity::Fatal => error!("{}", message),
        }
    }

    /// Number of diagnostics reported so far.
    pub fn reported(&self) -> u32 {
        self.reported.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_reports() {
        let diag = DiagnosticEngine::silent();
        assert_eq!(diag.reported(), 0);

        diag.report(Severity::Warning, "one");
        diag.report(Severity::Ignore, "two");
        assert_eq!(diag.reported(), 2);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }
}
