//! Diagnostic reporting for long-running exports.
//!
//! Every stage receives a [`Reporter`] by value instead of consulting a
//! process-wide verbosity flag, so components stay independently testable.
//! `detail` messages only appear when verbose output was requested;
//! `note` and `warn` always print.
//!
//! # Example
//!
//! ```
//! use sigvault::report::Reporter;
//!
//! let reporter = Reporter::new(true);
//! reporter.note("Copying attachments");
//! reporter.detail("\tDoing markdown for: Alice");
//! ```

/// A verbosity-gated diagnostic sink.
///
/// Copyable so it can be handed to every stage without ceremony.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    /// Creates a reporter; `verbose` enables [`detail`](Self::detail) output.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Returns whether detail output is enabled.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Prints a progress message unconditionally.
    pub fn note(&self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
    }

    /// Prints a diagnostic message, but only in verbose mode.
    pub fn detail(&self, message: impl AsRef<str>) {
        if self.verbose {
            println!("{}", message.as_ref());
        }
    }

    /// Prints a per-item warning to stderr unconditionally.
    pub fn warn(&self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag() {
        assert!(Reporter::new(true).verbose());
        assert!(!Reporter::new(false).verbose());
        assert!(!Reporter::default().verbose());
    }

    #[test]
    fn test_reporter_is_copy() {
        let r = Reporter::new(true);
        let copy = r;
        assert_eq!(r.verbose(), copy.verbose());
    }
}
