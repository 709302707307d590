//! Diagnostic reporting for the migration pipeline.
//!
//! The pipeline never aborts on a malformed file; everything recoverable is
//! funneled through [`Reporter`] as a warning so the run can make maximal
//! progress and still tell the user exactly what was skipped or downgraded.

use std::cell::Cell;

use colored::Colorize;

/// Collecting sink for textual diagnostics.
///
/// Warnings are printed to stderr immediately and counted for the final
/// summary. `verbose` enables per-file progress lines, `debug` additionally
/// prints the resolved schedule and every resolver decision.
#[derive(Debug, Default)]
pub struct Reporter {
    verbose: bool,
    debug: bool,
    warning_count: Cell<usize>,
}

impl Reporter {
    pub fn new(verbose: bool, debug: bool) -> Self {
        Self {
            // Debug implies verbose, matching the CLI help text.
            verbose: verbose || debug,
            debug,
            warning_count: Cell::new(0),
        }
    }

    /// Print a warning and bump the warning counter.
    ///
    /// Warnings never change the exit code; they only show up in the
    /// summary line.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.warning_count.set(self.warning_count.get() + 1);
        eprintln!("{} {}", "warning:".bold().yellow(), message.as_ref());
    }

    /// Per-file progress, printed only with `--verbose`.
    pub fn info(&self, message: impl AsRef<str>) {
        if self.verbose {
            eprintln!("{}", message.as_ref());
        }
    }

    /// Resolver decisions and the resolved schedule, printed only with
    /// `--debug`.
    pub fn debug(&self, message: impl AsRef<str>) {
        if self.debug {
            eprintln!("{} {}", "debug:".dimmed(), message.as_ref().dimmed());
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.get()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }
}
