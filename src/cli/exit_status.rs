use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): the run completed; per-file warnings do not change
///   the exit code.
/// - `Error` (2): the command failed before indexing completed (missing
///   or contradictory configuration, internal I/O error).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
