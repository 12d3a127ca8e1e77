#[cfg(doc)]
use crate::ShellTask;

/// A log line emitted by a [`ShellTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellTaskLog {
    /// A line emitted to `stdout`
    Stdout(String),

    /// A line emitted to `stderr`
    Stderr(String),
}

impl ShellTaskLog {
    /// The line itself, without the trailing newline.
    pub fn message(&self) -> &str {
        match self {
            ShellTaskLog::Stdout(message) | ShellTaskLog::Stderr(message) => message,
        }
    }

    /// Returns `true` if the line came from `stdout`.
    pub fn is_stdout(&self) -> bool {
        matches!(self, ShellTaskLog::Stdout(_))
    }

    /// Returns `true` if the line came from `stderr`.
    pub fn is_stderr(&self) -> bool {
        matches!(self, ShellTaskLog::Stderr(_))
    }
}
