use std::process::ExitStatus;

/// ShellTaskOutput is returned by `ShellTask::run` and contains information about the task on completion.
///
/// Both streams are captured in full whatever the task's logging mode was.
/// Lines are split on `\n` (a trailing `\r` is dropped) and decoded lossily: bytes that
/// are not valid UTF-8 become `U+FFFD`.
#[derive(Debug)]
pub enum ShellTaskOutput<T> {
    /// This variant is returned when the specified log handler returns early.
    EarlyReturn {
        /// The lines printed to `stdout` by the task up until the point of early return.
        stdout_lines: Vec<String>,

        /// The lines printed to `stderr` by the task up until the point of early return.
        stderr_lines: Vec<String>,

        /// The early return value.
        return_value: T,
    },

    /// This variant is returned when the specified log handler did not return early.
    CompleteOutput {
        /// The exit status of the task.
        status: ExitStatus,

        /// The lines printed to `stdout` by the task.
        stdout_lines: Vec<String>,

        /// The lines printed to `stderr` by the task.
        stderr_lines: Vec<String>,
    },
}

impl<T> ShellTaskOutput<T> {
    /// The captured `stdout` lines.
    pub fn stdout_lines(&self) -> &[String] {
        match self {
            ShellTaskOutput::EarlyReturn { stdout_lines, .. }
            | ShellTaskOutput::CompleteOutput { stdout_lines, .. } => stdout_lines,
        }
    }

    /// The captured `stderr` lines.
    pub fn stderr_lines(&self) -> &[String] {
        match self {
            ShellTaskOutput::EarlyReturn { stderr_lines, .. }
            | ShellTaskOutput::CompleteOutput { stderr_lines, .. } => stderr_lines,
        }
    }

    /// The captured `stdout`, lines joined with `\n`.
    pub fn stdout(&self) -> String {
        self.stdout_lines().join("\n")
    }

    /// The captured `stderr`, lines joined with `\n`.
    pub fn stderr(&self) -> String {
        self.stderr_lines().join("\n")
    }

    /// The value a log handler returned early with, if any.
    pub fn return_value(self) -> Option<T> {
        match self {
            ShellTaskOutput::EarlyReturn { return_value, .. } => Some(return_value),
            ShellTaskOutput::CompleteOutput { .. } => None,
        }
    }
}
