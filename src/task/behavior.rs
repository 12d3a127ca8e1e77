#[cfg(doc)]
use crate::Logging;

/// The type of error that can be returned by log handlers when running tasks.
type UserDefinedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result that can be returned by log handlers when running tasks.
type UserDefinedResult<T> = std::result::Result<T, UserDefinedError>;

/// [`ShellTaskBehavior`] allows you to terminate a process
/// early, or to continue inside your log handler.
///
/// Log handlers only see the lines selected by the task's [`Logging`] mode,
/// so a task run with [`Logging::None`] can never return early.
///
/// ```
/// use local_command::{Logging, ShellTask, ShellTaskBehavior, ShellTaskOutput};
///
/// fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
///     let mut task = ShellTask::new("echo stop")?;
///     task.logging(Logging::None);
///     let output = task.run(|line| ShellTaskBehavior::EarlyReturn(Ok(line)))?;
///     assert!(matches!(output, ShellTaskOutput::CompleteOutput { .. }));
///     assert_eq!(output.stdout(), "stop");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub enum ShellTaskBehavior<T> {
    /// When a log handler returns this variant after processing a log line,
    /// the underlying process is terminated and the underlying [`Result`] is returned.
    EarlyReturn(UserDefinedResult<T>),

    /// When a log handler returns this variant after processing a log line,
    /// the process is allowed to continue.
    Passthrough,
}
