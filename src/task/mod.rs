use std::{
    collections::HashMap,
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, info, warn};

use crate::{Error, Logging, Result, ShellTaskLog};

mod behavior;
mod output;
mod runner;

pub use behavior::ShellTaskBehavior;
pub use output::ShellTaskOutput;
use runner::{RunnerEvent, ShellTaskRunner};

/// A [`ShellTask`] runs a script through an interpreter and provides a passthrough
/// log handler for each line selected by its [`Logging`] mode.
#[derive(Debug)]
pub struct ShellTask {
    script: String,
    bin: String,
    args: Vec<String>,
    current_dir: PathBuf,
    envs: HashMap<OsString, OsString>,
    stdin: Option<String>,
    logging: Logging,
}

fn default_interpreter() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["/bin/sh".to_string(), "-c".to_string()]
    }
}

/// Splits an interpreter into its binary and leading arguments, making sure the binary exists.
fn check_interpreter(script: &str, interpreter: Vec<String>) -> Result<(String, Vec<String>)> {
    let mut interpreter = interpreter.into_iter();
    let bin = interpreter.next().ok_or_else(|| Error::InvalidArgument {
        name: "interpreter",
        reason: "it must name at least a binary".to_string(),
    })?;

    if which::which(&bin).is_err() {
        Err(Error::InvalidTask {
            task: script.to_string(),
            reason: format!("'{}' is not installed on this machine", &bin),
        })
    } else {
        Ok((bin, interpreter.collect()))
    }
}

impl ShellTask {
    /// Create a new [`ShellTask`] that runs `script` with the platform shell
    /// (`/bin/sh -c`, or `cmd /C` on Windows) and forwards both streams to logs.
    pub fn new(script: &str) -> Result<Self> {
        if script.trim().is_empty() {
            return Err(Error::InvalidArgument {
                name: "command",
                reason: "an empty string is not a command".to_string(),
            });
        }

        let current_dir =
            env::current_dir().map_err(|source| Error::CouldNotFindCurrentDirectory { source })?;
        let (bin, args) = check_interpreter(script, default_interpreter())?;

        Ok(Self {
            script: script.to_string(),
            bin,
            args,
            current_dir,
            envs: HashMap::new(),
            stdin: None,
            logging: Logging::StdoutAndStderr,
        })
    }

    /// Replaces the interpreter. The script is passed as its final argument,
    /// e.g. `["python3", "-c"]`.
    pub fn interpreter<I, S>(&mut self, interpreter: I) -> Result<&mut ShellTask>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let interpreter = interpreter.into_iter().map(Into::into).collect();
        let (bin, args) = check_interpreter(&self.script, interpreter)?;
        self.bin = bin;
        self.args = args;
        Ok(self)
    }

    /// Adds an environment variable to the command run by [`ShellTask`].
    pub fn env<K, V>(&mut self, key: K, value: V) -> &mut ShellTask
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.envs
            .insert(key.as_ref().to_os_string(), value.as_ref().to_os_string());
        self
    }

    /// Adds every environment variable in `vars` to the command run by [`ShellTask`].
    pub fn envs<I, K, V>(&mut self, vars: I) -> &mut ShellTask
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        for (key, value) in vars {
            self.env(key, value);
        }
        self
    }

    /// Sets the directory the command should be run in.
    pub fn current_dir<P>(&mut self, path: P) -> &mut ShellTask
    where
        P: AsRef<Path>,
    {
        self.current_dir = path.as_ref().to_path_buf();
        self
    }

    /// Feeds `input` to the command's standard input, which is closed afterwards.
    /// Without it the command reads from a null device.
    pub fn stdin<S>(&mut self, input: S) -> &mut ShellTask
    where
        S: Into<String>,
    {
        self.stdin = Some(input.into());
        self
    }

    /// Selects which streams reach the log handler. Defaults to [`Logging::StdoutAndStderr`].
    pub fn logging(&mut self, logging: Logging) -> &mut ShellTask {
        self.logging = logging;
        self
    }

    /// Returns the script that was used to instantiate this [`ShellTask`].
    pub fn descriptor(&self) -> String {
        self.script.to_string()
    }

    /// Returns the [`ShellTask::descriptor`] with the classic `$` shell prefix.
    pub fn bash_descriptor(&self) -> String {
        format!("$ {}", self.descriptor())
    }

    /// Returns the [`Command`] described by the internal configuration.
    fn get_command(&self) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .args(&self.args)
            .arg(&self.script)
            .envs(&self.envs)
            .current_dir(&self.current_dir);
        command
    }

    /// Run a [`ShellTask`], applying the log handler to each line selected by its [`Logging`] mode.
    ///
    /// Every line is captured in the returned [`ShellTaskOutput`], including lines the
    /// handler never sees.
    ///
    /// You can make the task terminate early if your `log_handler`
    /// returns [`ShellTaskBehavior::EarlyReturn<T>`]. When this variant
    /// is returned from a log handler, the task is killed and [`ShellTask::run`]
    /// returns [`ShellTaskOutput::EarlyReturn`].
    ///
    /// # Example
    ///
    /// ```
    /// use local_command::{Logging, ShellTask, ShellTaskBehavior, ShellTaskLog};
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    ///     let mut task = ShellTask::new("echo hello && echo oops >&2")?;
    ///     task.logging(Logging::Stdout);
    ///     let output = task.run(|line| match line {
    ///         ShellTaskLog::Stdout(message) => ShellTaskBehavior::EarlyReturn(Ok(message)),
    ///         ShellTaskLog::Stderr(_) => ShellTaskBehavior::Passthrough,
    ///     })?;
    ///     assert_eq!(output.return_value(), Some("hello".to_string()));
    ///     Ok(())
    /// }
    /// ```
    ///
    /// If your `log_handler` returns [`ShellTaskBehavior::Passthrough`] for
    /// the entire lifecycle of the task, [`ShellTask::run`] returns
    /// [`ShellTaskOutput::CompleteOutput`].
    ///
    /// # Example
    ///
    /// ```
    /// use local_command::{Logging, ShellTask, ShellTaskBehavior};
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    ///     let mut task = ShellTask::new("echo hello")?;
    ///     task.logging(Logging::None);
    ///     let output = task.run(|_| -> ShellTaskBehavior<()> {
    ///         unreachable!("no lines are logged")
    ///     })?;
    ///     assert_eq!(output.stdout(), "hello");
    ///     Ok(())
    /// }
    /// ```
    pub fn run<F, T>(&self, mut log_handler: F) -> Result<ShellTaskOutput<T>>
    where
        F: FnMut(ShellTaskLog) -> ShellTaskBehavior<T>,
    {
        let task = self.descriptor();
        debug!(task = %task, logging = %self.logging, "running task");

        let mut runner =
            ShellTaskRunner::run(self.get_command(), task.clone(), self.stdin.clone())?;

        let mut stdout_lines = Vec::new();
        let mut stderr_lines = Vec::new();

        while let Ok(event) = runner.events.recv() {
            let line = match event {
                RunnerEvent::Line(line) => line,
                RunnerEvent::Broken(source) => {
                    debug!(task = %task, error = %source, "could not read task output");
                    runner.kill()?;
                    return Err(Error::PoisonedLog { task });
                }
                RunnerEvent::StdinFailed(source) => {
                    runner.kill()?;
                    return Err(Error::CouldNotWriteStdin { task, source });
                }
            };

            let logged = self.logging.includes(&line);
            match &line {
                ShellTaskLog::Stdout(message) => stdout_lines.push(message.clone()),
                ShellTaskLog::Stderr(message) => stderr_lines.push(message.clone()),
            }
            if !logged {
                continue;
            }

            match log_handler(line) {
                ShellTaskBehavior::Passthrough => {}
                ShellTaskBehavior::EarlyReturn(early_return) => {
                    runner.kill()?;
                    let return_value = early_return?;
                    return Ok(ShellTaskOutput::EarlyReturn {
                        stdout_lines,
                        stderr_lines,
                        return_value,
                    });
                }
            }
        }

        let status = runner.child.wait().map_err(|source| Error::CouldNotWait {
            task: task.clone(),
            source,
        })?;
        debug!(task = %task, %status, "task exited");

        if status.success() {
            Ok(ShellTaskOutput::CompleteOutput {
                status,
                stdout_lines,
                stderr_lines,
            })
        } else {
            Err(Error::TaskFailure {
                task,
                exit_status: status,
                stderr: stderr_lines.join("\n"),
            })
        }
    }

    /// Run a [`ShellTask`], forwarding the lines selected by its [`Logging`] mode to
    /// `tracing`: `stdout` at `INFO` and `stderr` at `WARN`.
    pub fn run_logged(&self) -> Result<ShellTaskOutput<()>> {
        let task = self.descriptor();
        self.run(|line| {
            match &line {
                ShellTaskLog::Stdout(message) => info!(task = %task, "{}", message),
                ShellTaskLog::Stderr(message) => warn!(task = %task, "{}", message),
            }
            ShellTaskBehavior::Passthrough
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use tracing::Level;

    use super::*;
    use crate::test_support::record_events;

    fn collect(task: &ShellTask) -> Result<(Vec<ShellTaskLog>, ShellTaskOutput<()>)> {
        let mut seen = Vec::new();
        let output = task.run(|line| {
            seen.push(line);
            ShellTaskBehavior::Passthrough
        })?;
        Ok((seen, output))
    }

    #[test]
    fn rejects_empty_script() {
        assert!(matches!(
            ShellTask::new("   "),
            Err(Error::InvalidArgument { name: "command", .. })
        ));
    }

    #[test]
    fn rejects_missing_interpreter() -> Result<()> {
        let mut task = ShellTask::new("echo hi")?;
        assert!(matches!(
            task.interpreter(["definitely-not-an-interpreter-on-this-machine", "-c"]),
            Err(Error::InvalidTask { .. })
        ));
        assert!(matches!(
            task.interpreter(Vec::<String>::new()),
            Err(Error::InvalidArgument {
                name: "interpreter",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn descriptors() -> Result<()> {
        let task = ShellTask::new("echo hi")?;
        assert_eq!(task.descriptor(), "echo hi");
        assert_eq!(task.bash_descriptor(), "$ echo hi");
        Ok(())
    }

    #[test]
    fn captures_both_streams_whatever_the_logging_mode() -> Result<()> {
        for logging in Logging::ALL {
            let mut task = ShellTask::new("echo out1; echo err1 >&2; echo out2")?;
            task.logging(logging);
            let (seen, output) = collect(&task)?;

            assert_eq!(output.stdout_lines(), ["out1", "out2"]);
            assert_eq!(output.stderr(), "err1");
            assert!(seen.iter().all(|line| logging.includes(line)), "{logging}");

            let stdout_seen = seen.iter().filter(|line| line.is_stdout()).count();
            let stderr_seen = seen.iter().filter(|line| line.is_stderr()).count();
            assert_eq!(stdout_seen, if logging.captures_stdout() { 2 } else { 0 });
            assert_eq!(stderr_seen, if logging.captures_stderr() { 1 } else { 0 });
        }
        Ok(())
    }

    #[test]
    fn keeps_stream_order() -> Result<()> {
        let task = ShellTask::new("for i in 1 2 3 4 5; do echo $i; done")?;
        let (seen, _) = collect(&task)?;
        let messages: Vec<&str> = seen.iter().map(|line| line.message()).collect();
        assert_eq!(messages, ["1", "2", "3", "4", "5"]);
        Ok(())
    }

    #[test]
    fn early_return_stops_the_task() -> Result<()> {
        let task = ShellTask::new("echo ready; sleep 10; echo never")?;
        let output = task.run(|line| match line {
            ShellTaskLog::Stdout(message) => ShellTaskBehavior::EarlyReturn(Ok(message.len())),
            ShellTaskLog::Stderr(_) => ShellTaskBehavior::Passthrough,
        })?;
        assert_eq!(output.stdout_lines(), ["ready"]);
        assert_eq!(output.return_value(), Some(5));
        Ok(())
    }

    #[test]
    fn early_return_errors_surface() -> Result<()> {
        let task = ShellTask::new("echo boom")?;
        let result = task.run(|_| -> ShellTaskBehavior<()> {
            ShellTaskBehavior::EarlyReturn(Err("handler gave up".into()))
        });
        match result {
            Err(Error::EarlyReturn(e)) => assert_eq!(e.to_string(), "handler gave up"),
            other => panic!("expected EarlyReturn, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn non_zero_exit_is_a_failure() -> Result<()> {
        let failing = ShellTask::new("echo bad >&2; exit 3")?;
        match failing.run_logged() {
            Err(Error::TaskFailure {
                exit_status,
                stderr,
                task,
            }) => {
                assert_eq!(exit_status.code(), Some(3));
                assert_eq!(stderr, "bad");
                assert_eq!(task, "echo bad >&2; exit 3");
            }
            other => panic!("expected TaskFailure, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn passes_env_dir_and_stdin() -> Result<()> {
        let dir = env::temp_dir();
        let mut task = ShellTask::new("echo \"$GREETING\"; pwd; cat")?;
        task.env("GREETING", "hello")
            .current_dir(&dir)
            .stdin("from stdin\n")
            .logging(Logging::None);
        let output = task.run_logged()?;

        let lines = output.stdout_lines();
        assert_eq!(lines[0], "hello");
        assert_eq!(
            Path::new(&lines[1]).canonicalize().ok(),
            dir.canonicalize().ok()
        );
        assert_eq!(lines[2], "from stdin");
        Ok(())
    }

    #[test]
    fn run_logged_forwards_selected_stderr_at_warn() -> Result<()> {
        let mut task = ShellTask::new("echo out; echo err >&2")?;
        task.logging(Logging::Stderr);
        let (output, events) = record_events(|| task.run_logged());
        let output = output?;

        assert_eq!(events, [(Level::WARN, "err".to_string())]);
        assert_eq!(output.stdout(), "out");
        assert_eq!(output.stderr(), "err");
        Ok(())
    }

    #[test]
    fn run_logged_forwards_selected_stdout_at_info() -> Result<()> {
        let mut task = ShellTask::new("echo out; echo err >&2")?;
        task.logging(Logging::Stdout);
        let (output, events) = record_events(|| task.run_logged());
        output?;

        assert_eq!(events, [(Level::INFO, "out".to_string())]);
        Ok(())
    }

    #[test]
    fn run_logged_forwards_both_streams_or_nothing() -> Result<()> {
        let mut task = ShellTask::new("echo out; echo err >&2")?;

        task.logging(Logging::StdoutAndStderr);
        let (output, mut events) = record_events(|| task.run_logged());
        output?;
        // the two pipes are read concurrently
        events.sort_by_key(|(level, _)| *level);
        assert_eq!(
            events,
            [
                (Level::WARN, "err".to_string()),
                (Level::INFO, "out".to_string())
            ]
        );

        task.logging(Logging::None);
        let (output, events) = record_events(|| task.run_logged());
        output?;
        assert!(events.is_empty(), "{events:?}");
        Ok(())
    }

    #[test]
    fn decodes_lines_lossily() -> Result<()> {
        let task = ShellTask::new(r"printf 'a\377b\r\nc'")?;
        let output = task.run_logged()?;
        assert_eq!(output.stdout_lines(), ["a\u{FFFD}b", "c"]);
        Ok(())
    }

    #[test]
    fn custom_interpreter() -> Result<()> {
        let mut task = ShellTask::new("echo $0")?;
        task.interpreter(["/bin/sh", "-c"])?;
        let output = task.run_logged()?;
        assert_eq!(output.stdout(), "/bin/sh");
        Ok(())
    }
}
