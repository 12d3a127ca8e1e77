use std::{
    io::{self, BufRead, BufReader, Read, Write},
    process::{Child, ChildStdin, Command, Stdio},
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::{Error, Result, ShellTaskLog};

/// Something that happened while a [`ShellTaskRunner`] was streaming output.
#[derive(Debug)]
pub(crate) enum RunnerEvent {
    /// A complete line from one of the output pipes.
    Line(ShellTaskLog),

    /// Reading an output pipe failed; no further lines will arrive from it.
    Broken(io::Error),

    /// Writing the configured stdin failed.
    StdinFailed(io::Error),
}

/// Runs a [`ShellTask`](crate::ShellTask) in the background, reporting all logs and errors.
///
/// The events channel disconnects once both output pipes reach EOF and stdin has been written.
#[derive(Debug)]
pub(crate) struct ShellTaskRunner {
    pub(crate) child: Child,
    pub(crate) events: Receiver<RunnerEvent>,
    task: String,
    // one thread per pipe so a blocked reader never starves the others
    _pool: ThreadPool,
}

impl ShellTaskRunner {
    pub(crate) fn run(command: Command, task: String, stdin: Option<String>) -> Result<Self> {
        let mut command = command;
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        command.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let pool = ThreadPoolBuilder::new()
            .num_threads(3)
            .thread_name(|i| format!("local-command-io-{i}"))
            .build()
            .map_err(|e| Error::CouldNotSpawn {
                task: task.clone(),
                source: io::Error::new(io::ErrorKind::Other, e),
            })?;

        let mut child = command.spawn().map_err(|source| Error::CouldNotSpawn {
            task: task.clone(),
            source,
        })?;
        debug!(task = %task, pid = child.id(), "spawned task");

        let (event_sender, events) = unbounded();

        if let Some(stdout) = child.stdout.take() {
            spawn_reader(&pool, stdout, ShellTaskLog::Stdout, event_sender.clone());
        }

        if let Some(stderr) = child.stderr.take() {
            spawn_reader(&pool, stderr, ShellTaskLog::Stderr, event_sender.clone());
        }

        if let (Some(pipe), Some(input)) = (child.stdin.take(), stdin) {
            spawn_writer(&pool, pipe, input, event_sender);
        }

        Ok(Self {
            child,
            events,
            task,
            _pool: pool,
        })
    }

    /// Terminates the child and reaps it. A child that already exited is not an error.
    pub(crate) fn kill(&mut self) -> Result<()> {
        match self.child.kill() {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(source) => {
                return Err(Error::CouldNotKill {
                    task: self.task.clone(),
                    source,
                })
            }
        }
        let status = self.child.wait().map_err(|source| Error::CouldNotWait {
            task: self.task.clone(),
            source,
        })?;
        debug!(task = %self.task, %status, "killed task");
        Ok(())
    }
}

fn spawn_reader<R>(
    pool: &ThreadPool,
    pipe: R,
    wrap: fn(String) -> ShellTaskLog,
    event_sender: Sender<RunnerEvent>,
) where
    R: Read + Send + 'static,
{
    pool.spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if buf.ends_with(b"\n") {
                        buf.pop();
                        if buf.ends_with(b"\r") {
                            buf.pop();
                        }
                    }
                    let line = wrap(String::from_utf8_lossy(&buf).into_owned());
                    trace!(?line, "read line");
                    if event_sender.send(RunnerEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let _ = event_sender.send(RunnerEvent::Broken(e));
                    break;
                }
            }
        }
    });
}

fn spawn_writer(
    pool: &ThreadPool,
    mut pipe: ChildStdin,
    input: String,
    event_sender: Sender<RunnerEvent>,
) {
    pool.spawn(move || {
        // the script may exit without reading everything it was given
        if let Err(e) = pipe.write_all(input.as_bytes()) {
            if e.kind() != io::ErrorKind::BrokenPipe {
                let _ = event_sender.send(RunnerEvent::StdinFailed(e));
            }
        }
    });
}
