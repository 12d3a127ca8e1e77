#[cfg(doc)]
use crate::{Logging, ShellTask};

use thiserror::Error as ThisError;

use std::{io, process::ExitStatus};

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors reported by a [`ShellTask`] and the types that configure it.
#[derive(ThisError, Debug)]
pub enum Error {
    /// This error occurs when a value could not be constructed from the argument it was given,
    /// for example when parsing a [`Logging`] from a string it does not recognize.
    #[error("invalid {name}: {reason}.")]
    InvalidArgument {
        /// The name of the rejected argument.
        name: &'static str,

        /// Why the argument was rejected.
        reason: String,
    },

    /// This error occurs when a command exits with a status other than 0.
    #[error("'{task}' failed with {exit_status}.")]
    TaskFailure {
        /// The task that failed.
        task: String,

        /// The exit status that was returned.
        exit_status: ExitStatus,

        /// Everything the task printed to `stderr` before it exited.
        stderr: String,
    },

    /// This error occurs when a task could not be instantiated because it was malformed.
    /// This is a usage error, make sure you've typed the command correctly.
    #[error("'{task}' is not a valid command because {reason}.")]
    InvalidTask {
        /// The malformed task.
        task: String,

        /// The reason the task was malformed.
        reason: String,
    },

    /// The working directory of the current process could not be determined.
    #[error("could not find the current directory: {source}.")]
    CouldNotFindCurrentDirectory {
        /// The [`io::Error`] that was reported by [`std::env::current_dir`].
        source: io::Error,
    },

    /// This error occurs when a task could not spawn. Originates from [`std::process::Command::spawn`].
    #[error("could not spawn '{task}': {source}.")]
    CouldNotSpawn {
        /// The task that could not spawn.
        task: String,

        /// The [`io::Error`] that was reported by [`std::process::Command::spawn`].
        source: io::Error,
    },

    /// There was an error waiting for the task status. Originates from [`std::process::Child::wait`].
    #[error("could not wait for '{task}' to complete: {source}.")]
    CouldNotWait {
        /// The task that could not be waited for.
        task: String,

        /// The [`io::Error`] that was reported by [`std::process::Child::wait`].
        source: io::Error,
    },

    /// The task could not be terminated after a log handler returned early.
    #[error("could not kill '{task}': {source}.")]
    CouldNotKill {
        /// The task that could not be killed.
        task: String,

        /// The [`io::Error`] that was reported by [`std::process::Child::kill`].
        source: io::Error,
    },

    /// The configured `stdin` could not be written to the task.
    #[error("could not write stdin of '{task}': {source}.")]
    CouldNotWriteStdin {
        /// The task whose stdin failed.
        task: String,

        /// The underlying [`io::Error`].
        source: io::Error,
    },

    /// The log pipeline of a running task broke down before all lines were delivered.
    #[error("the logs for '{task}' could not be processed.")]
    PoisonedLog {
        /// The task whose logs were lost.
        task: String,
    },

    /// Command inputs could not be read from or written to JSON.
    #[error("invalid command configuration: {source}.")]
    InvalidConfiguration {
        /// The error reported by `serde_json`.
        #[from]
        source: serde_json::Error,
    },

    /// This error can be returned from log handlers to terminate early.
    #[error(transparent)]
    EarlyReturn(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}
