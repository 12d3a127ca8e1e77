use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Logging, Result, ShellTask};

/// The inputs of a local command: what to run on create and delete, and how.
///
/// # Examples
///
/// ```
/// use local_command::{CommandInputs, Logging};
///
/// let inputs = CommandInputs::from_json(r#"{"create": "echo hi", "logging": "stderr"}"#)?;
/// assert_eq!(inputs.logging, Some(Logging::Stderr));
/// assert_eq!(inputs.logging_str(), "stderr");
/// # Ok::<(), local_command::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInputs {
    /// The script to run on create.
    pub create: String,

    /// The script to run on delete. Nothing runs when it is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    /// The directory from which to run the scripts. Defaults to the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Additional environment variables, on top of the inherited environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// The program and leading arguments used to run the scripts.
    /// Unset or empty falls back to `/bin/sh -c` (`cmd /C` on Windows).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Passed to the scripts' standard input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    /// Which output streams are forwarded to logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
}

impl CommandInputs {
    /// Creates inputs that run `create` with every other setting left unset.
    pub fn new(create: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            ..Self::default()
        }
    }

    /// Reads inputs from their JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes inputs to their JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The logging mode in effect: [`Logging::StdoutAndStderr`] when unset.
    pub fn logging_or_default(&self) -> Logging {
        self.logging.unwrap_or(Logging::StdoutAndStderr)
    }

    /// The raw logging string, empty when unset.
    pub fn logging_str(&self) -> &'static str {
        self.logging.map(|logging| logging.as_str()).unwrap_or("")
    }

    fn task(&self, script: &str) -> Result<ShellTask> {
        let mut task = ShellTask::new(script)?;
        if let Some(interpreter) = self.interpreter.as_ref().filter(|i| !i.is_empty()) {
            task.interpreter(interpreter.iter().cloned())?;
        }
        if let Some(dir) = &self.dir {
            task.current_dir(dir);
        }
        if let Some(stdin) = &self.stdin {
            task.stdin(stdin.as_str());
        }
        task.envs(&self.environment)
            .logging(self.logging_or_default());
        Ok(task)
    }
}

/// The outputs of a local command: its inputs plus what the create script printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutputs {
    /// The inputs the command was created with.
    #[serde(flatten)]
    pub inputs: CommandInputs,

    /// Everything the create script printed to `stdout`.
    pub stdout: String,

    /// Everything the create script printed to `stderr`.
    pub stderr: String,
}

/// Runs the lifecycle scripts of a local command.
///
/// A command fails when its script exits with a non-zero status.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCommand;

impl LocalCommand {
    /// Runs the `create` script, forwarding the selected streams to logs and
    /// capturing both in the outputs.
    pub fn create(inputs: &CommandInputs) -> Result<CommandOutputs> {
        info!(command = %inputs.create, logging = %inputs.logging_or_default(), "creating command");
        let output = inputs.task(&inputs.create)?.run_logged()?;
        Ok(CommandOutputs {
            inputs: inputs.clone(),
            stdout: output.stdout(),
            stderr: output.stderr(),
        })
    }

    /// Runs the `delete` script with the settings the command was created with.
    /// Does nothing when no `delete` script was given.
    pub fn delete(outputs: &CommandOutputs) -> Result<()> {
        let inputs = &outputs.inputs;
        match &inputs.delete {
            Some(delete) => {
                info!(command = %delete, "deleting command");
                inputs.task(delete)?.run_logged()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
