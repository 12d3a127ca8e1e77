use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ShellTaskLog};

#[cfg(doc)]
use crate::ShellTask;

/// [`Logging`] selects which output streams of a [`ShellTask`] are forwarded to logs.
///
/// Both streams are always captured in the task output; this only decides which
/// lines reach the log handler. On the wire each mode is its raw string:
/// `stdout`, `stderr`, `stdoutAndStderr` or `none`.
///
/// # Examples
///
/// ```
/// use local_command::Logging;
///
/// let logging: Logging = "stdoutAndStderr".parse()?;
/// assert_eq!(logging, Logging::StdoutAndStderr);
/// assert_eq!(logging.as_str(), "stdoutAndStderr");
/// assert!("verbose".parse::<Logging>().is_err());
/// # Ok::<(), local_command::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Logging {
    /// Capture stdout in logs but not stderr
    Stdout,

    /// Capture stderr in logs but not stdout
    Stderr,

    /// Capture stdout and stderr in logs
    StdoutAndStderr,

    /// Capture no logs
    None,
}

impl Logging {
    /// Every mode, in declaration order.
    pub const ALL: [Logging; 4] = [
        Logging::Stdout,
        Logging::Stderr,
        Logging::StdoutAndStderr,
        Logging::None,
    ];

    /// The raw string this mode is represented by on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Logging::Stdout => "stdout",
            Logging::Stderr => "stderr",
            Logging::StdoutAndStderr => "stdoutAndStderr",
            Logging::None => "none",
        }
    }

    /// Whether lines written to `stdout` are forwarded to logs.
    pub const fn captures_stdout(&self) -> bool {
        matches!(self, Logging::Stdout | Logging::StdoutAndStderr)
    }

    /// Whether lines written to `stderr` are forwarded to logs.
    pub const fn captures_stderr(&self) -> bool {
        matches!(self, Logging::Stderr | Logging::StdoutAndStderr)
    }

    /// Whether `line` should be forwarded to logs under this mode.
    pub fn includes(&self, line: &ShellTaskLog) -> bool {
        match line {
            ShellTaskLog::Stdout(_) => self.captures_stdout(),
            ShellTaskLog::Stderr(_) => self.captures_stderr(),
        }
    }
}

impl fmt::Display for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Logging {
    type Err = Error;

    /// Parses the raw wire string. Matching is exact and case-sensitive.
    fn from_str(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::InvalidArgument {
                name: "logging",
                reason: "the value must not be empty".to_string(),
            });
        }

        Logging::ALL
            .into_iter()
            .find(|logging| logging.as_str() == value)
            .ok_or_else(|| Error::InvalidArgument {
                name: "logging",
                reason: format!(
                    "'{}' is not one of {}",
                    value,
                    Logging::ALL.map(|logging| logging.as_str()).join(", ")
                ),
            })
    }
}

impl TryFrom<&str> for Logging {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<String> for Logging {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Logging> for &'static str {
    fn from(logging: Logging) -> Self {
        logging.as_str()
    }
}

impl From<Logging> for String {
    fn from(logging: Logging) -> Self {
        logging.as_str().to_string()
    }
}
