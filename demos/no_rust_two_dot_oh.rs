use anyhow::{anyhow, Context, Result};
use local_command::{Logging, ShellTask, ShellTaskBehavior, ShellTaskLog};
use semver::Version;

fn main() -> Result<()> {
    // Create a task to check the current version of `rustc` that is installed
    let mut task = ShellTask::new("rustc --version")?;

    // only stdout carries the version
    task.logging(Logging::Stdout);

    // print $ rustc --version to the terminal
    eprintln!("{}", task.bash_descriptor());

    let output = task.run(|line| {
        let ShellTaskLog::Stdout(rustc_version) = line else {
            return ShellTaskBehavior::Passthrough;
        };

        // output looks like this:
        // $ rustc --version
        // rustc 1.63.0 (4b91a6ea7 2022-08-08)
        let rustc_version_parts: Vec<&str> = rustc_version.split(' ').collect();
        let result: std::result::Result<Version, anyhow::Error> =
            if let ["rustc", version, ..] = rustc_version_parts[..] {
                Version::parse(version).with_context(|| format!("'{version}' is not a valid version"))
            } else {
                Err(anyhow!(
                    "`rustc --version` output was malformed: expected 'rustc <version> ...', got '{rustc_version}'."
                ))
            };

        ShellTaskBehavior::EarlyReturn(result.map_err(Box::from))
    })?;

    match output.return_value() {
        // i don't think there will be a rust 2
        // but let's check
        Some(rustc_version) if rustc_version.major == 1 => {
            eprintln!("🦀 rustc v{}", &rustc_version);
            Ok(())
        }
        Some(rustc_version) => Err(anyhow!(
            "invalid `rustc --version` output: v{rustc_version}. the major version must be 1"
        )),
        None => Err(anyhow!("`rustc --version` printed nothing to stdout")),
    }
}
