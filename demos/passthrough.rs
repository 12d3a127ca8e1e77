use local_command::{Logging, ShellTask, ShellTaskBehavior, ShellTaskLog};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut task = ShellTask::new("rustc --version && cargo --version >&2")?;
    task.logging(Logging::StdoutAndStderr);
    // print $ rustc --version && cargo --version >&2 to the terminal
    eprintln!("{}", task.bash_descriptor());
    let _ = task.run(|line| -> ShellTaskBehavior<()> {
        match line {
            ShellTaskLog::Stdout(message) => eprintln!("stdout: {}", &message),
            ShellTaskLog::Stderr(message) => eprintln!("stderr: {}", &message),
        }
        ShellTaskBehavior::Passthrough
    })?;
    Ok(())
}
