use anyhow::Result;
use local_command::{CommandInputs, LocalCommand};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let inputs = CommandInputs::from_json(
        r#"{
            "create": "echo \"hello, $NAME\"; echo 'this goes to stderr' >&2",
            "delete": "echo goodbye",
            "environment": { "NAME": "world" },
            "logging": "stdout"
        }"#,
    )?;

    let outputs = LocalCommand::create(&inputs)?;
    println!("{}", serde_json::to_string_pretty(&outputs)?);

    LocalCommand::delete(&outputs)?;
    Ok(())
}
