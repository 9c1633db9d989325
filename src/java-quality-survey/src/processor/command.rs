//! Running external commands.

use crate::config::CommandSpec;
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Failure of an external command.
#[derive(Debug)]
pub(crate) enum CommandFailure {
    /// The program could not be started.
    Spawn(std::io::Error),

    /// The program ran and exited unsuccessfully.
    Status(Output),
}

impl CommandFailure {
    /// Renders the failure for logs, preferring the program's stderr.
    pub(crate) fn describe(&self, program: &str) -> String {
        match self {
            Self::Spawn(e) => format!("Failed to execute {program}: {e}"),
            Self::Status(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                format!(
                    "{program} exited with {}: {}",
                    output.status,
                    stderr.trim()
                )
            }
        }
    }
}

/// Runs `spec` with `extra` appended, capturing output.
pub(crate) async fn run_command<I, S>(spec: &CommandSpec, extra: I) -> Result<Output, CommandFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .args(extra)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program = %spec.program, "Running external command");
    let output = command.output().await.map_err(CommandFailure::Spawn)?;

    if !output.status.success() {
        return Err(CommandFailure::Status(output));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let spec = CommandSpec::new("sh").arg("-c").arg("echo boom >&2; exit 3");

        let failure = run_command(&spec, Vec::<String>::new()).await.unwrap_err();

        let message = failure.describe("sh");
        assert!(message.contains("boom"), "{message}");
    }

    #[tokio::test]
    async fn reports_missing_program() {
        let spec = CommandSpec::new("definitely-not-an-installed-program-4f2a");

        let failure = run_command(&spec, ["x"]).await.unwrap_err();

        assert!(matches!(failure, CommandFailure::Spawn(_)));
    }

    #[tokio::test]
    async fn appends_extra_arguments() {
        let spec = CommandSpec::new("sh").arg("-c").arg("test \"$0\" = first");

        assert!(run_command(&spec, ["first"]).await.is_ok());
    }
}
