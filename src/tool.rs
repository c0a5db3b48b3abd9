//! Shared external-tool invocation helpers.

use crate::error::{Result, SkiveError};
use crate::files::truncate_diagnostic;
use std::process::Output;
use tokio::process::Command;

/// Run an external tool to completion, mapping a missing binary to
/// `ToolNotFound`.
pub(crate) async fn run(tool: &str, cmd: &mut Command) -> Result<Output> {
    match cmd.output().await {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkiveError::ToolNotFound(tool.to_string()))
        }
        Err(e) => Err(SkiveError::ToolFailed(format!(
            "{tool} failed to start: {e}"
        ))),
    }
}

/// Fail with a bounded diagnostic if the tool exited non-zero.
pub(crate) fn check(tool: &str, operation: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(SkiveError::ToolFailed(format!(
        "{tool} {operation} failed: {}",
        truncate_diagnostic(stderr.trim())
    )))
}
