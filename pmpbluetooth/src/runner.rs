//! Process-executor capability
//!
//! Bluetooth and audio routing are driven through external CLI tools. The
//! [`CommandRunner`] trait isolates that capability so the router's logic
//! can run against a scripted mock in tests, and so every invocation
//! carries an explicit timeout.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Outcome of one external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited with status zero
    pub success: bool,
    /// Combined stdout/stderr, trimmed
    pub output: String,
}

impl CommandOutput {
    /// A failed invocation carrying a diagnostic message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Executes one shell command with a hard timeout
///
/// Implementations never panic and never block past the timeout: a spawn
/// failure, non-zero exit or expired deadline all come back as a
/// `success: false` output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, timeout: Duration) -> CommandOutput;
}

/// Real runner shelling out through `sh -c`
///
/// The command strings use pipes (`pactl … | grep … | cut …`), so a shell
/// is required rather than a direct exec.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, timeout: Duration) -> CommandOutput {
        debug!(command, "Running external command");

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(stderr);
                }
                CommandOutput {
                    success: output.status.success(),
                    output: text,
                }
            }
            Ok(Err(e)) => {
                warn!(command, error = %e, "Failed to spawn external command");
                CommandOutput::failure(e.to_string())
            }
            Err(_) => {
                warn!(command, timeout_secs = timeout.as_secs(), "External command timed out");
                CommandOutput::failure(format!("timed out after {}s", timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_of_successful_command() {
        let out = ShellRunner.run("echo hello", Duration::from_secs(5)).await;
        assert!(out.success);
        assert_eq!(out.output, "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_failure() {
        let out = ShellRunner.run("exit 3", Duration::from_secs(5)).await;
        assert!(!out.success);
    }

    #[tokio::test]
    async fn test_timeout_reports_failure_instead_of_hanging() {
        let out = ShellRunner.run("sleep 10", Duration::from_millis(100)).await;
        assert!(!out.success);
        assert!(out.output.contains("timed out"));
    }
}
