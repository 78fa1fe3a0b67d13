//! Subprocess-backed judge: feeds the program to a sandbox interpreter
//! on stdin and captures what it prints.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{Judge, JudgeError};

/// A [`Judge`] that spawns a configured sandbox command per submission.
///
/// The submitted source is written to the child's stdin; stdout is the
/// verdict output. A non-zero exit becomes [`JudgeError::Fault`] carrying
/// the combined output, and the whole run is bounded by `timeout` —
/// on expiry the child is killed (`kill_on_drop`) and the submitter gets
/// a timeout verdict.
#[derive(Debug, Clone)]
pub struct SandboxJudge {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SandboxJudge {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }
}

impl Judge for SandboxJudge {
    async fn execute(&self, source: &str) -> Result<String, JudgeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| JudgeError::Fault("sandbox stdin unavailable".into()))?;

        let source = source.to_owned();
        let run = async move {
            stdin.write_all(source.as_bytes()).await?;
            drop(stdin); // EOF tells the sandbox the program is complete
            child.wait_with_output().await
        };

        // On expiry the future is dropped, which drops the child and —
        // with kill_on_drop — reaps the sandbox process.
        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "sandbox execution timed out");
                return Err(JudgeError::Timeout(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(JudgeError::Fault(format!(
                "sandbox exited with {}:\n{}{}",
                output.status, stdout, stderr
            )));
        }

        Ok(stdout.trim_end_matches(['\r', '\n']).to_owned())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, unix))]
mod tests {
    //! These shell out to ubiquitous unix tools instead of a real
    //! sandbox, which keeps them hermetic and fast.

    use super::*;

    fn judge(program: &str, args: &[&str], timeout_ms: u64) -> SandboxJudge {
        SandboxJudge::new(
            program.into(),
            args.iter().map(|s| s.to_string()).collect(),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test]
    async fn test_execute_returns_stdout() {
        // `cat` echoes the submitted source straight back.
        let out = judge("cat", &[], 5_000).execute("hello sandbox").await.unwrap();
        assert_eq!(out, "hello sandbox");
    }

    #[tokio::test]
    async fn test_execute_trims_trailing_newlines() {
        let out = judge("cat", &[], 5_000).execute("42\n\n").await.unwrap();
        assert_eq!(out, "42");
    }

    #[tokio::test]
    async fn test_execute_times_out_and_kills() {
        let result = judge("sh", &["-c", "cat >/dev/null; sleep 30"], 100)
            .execute("anything")
            .await;
        assert!(matches!(result, Err(JudgeError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_execute_nonzero_exit_is_fault_with_output() {
        let result = judge("sh", &["-c", "cat >/dev/null; echo boom; exit 3"], 5_000)
            .execute("anything")
            .await;
        match result {
            Err(JudgeError::Fault(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_missing_program_is_io_error() {
        let result = judge("/definitely/not/a/binary", &[], 1_000)
            .execute("anything")
            .await;
        assert!(matches!(result, Err(JudgeError::Io(_))));
    }
}
