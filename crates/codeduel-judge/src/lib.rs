//! The code execution judge: the external collaborator that runs a
//! submitted program and reports its output.
//!
//! The server never trusts the judge to be fast or correct — every call
//! is bounded by a wall-clock timeout, and every failure mode maps to a
//! [`JudgeError`] that the room reports to the submitter as a failed
//! result, never as a protocol failure.
//!
//! [`Judge`] is a trait so tests can drop in a deterministic
//! implementation; production uses [`SandboxJudge`], which shells out to
//! a sandboxed interpreter.

mod sandbox;

pub use sandbox::SandboxJudge;

use std::time::Duration;

/// Errors a judged execution can produce.
///
/// All of these are *verdict-level* failures: the submission is wrong or
/// unjudgeable, the match carries on.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// The program exceeded the wall-clock budget and was killed.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    /// The sandbox ran but reported a fault (non-zero exit); the string
    /// carries whatever the sandbox printed, for display to the player.
    #[error("{0}")]
    Fault(String),

    /// Spawning or talking to the sandbox process failed.
    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes a submitted program and returns its output.
///
/// `Send + Sync + 'static` so one judge can serve every connection
/// handler task for the lifetime of the server.
pub trait Judge: Send + Sync + 'static {
    /// Runs `source` and resolves to its (trimmed) output.
    ///
    /// Implementations must bound their own execution time; a verdict
    /// may take seconds, never forever.
    fn execute(
        &self,
        source: &str,
    ) -> impl std::future::Future<Output = Result<String, JudgeError>> + Send;
}
