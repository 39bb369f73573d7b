//! Subprocess supervision module
//!
//! Spawns the external interpreter and owns the child for its whole
//! lifetime: stdout is streamed to the log line by line as it arrives,
//! stderr is buffered, and the task resolves to a structured outcome
//! (exit status plus captured streams) or a typed error. The spawning
//! handler gets back a handle it can join or abort; dropping the handle
//! leaves the relay running detached.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::RelayConfig;
use crate::logger;

use super::token::CommandToken;

/// Failure modes of a relay invocation
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to spawn '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        source: std::io::Error,
    },
    #[error("subprocess stdio was not captured")]
    MissingStdio,
    #[error("failed to wait for subprocess: {0}")]
    Wait(#[from] std::io::Error),
    #[error("subprocess exceeded the {0}s timeout and was killed")]
    TimedOut(u64),
    #[error("relay task was cancelled before completing")]
    Cancelled,
}

/// Structured result of a finished relay subprocess
#[derive(Debug)]
pub struct RelayOutcome {
    pub token: CommandToken,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Handle to a running relay task
pub struct RelayHandle {
    id: u64,
    task: JoinHandle<Result<RelayOutcome, RelayError>>,
}

impl RelayHandle {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the relay; the subprocess is killed with it
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the relay to finish and take its outcome
    pub async fn join(self) -> Result<RelayOutcome, RelayError> {
        match self.task.await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Cancelled),
        }
    }
}

/// Spawn the external interpreter with `[script, token]` as arguments.
///
/// Returns as soon as the child is running; supervision continues in a
/// background task that logs stdout as it arrives (tagged with the
/// relay id, so concurrent relays stay distinguishable) and reports the
/// final outcome to the log.
pub fn spawn_relay(
    cfg: &RelayConfig,
    token: CommandToken,
    id: u64,
) -> Result<RelayHandle, RelayError> {
    let mut command = Command::new(&cfg.interpreter);
    command
        .arg(&cfg.script)
        .arg(token.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // An aborted relay task must not leave the child behind
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| RelayError::Spawn {
        interpreter: cfg.interpreter.clone(),
        source,
    })?;

    logger::log_relay_started(id, &cfg.interpreter, &cfg.script, token.as_str());

    let timeout_secs = cfg.timeout_secs;
    let task = tokio::spawn(async move {
        let result = supervise(child, token, id, timeout_secs).await;
        match &result {
            Ok(outcome) => {
                logger::log_relay_finished(id, &outcome.status);
                if !outcome.stderr.is_empty() {
                    logger::log_relay_stderr(id, &outcome.stderr);
                }
            }
            Err(e) => logger::log_error(&format!("[RELAY #{id}] {e}")),
        }
        result
    });

    Ok(RelayHandle { id, task })
}

/// Drive the child to completion under the configured timeout
async fn supervise(
    mut child: Child,
    token: CommandToken,
    id: u64,
    timeout_secs: u64,
) -> Result<RelayOutcome, RelayError> {
    let stdout = child.stdout.take().ok_or(RelayError::MissingStdio)?;
    let stderr = child.stderr.take().ok_or(RelayError::MissingStdio)?;

    let capture = async {
        let stdout_capture = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut buffer = String::new();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        logger::log_relay_output(id, &line);
                        buffer.push_str(&line);
                        buffer.push('\n');
                    }
                    Ok(None) => break,
                    Err(e) => {
                        logger::log_warning(&format!("[RELAY #{id}] stdout read error: {e}"));
                        break;
                    }
                }
            }
            buffer
        };

        let stderr_capture = async {
            let mut buffer = String::new();
            if let Err(e) = BufReader::new(stderr).read_to_string(&mut buffer).await {
                logger::log_warning(&format!("[RELAY #{id}] stderr read error: {e}"));
            }
            buffer
        };

        let (stdout_buf, stderr_buf, status) =
            tokio::join!(stdout_capture, stderr_capture, child.wait());
        Ok::<_, RelayError>((stdout_buf, stderr_buf, status?))
    };

    let result = tokio::time::timeout(Duration::from_secs(timeout_secs), capture).await;
    match result {
        Ok(Ok((stdout, stderr, status))) => Ok(RelayOutcome {
            token,
            status,
            stdout,
            stderr,
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            if let Err(e) = child.kill().await {
                logger::log_warning(&format!("[RELAY #{id}] failed to kill subprocess: {e}"));
            }
            Err(RelayError::TimedOut(timeout_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;

    fn relay_config(interpreter: &str, script: &str, timeout_secs: u64) -> RelayConfig {
        RelayConfig {
            interpreter: interpreter.to_string(),
            script: script.to_string(),
            timeout_secs,
        }
    }

    fn write_script(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "hydrus-relay-script-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn passes_script_and_token_as_arguments() {
        let cfg = relay_config("echo", "hydrus-call", 5);
        let handle = spawn_relay(&cfg, CommandToken::ApiVersion, 1).unwrap();
        let outcome = handle.join().await.unwrap();
        assert!(outcome.status.success());
        assert_eq!(outcome.stdout, "hydrus-call api_ver\n");
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn concurrent_relays_do_not_share_output() {
        let first =
            spawn_relay(&relay_config("echo", "first-script", 5), CommandToken::ApiVersion, 2)
                .unwrap();
        let second =
            spawn_relay(&relay_config("echo", "second-script", 5), CommandToken::ApiVersion, 3)
                .unwrap();
        let (a, b) = tokio::join!(first.join(), second.join());
        assert_eq!(a.unwrap().stdout, "first-script api_ver\n");
        assert_eq!(b.unwrap().stdout, "second-script api_ver\n");
    }

    #[tokio::test]
    async fn missing_interpreter_is_a_spawn_error() {
        let cfg = relay_config("hydrus-relay-no-such-interpreter", "script", 5);
        let err = spawn_relay(&cfg, CommandToken::ApiVersion, 4)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, RelayError::Spawn { .. }));
    }

    #[tokio::test]
    async fn captures_stderr_and_exit_code() {
        let script = write_script("stderr.sh", "echo oops >&2\nexit 3\n");
        let cfg = relay_config("sh", &script, 5);
        let outcome = spawn_relay(&cfg, CommandToken::ApiVersion, 5)
            .unwrap()
            .join()
            .await
            .unwrap();
        assert_eq!(outcome.status.code(), Some(3));
        assert!(outcome.stderr.contains("oops"));
        let _ = std::fs::remove_file(script);
    }

    #[tokio::test]
    async fn kills_subprocess_on_timeout() {
        let script = write_script("sleep.sh", "sleep 30\n");
        let cfg = relay_config("sh", &script, 1);
        let err = spawn_relay(&cfg, CommandToken::ApiVersion, 6)
            .unwrap()
            .join()
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::TimedOut(1)));
        let _ = std::fs::remove_file(script);
    }

    #[tokio::test]
    async fn aborted_relay_reports_cancellation() {
        let script = write_script("abort.sh", "sleep 30\n");
        let cfg = relay_config("sh", &script, 30);
        let handle = spawn_relay(&cfg, CommandToken::ApiVersion, 7).unwrap();
        handle.abort();
        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, RelayError::Cancelled));
        let _ = std::fs::remove_file(script);
    }
}
