//! Exec probe executor: spawns a command and checks its exit code.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, Result};
use crate::kind::ExecProbeSpec;

/// Spawn `command args...`, stream stdout/stderr to the debug log, and
/// succeed iff the exit code is one of `exit_codes`. A non-zero code not in
/// the set is a distinct failure from a spawn error. The child is killed if
/// the cancellation token fires before it exits.
pub async fn run(spec: &ExecProbeSpec, cancel: CancellationToken) -> Result<()> {
    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    if let Some(user) = &spec.user {
        if let Some(uid) = resolve_uid(user) {
            std::os::unix::process::CommandExt::uid(&mut cmd, uid);
        }
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| ProbeError::Spawn(e.to_string()))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    if let Some(stdout) = stdout {
        tokio::spawn(drain_lines(stdout, "stdout"));
    }
    if let Some(stderr) = stderr {
        tokio::spawn(drain_lines(stderr, "stderr"));
    }

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = child.start_kill();
            return Err(ProbeError::Cancelled);
        }
        result = child.wait() => result.map_err(|e| ProbeError::Spawn(e.to_string()))?,
    };

    let code = status.code().unwrap_or(-1);
    if !spec.exit_codes.contains(&code) {
        return Err(ProbeError::UnexpectedExitCode {
            got: code,
            expected: spec.exit_codes.clone(),
        });
    }

    Ok(())
}

async fn drain_lines<R: tokio::io::AsyncRead + Unpin>(reader: R, stream: &'static str) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::debug!(stream, %line, "exec probe output"),
            Ok(None) | Err(_) => break,
        }
    }
}

#[cfg(unix)]
fn resolve_uid(user: &str) -> Option<u32> {
    user.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn success_on_expected_exit_code() {
        let spec = ExecProbeSpec {
            command: "true".into(),
            args: vec![],
            user: None,
            exit_codes: vec![0],
        };
        assert!(run(&spec, CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn failure_on_unexpected_exit_code() {
        let spec = ExecProbeSpec {
            command: "false".into(),
            args: vec![],
            user: None,
            exit_codes: vec![0],
        };
        let err = run(&spec, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ProbeError::UnexpectedExitCode { got: 1, .. }));
    }
}
