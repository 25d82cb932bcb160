use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use intel_core::model::RemoteHost;
use intel_core::RemoteExecError;
use tokio::sync::Mutex;

/// Synthetic exit code: the local program could not be started.
pub const SPAWN_FAILED: i32 = 127;
/// Synthetic exit code: the command exceeded its timeout and was killed.
pub const TIMED_OUT: i32 = 124;
/// Synthetic exit code: waiting on the child failed, or it died from a signal.
pub const WAIT_FAILED: i32 = 255;

/// Captured result of one remote invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RemoteOutput {
    /// Output for a failure that happened before or around the remote side.
    pub fn synthetic(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Converts a non-zero exit into a [`RemoteExecError`] tagged with `action` and `target`.
    pub fn into_result(
        self,
        action: &str,
        target: &RemoteHost,
    ) -> Result<RemoteOutput, RemoteExecError> {
        if self.success() {
            return Ok(self);
        }
        Err(RemoteExecError {
            action: action.to_string(),
            target: target.to_string(),
            exit_code: self.exit_code,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Remote execution and file copy. Implementations must never panic or hang past `timeout`.
pub trait RemoteShell: Send + Sync {
    /// Runs `command` through the remote user's shell.
    fn run(
        &self,
        target: &RemoteHost,
        command: &str,
        timeout: Duration,
    ) -> impl Future<Output = RemoteOutput> + Send;

    /// Copies a local file to `remote_path` on `target`.
    fn upload(
        &self,
        local: &Path,
        target: &RemoteHost,
        remote_path: &str,
        timeout: Duration,
    ) -> impl Future<Output = RemoteOutput> + Send;

    /// Copies `remote_path` on `target` to a local file.
    fn download(
        &self,
        target: &RemoteHost,
        remote_path: &str,
        local: &Path,
        timeout: Duration,
    ) -> impl Future<Output = RemoteOutput> + Send;
}

/// Programs and connection settings for [`SshExecutor`].
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub ssh_program: String,
    pub scp_program: String,
    /// Connection-establishment limit, distinct from the per-call timeout.
    pub connect_timeout: Duration,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".into(),
            scp_program: "scp".into(),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

/// [`RemoteShell`] backed by the OpenSSH client binaries.
///
/// Sessions to the same host are serialized, so the poller and an API-triggered
/// push never hold two connections to one device at once.
pub struct SshExecutor {
    config: SshConfig,
    sessions: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SshExecutor {
    pub fn new(config: SshConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Non-interactive options shared by ssh and scp.
    fn common_options(&self) -> Vec<String> {
        vec![
            "-o".into(),
            "StrictHostKeyChecking=no".into(),
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("ConnectTimeout={}", self.config.connect_timeout.as_secs().max(1)),
        ]
    }

    pub fn ssh_args(&self, target: &RemoteHost, command: &str) -> Vec<String> {
        let mut args = self.common_options();
        args.push(target.to_string());
        args.push(command.to_string());
        args
    }

    pub fn upload_args(&self, local: &Path, target: &RemoteHost, remote_path: &str) -> Vec<String> {
        let mut args = self.common_options();
        args.push(local.display().to_string());
        args.push(format!("{target}:{remote_path}"));
        args
    }

    pub fn download_args(&self, target: &RemoteHost, remote_path: &str, local: &Path) -> Vec<String> {
        let mut args = self.common_options();
        args.push(format!("{target}:{remote_path}"));
        args.push(local.display().to_string());
        args
    }

    async fn session_lock(&self, host: &str) -> Arc<Mutex<()>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(host.to_string()).or_default())
    }

    async fn invoke(
        &self,
        target: &RemoteHost,
        program: &str,
        args: Vec<String>,
        timeout: Duration,
    ) -> RemoteOutput {
        let lock = self.session_lock(&target.host).await;
        let _session = lock.lock().await;

        tracing::debug!(target = %target, program, timeout_secs = timeout.as_secs(), "remote invocation");
        let out = run_program(program, &args, timeout).await;
        if !out.success() {
            tracing::debug!(
                target = %target,
                program,
                exit_code = out.exit_code,
                stderr = %out.stderr.trim(),
                "remote invocation failed"
            );
        }
        out
    }
}

impl RemoteShell for SshExecutor {
    async fn run(&self, target: &RemoteHost, command: &str, timeout: Duration) -> RemoteOutput {
        let args = self.ssh_args(target, command);
        self.invoke(target, &self.config.ssh_program, args, timeout)
            .await
    }

    async fn upload(
        &self,
        local: &Path,
        target: &RemoteHost,
        remote_path: &str,
        timeout: Duration,
    ) -> RemoteOutput {
        if !local.is_file() {
            return RemoteOutput::synthetic(
                SPAWN_FAILED,
                format!("local file {} does not exist", local.display()),
            );
        }
        let args = self.upload_args(local, target, remote_path);
        self.invoke(target, &self.config.scp_program, args, timeout)
            .await
    }

    async fn download(
        &self,
        target: &RemoteHost,
        remote_path: &str,
        local: &Path,
        timeout: Duration,
    ) -> RemoteOutput {
        let args = self.download_args(target, remote_path, local);
        self.invoke(target, &self.config.scp_program, args, timeout)
            .await
    }
}

/// Spawns `program`, captures its output, and kills it if `timeout` elapses.
async fn run_program(program: &str, args: &[String], timeout: Duration) -> RemoteOutput {
    let child = match tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(ch) => ch,
        Err(e) => return RemoteOutput::synthetic(SPAWN_FAILED, format!("spawn {program} failed: {e}")),
    };

    // Dropping the future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Err(_) => RemoteOutput::synthetic(
            TIMED_OUT,
            format!("{program} timed out after {}s", timeout.as_secs()),
        ),
        Ok(Err(e)) => RemoteOutput::synthetic(WAIT_FAILED, format!("wait on {program} failed: {e}")),
        Ok(Ok(out)) => RemoteOutput {
            exit_code: out.status.code().unwrap_or(WAIT_FAILED),
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
        },
    }
}
