#![forbid(unsafe_code)]

//! Remote command execution over `ssh`/`scp`.
//!
//! Every call is bounded by a timeout and never fails past this boundary:
//! local problems (spawn failure, timeout) are folded into a [`RemoteOutput`]
//! with a synthetic exit code and a descriptive stderr.

mod exec_runner;

pub use exec_runner::{
    RemoteOutput, RemoteShell, SshConfig, SshExecutor, SPAWN_FAILED, TIMED_OUT, WAIT_FAILED,
};
