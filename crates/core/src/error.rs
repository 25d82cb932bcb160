//! Error taxonomy for fetches, remote commands and rendering.

use thiserror::Error;

/// Failure of one source fetch. Source-scoped and never fatal: the previous value is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Upstream did not answer within the client timeout.
    #[error("timed out after {0}s")]
    Timeout(u64),
    /// Non-2xx HTTP status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    /// Response envelope reported a failure.
    #[error("upstream reported failure: {0}")]
    Envelope(String),
    /// Payload did not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Remote command exited non-zero or could not run.
    #[error(transparent)]
    Remote(#[from] RemoteExecError),
}

/// Non-zero exit or transport failure of a remote command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{action} on {target} failed (exit={exit_code}): {stderr}")]
pub struct RemoteExecError {
    /// What was attempted, e.g. `ssh` or `scp upload`.
    pub action: String,
    /// `user@host`.
    pub target: String,
    /// Real or synthetic exit code.
    pub exit_code: i32,
    /// Remote stderr, or a description of the local failure.
    pub stderr: String,
}

/// Artifact generation failure. Surfaced as a push failure without attempting transfer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Data needed for the artifact is not available.
    #[error("missing data: {0}")]
    MissingData(String),
    /// Writing the artifact failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// PNG encoding failed.
    #[error("encode failed: {0}")]
    Encode(String),
}
