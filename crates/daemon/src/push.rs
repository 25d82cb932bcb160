use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use intel_core::model::{PushResult, PushStage, RemoteHost};
use intel_remote::RemoteShell;
use tracing::{info, warn};

/// Where every artifact lands on the display node.
pub const REMOTE_IMAGE_PATH: &str = "~/incoming/pushed_image.png";

/// Display script invocation on the display node.
pub const DISPLAY_COMMAND: &str = "sudo python3 ~/display_image.py ~/incoming/pushed_image.png";

/// Newest decoded satellite image on the capture node.
pub const LATEST_CAPTURE_COMMAND: &str = "ls -t ~/noaa_reception/images/*.png 2>/dev/null | head -1";

/// Local name of the downloaded satellite image.
pub const LATEST_CAPTURE_FILE: &str = "sat_image_latest.png";

pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);
pub const TRIGGER_TIMEOUT: Duration = Duration::from_secs(60);
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(10);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const NO_CAPTURE_MESSAGE: &str = "no satellite images found";

/// Two-phase delivery of PNG artifacts to the e-paper display.
pub struct PushPipeline<R> {
    shell: Arc<R>,
    display: RemoteHost,
    capture: RemoteHost,
    artifact_dir: PathBuf,
}

impl<R: RemoteShell> PushPipeline<R> {
    pub fn new(
        shell: Arc<R>,
        display: RemoteHost,
        capture: RemoteHost,
        artifact_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            shell,
            display,
            capture,
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn display(&self) -> &RemoteHost {
        &self.display
    }

    /// Copies `artifact` to `target`, then runs the display script there.
    /// The script never runs when the copy failed.
    pub async fn push(&self, artifact: &Path, target: &RemoteHost) -> PushResult {
        let copied = self
            .shell
            .upload(artifact, target, REMOTE_IMAGE_PATH, TRANSFER_TIMEOUT)
            .await
            .into_result("scp upload", target);
        if let Err(e) = copied {
            warn!(host = %target, artifact = %artifact.display(), error = %e, "push transfer failed");
            return PushResult::failed_at(PushStage::Transfer, e.to_string());
        }

        let triggered = self
            .shell
            .run(target, DISPLAY_COMMAND, TRIGGER_TIMEOUT)
            .await
            .into_result("display trigger", target);
        match triggered {
            Ok(_) => {
                info!(host = %target, artifact = %artifact.display(), "pushed to display");
                PushResult::pushed()
            }
            Err(e) => {
                warn!(host = %target, error = %e, "display trigger failed");
                PushResult::failed_at(PushStage::RemoteTrigger, e.to_string())
            }
        }
    }

    pub async fn push_to_display(&self, artifact: &Path) -> PushResult {
        self.push(artifact, &self.display).await
    }

    /// Fetches the newest capture from the capture node and pushes it.
    ///
    /// A failed download ends the request; nothing stale from a previous
    /// download is ever pushed.
    pub async fn push_latest_capture(&self) -> PushResult {
        let listing = self
            .shell
            .run(&self.capture, LATEST_CAPTURE_COMMAND, LISTING_TIMEOUT)
            .await;
        let remote_path = listing.stdout.trim();
        if !listing.success() || remote_path.is_empty() {
            return PushResult::not_attempted(NO_CAPTURE_MESSAGE);
        }

        let local = self.artifact_dir.join(LATEST_CAPTURE_FILE);
        let downloaded = self
            .shell
            .download(&self.capture, remote_path, &local, DOWNLOAD_TIMEOUT)
            .await
            .into_result("scp download", &self.capture);
        if let Err(e) = downloaded {
            warn!(host = %self.capture, remote_path, error = %e, "capture download failed");
            return PushResult::not_attempted(format!("download failed: {e}"));
        }

        self.push_to_display(&local).await
    }
}
