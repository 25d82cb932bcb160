#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use intel_core::model::{
    Aircraft, CrewMember, DeviceReport, DeviceStatus, OrbitalPosition, PassPrediction, RemoteHost,
};
use intel_core::{FetchError, RemoteExecError};
use intel_daemon::push::{DISPLAY_COMMAND, LATEST_CAPTURE_COMMAND};
use intel_daemon::sources::Feeds;
use intel_remote::{RemoteOutput, RemoteShell};
use serde_json::json;

pub fn ok_output(stdout: &str) -> RemoteOutput {
    RemoteOutput {
        exit_code: 0,
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

/// Canned upstreams. Flip `failing` to make every source error out.
#[derive(Default)]
pub struct MockFeeds {
    pub failing: AtomicBool,
    /// Panics inside the next `orbital_position` call when set.
    pub panic_once: AtomicBool,
    pub orbital_calls: AtomicUsize,
    pub crew_calls: AtomicUsize,
    pub pass_calls: AtomicUsize,
    pub aircraft_calls: AtomicUsize,
    pub device_calls: AtomicUsize,
}

impl MockFeeds {
    pub fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn down(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Feeds for MockFeeds {
    async fn orbital_position(&self) -> Result<OrbitalPosition, FetchError> {
        self.orbital_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_once.swap(false, Ordering::SeqCst) {
            panic!("upstream client blew up");
        }
        if self.down() {
            return Err(FetchError::Timeout(5));
        }
        Ok(OrbitalPosition {
            latitude: 51.5,
            longitude: -0.1,
            timestamp: 1_700_000_000,
        })
    }

    async fn crew_manifest(&self) -> Result<Vec<CrewMember>, FetchError> {
        self.crew_calls.fetch_add(1, Ordering::SeqCst);
        if self.down() {
            return Err(FetchError::Envelope("failure".into()));
        }
        Ok(vec![CrewMember {
            name: "Oleg Kononenko".into(),
            craft: "ISS".into(),
        }])
    }

    async fn pass_predictions(&self) -> Result<Vec<PassPrediction>, FetchError> {
        self.pass_calls.fetch_add(1, Ordering::SeqCst);
        if self.down() {
            return Err(FetchError::Status(503));
        }
        Ok(vec![json!({"duration": 600, "risetime": 1_700_003_000})])
    }

    async fn aircraft(&self) -> Result<Vec<Aircraft>, FetchError> {
        self.aircraft_calls.fetch_add(1, Ordering::SeqCst);
        if self.down() {
            return Err(FetchError::Transport("connection refused".into()));
        }
        Ok(vec![Aircraft {
            icao24: "a1b2c3".into(),
            callsign: "UAL123".into(),
            country: Some("United States".into()),
            lat: 29.6,
            lon: -95.2,
            alt_m: 3000.0,
            alt_ft: 9843,
            velocity_kt: 250,
            heading: 90.0,
            vertical_rate: 0.0,
            on_ground: Some(false),
            squawk: None,
        }])
    }

    async fn device_report(&self) -> Result<DeviceReport, FetchError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        if self.down() {
            return Err(FetchError::Remote(RemoteExecError {
                action: "ssh".into(),
                target: "mem@192.168.1.192".into(),
                exit_code: 1,
                stderr: "Connection closed".into(),
            }));
        }
        Ok(DeviceReport {
            status: DeviceStatus::Recording,
            log_lines: vec!["Recording NOAA 19 pass".into()],
            running: 1,
        })
    }
}

/// Remote shell with scripted exit codes that records every call.
pub struct ScriptedShell {
    pub upload_exit: i32,
    pub trigger_exit: i32,
    pub download_exit: i32,
    pub listing: RemoteOutput,
    pub calls: Mutex<Vec<String>>,
}

impl Default for ScriptedShell {
    fn default() -> Self {
        Self {
            upload_exit: 0,
            trigger_exit: 0,
            download_exit: 0,
            listing: ok_output("/home/mem/noaa_reception/images/NOAA19_20261016.png\n"),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedShell {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn exit(code: i32, what: &str) -> RemoteOutput {
    if code == 0 {
        ok_output("")
    } else {
        RemoteOutput::synthetic(code, format!("{what} failed"))
    }
}

impl RemoteShell for ScriptedShell {
    async fn run(&self, target: &RemoteHost, command: &str, _timeout: Duration) -> RemoteOutput {
        if command == DISPLAY_COMMAND {
            self.record(format!("trigger {target}"));
            exit(self.trigger_exit, "display_image.py")
        } else if command == LATEST_CAPTURE_COMMAND {
            self.record(format!("list {target}"));
            self.listing.clone()
        } else {
            self.record(format!("run {target} {command}"));
            RemoteOutput::synthetic(127, "unexpected command")
        }
    }

    async fn upload(
        &self,
        local: &Path,
        target: &RemoteHost,
        remote_path: &str,
        _timeout: Duration,
    ) -> RemoteOutput {
        self.record(format!("upload {} {target}:{remote_path}", local.display()));
        exit(self.upload_exit, "scp")
    }

    async fn download(
        &self,
        target: &RemoteHost,
        remote_path: &str,
        local: &Path,
        _timeout: Duration,
    ) -> RemoteOutput {
        self.record(format!("download {target}:{remote_path} {}", local.display()));
        exit(self.download_exit, "scp")
    }
}
