use std::sync::Arc;
use std::time::Duration;

use intel_core::model::{DeviceReport, DeviceStatus, RemoteHost, DEVICE_LOG_LINES};
use intel_core::FetchError;
use intel_remote::RemoteShell;

/// Separates the log tail from the process count in the status command output.
pub const SENTINEL: &str = "---SDR_STATUS---";

/// Log tail, sentinel, then the number of running capture processes.
pub const STATUS_COMMAND: &str = "tail -10 ~/noaa_capture.log 2>/dev/null; echo \"---SDR_STATUS---\"; ps aux | grep noaa_capture | grep -v grep | wc -l";

pub const DEVICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries the capture node over ssh.
pub struct DeviceLogClient<R> {
    shell: Arc<R>,
    host: RemoteHost,
}

impl<R: RemoteShell> DeviceLogClient<R> {
    pub fn new(shell: Arc<R>, host: RemoteHost) -> Self {
        Self { shell, host }
    }

    pub fn host(&self) -> &RemoteHost {
        &self.host
    }

    pub async fn fetch(&self) -> Result<DeviceReport, FetchError> {
        let out = self
            .shell
            .run(&self.host, STATUS_COMMAND, DEVICE_TIMEOUT)
            .await
            .into_result("ssh", &self.host)?;
        parse_report(&out.stdout)
    }
}

/// Splits status command output at [`SENTINEL`] and classifies the node.
///
/// Output without a sentinel is treated as a bare log with no running process.
pub fn parse_report(stdout: &str) -> Result<DeviceReport, FetchError> {
    let (log_part, count_part) = match stdout.split_once(SENTINEL) {
        Some((log, count)) => (log, Some(count)),
        None => (stdout, None),
    };

    let mut log_lines: Vec<String> = log_part
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if log_lines.len() > DEVICE_LOG_LINES {
        log_lines.drain(..log_lines.len() - DEVICE_LOG_LINES);
    }

    let running = match count_part.map(str::trim) {
        None | Some("") => 0,
        Some(count) => {
            let first = count.lines().next().unwrap_or_default().trim();
            first.parse::<u32>().map_err(|_| {
                FetchError::Malformed(format!("process count is not a number: {first:?}"))
            })?
        }
    };

    Ok(DeviceReport {
        status: DeviceStatus::classify(&log_lines, running),
        log_lines,
        running,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intel_remote::RemoteOutput;
    use std::path::Path;
    use std::sync::Mutex;

    struct Canned {
        output: RemoteOutput,
        commands: Mutex<Vec<String>>,
    }

    impl RemoteShell for Canned {
        async fn run(&self, _: &RemoteHost, command: &str, _: Duration) -> RemoteOutput {
            self.commands.lock().unwrap().push(command.to_string());
            self.output.clone()
        }

        async fn upload(&self, _: &Path, _: &RemoteHost, _: &str, _: Duration) -> RemoteOutput {
            unreachable!("device status check never uploads")
        }

        async fn download(&self, _: &RemoteHost, _: &str, _: &Path, _: Duration) -> RemoteOutput {
            unreachable!("device status check never downloads")
        }
    }

    fn client(output: RemoteOutput) -> DeviceLogClient<Canned> {
        DeviceLogClient::new(
            Arc::new(Canned {
                output,
                commands: Mutex::new(Vec::new()),
            }),
            RemoteHost::new("192.168.1.192", "mem"),
        )
    }

    fn ok(stdout: &str) -> RemoteOutput {
        RemoteOutput {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[test]
    fn recording_when_last_line_says_so() {
        let r = parse_report("Waiting for NOAA 19\nRecording NOAA 19 pass\n---SDR_STATUS---\n1\n")
            .unwrap();
        assert_eq!(r.status, DeviceStatus::Recording);
        assert_eq!(r.running, 1);
        assert_eq!(r.log_lines.len(), 2);
    }

    #[test]
    fn zero_processes_is_offline_whatever_the_log() {
        let r = parse_report("Recording NOAA 18\n---SDR_STATUS---\n0\n").unwrap();
        assert_eq!(r.status, DeviceStatus::Offline);
        assert_eq!(r.log_lines, ["Recording NOAA 18"]);
    }

    #[test]
    fn keywords_map_to_states() {
        let cases = [
            ("Sleeping 3600s until next pass", DeviceStatus::Sleeping),
            ("Starting capture on 137.1 MHz", DeviceStatus::Armed),
            ("Waiting for AOS", DeviceStatus::Armed),
            ("decoder exited cleanly", DeviceStatus::Running),
        ];
        for (line, expected) in cases {
            let r = parse_report(&format!("{line}\n{SENTINEL}\n2\n")).unwrap();
            assert_eq!(r.status, expected, "{line}");
        }
    }

    #[test]
    fn keeps_only_the_last_ten_lines() {
        let log: String = (0..14).map(|i| format!("line {i}\n")).collect();
        let r = parse_report(&format!("{log}{SENTINEL}\n1\n")).unwrap();
        assert_eq!(r.log_lines.len(), 10);
        assert_eq!(r.log_lines[0], "line 4");
        assert_eq!(r.log_lines[9], "line 13");
    }

    #[test]
    fn empty_log_with_running_process() {
        let r = parse_report("---SDR_STATUS---\n1\n").unwrap();
        assert!(r.log_lines.is_empty());
        assert_eq!(r.status, DeviceStatus::Running);
    }

    #[test]
    fn garbage_count_is_malformed() {
        assert!(matches!(
            parse_report("x\n---SDR_STATUS---\nmany\n"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn fetch_sends_the_status_command() {
        let c = client(ok("Sleeping\n---SDR_STATUS---\n1\n"));
        let report = c.fetch().await.unwrap();
        assert_eq!(report.status, DeviceStatus::Sleeping);
        assert_eq!(*c.shell.commands.lock().unwrap(), [STATUS_COMMAND]);
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_remote_error() {
        let c = client(RemoteOutput::synthetic(255, "ssh: connect to host 192.168.1.192: No route"));
        match c.fetch().await {
            Err(FetchError::Remote(e)) => {
                assert_eq!(e.exit_code, 255);
                assert_eq!(e.target, "mem@192.168.1.192");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
