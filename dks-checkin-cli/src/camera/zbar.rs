use async_trait::async_trait;
use dks_checkin_core::{
    CameraDevice, CameraError, CameraPlatform, DecodeAttempt, FrameSource, SamplingConfig,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};

/// V4L2 cameras decoded by `zbarcam`
///
/// Devices are the `/dev/video*` nodes; labels come from sysfs. Each
/// capture is a `zbarcam --raw --nodisplay` child whose stdout lines are
/// the decoded codes.
#[derive(Debug, Clone)]
pub struct ZbarCameraPlatform {
    zbarcam: PathBuf,
    dev_dir: PathBuf,
    sysfs_dir: PathBuf,
}

impl ZbarCameraPlatform {
    pub fn new(zbarcam: impl Into<PathBuf>) -> Self {
        Self {
            zbarcam: zbarcam.into(),
            dev_dir: PathBuf::from("/dev"),
            sysfs_dir: PathBuf::from("/sys/class/video4linux"),
        }
    }

    /// Look for devices somewhere other than `/dev` and sysfs
    pub fn with_device_dirs(
        mut self,
        dev_dir: impl Into<PathBuf>,
        sysfs_dir: impl Into<PathBuf>,
    ) -> Self {
        self.dev_dir = dev_dir.into();
        self.sysfs_dir = sysfs_dir.into();
        self
    }

    fn device_path(&self, device_id: &str) -> PathBuf {
        self.dev_dir.join(device_id)
    }

    async fn label(&self, device_id: &str) -> String {
        let path = self.sysfs_dir.join(device_id).join("name");
        tokio::fs::read_to_string(path)
            .await
            .map(|name| name.trim().to_string())
            .unwrap_or_default()
    }
}

fn is_video_node(name: &str) -> bool {
    name.strip_prefix("video")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn map_io_error(e: std::io::Error) -> CameraError {
    match e.kind() {
        ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        ErrorKind::NotFound => CameraError::NoCameraFound,
        _ => CameraError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl CameraPlatform for ZbarCameraPlatform {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, CameraError> {
        let mut entries = tokio::fs::read_dir(&self.dev_dir)
            .await
            .map_err(map_io_error)?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(map_io_error)? {
            if let Some(name) = entry.file_name().to_str() {
                if is_video_node(name) {
                    ids.push(name.to_string());
                }
            }
        }
        // video2 before video10
        ids.sort_by_key(|id| id[5..].parse::<u32>().unwrap_or(u32::MAX));

        let mut devices = Vec::with_capacity(ids.len());
        for id in ids {
            let label = self.label(&id).await;
            devices.push(CameraDevice::new(id, label));
        }

        tracing::debug!(
            "📷 Found {} video device(s) in {}",
            devices.len(),
            self.dev_dir.display()
        );
        Ok(devices)
    }

    async fn start_capture(
        &self,
        device_id: &str,
        config: &SamplingConfig,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        let device = self.device_path(device_id);
        check_readable(&device).await?;

        let mut child = Command::new(&self.zbarcam)
            .arg("--raw")
            .arg("--nodisplay")
            .arg("-Sdisable")
            .arg("-Sqrcode.enable")
            .arg(&device)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    CameraError::Unavailable(format!("{} not found", self.zbarcam.display()))
                }
                _ => map_io_error(e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::Unavailable("zbarcam stdout not captured".to_string()))?;

        tracing::debug!(
            "📷 zbarcam on {} ({}x{} window)",
            device.display(),
            config.detection_window.width,
            config.detection_window.height
        );

        Ok(Box::new(ZbarFrameSource {
            child,
            lines: BufReader::new(stdout).lines(),
        }))
    }
}

async fn check_readable(device: &Path) -> Result<(), CameraError> {
    tokio::fs::OpenOptions::new()
        .read(true)
        .open(device)
        .await
        .map(|_| ())
        .map_err(map_io_error)
}

struct ZbarFrameSource {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

#[async_trait]
impl FrameSource for ZbarFrameSource {
    async fn next_attempt(&mut self) -> Option<DecodeAttempt> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                Some((!line.is_empty()).then(|| line.to_string()))
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Reading zbarcam output failed: {}", e);
                None
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CameraError> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }
        self.child
            .kill()
            .await
            .map_err(|e| CameraError::Unavailable(e.to_string()))
    }
}
