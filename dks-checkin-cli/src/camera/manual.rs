use async_trait::async_trait;
use dks_checkin_core::{
    CameraDevice, CameraError, CameraPlatform, DecodeAttempt, FrameSource, SamplingConfig,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const MANUAL_DEVICE_ID: &str = "manual";

/// Codes entered by hand (or by a keyboard-wedge scanner) on the console
///
/// Exposes a single pseudo-device. Lines handed to [`feed`](Self::feed)
/// reach whichever capture is running; with none running they are dropped.
#[derive(Debug, Clone, Default)]
pub struct ManualEntryPlatform {
    current: Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>,
}

impl ManualEntryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand one typed line to the running capture. Returns false if none is running.
    pub fn feed(&self, line: &str) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match current.as_ref() {
            Some(tx) => tx.send(line.trim().to_string()).is_ok(),
            None => false,
        }
    }

    /// No more input. The running capture ends after the lines already fed.
    pub fn finish(&self) {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

#[async_trait]
impl CameraPlatform for ManualEntryPlatform {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, CameraError> {
        Ok(vec![CameraDevice::new(MANUAL_DEVICE_ID, "Entrada manual")])
    }

    async fn start_capture(
        &self,
        device_id: &str,
        _config: &SamplingConfig,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        if device_id != MANUAL_DEVICE_ID {
            return Err(CameraError::NoCameraFound);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        Ok(Box::new(ManualFrameSource {
            lines: rx,
            current: self.current.clone(),
        }))
    }
}

struct ManualFrameSource {
    lines: mpsc::UnboundedReceiver<String>,
    current: Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>,
}

#[async_trait]
impl FrameSource for ManualFrameSource {
    async fn next_attempt(&mut self) -> Option<DecodeAttempt> {
        let line = self.lines.recv().await?;
        Some((!line.is_empty()).then_some(line))
    }

    async fn stop(&mut self) -> Result<(), CameraError> {
        self.lines.close();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().is_some_and(|tx| tx.is_closed()) {
            *current = None;
        }
        Ok(())
    }
}
