use crate::domain::{CameraDevice, CameraError, SamplingConfig};
use crate::traits::{CameraPlatform, CaptureControl, DecodeAttempt, FrameSource};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// In-memory camera platform driven by a script of frames (for tests and demos)
///
/// Frames pushed with [`push_frames`](Self::push_frames) are handed to
/// whichever capture is running. When the script is empty the capture waits
/// for more frames, like a live camera, until [`end_capture`](Self::end_capture).
#[derive(Clone, Default)]
pub struct ScriptedCameraPlatform {
    state: Arc<Mutex<ScriptState>>,
    frames_available: Arc<Notify>,
}

#[derive(Default)]
struct ScriptState {
    devices: Vec<CameraDevice>,
    enumerate_error: Option<CameraError>,
    start_errors: HashMap<String, CameraError>,
    frames: VecDeque<DecodeAttempt>,
    ended: bool,
    started: Vec<String>,
    enumerations: usize,
    stops: usize,
    active: usize,
}

impl ScriptedCameraPlatform {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        let platform = Self::default();
        platform.lock().devices = devices;
        platform
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        // A panicking test thread must not hide the script from others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make enumeration fail (e.g. permission refused)
    pub fn fail_enumeration(&self, error: CameraError) {
        self.lock().enumerate_error = Some(error);
    }

    /// Make starting a capture on `device_id` fail
    pub fn fail_start(&self, device_id: &str, error: CameraError) {
        self.lock().start_errors.insert(device_id.to_string(), error);
    }

    /// Queue frames; `None` is a frame with no readable code
    pub fn push_frames<I, S>(&self, frames: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.lock()
            .frames
            .extend(frames.into_iter().map(|frame| frame.map(Into::into)));
        self.frames_available.notify_waiters();
    }

    /// Queue a single readable code
    pub fn push_payload(&self, payload: &str) {
        self.push_frames([Some(payload)]);
    }

    /// End every running capture once the queued frames are consumed
    pub fn end_capture(&self) {
        self.lock().ended = true;
        self.frames_available.notify_waiters();
    }

    /// Devices captures were started on, in order
    pub fn started_devices(&self) -> Vec<String> {
        self.lock().started.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.lock().stops
    }

    pub fn enumerate_calls(&self) -> usize {
        self.lock().enumerations
    }

    pub fn active_captures(&self) -> usize {
        self.lock().active
    }

    pub fn pending_frames(&self) -> usize {
        self.lock().frames.len()
    }
}

#[async_trait]
impl CameraPlatform for ScriptedCameraPlatform {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, CameraError> {
        let mut state = self.lock();
        state.enumerations += 1;
        match &state.enumerate_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.devices.clone()),
        }
    }

    async fn start_capture(
        &self,
        device_id: &str,
        _config: &SamplingConfig,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        let mut state = self.lock();

        if let Some(error) = state.start_errors.get(device_id) {
            return Err(error.clone());
        }
        if !state.devices.iter().any(|device| device.id == device_id) {
            return Err(CameraError::NoCameraFound);
        }

        state.started.push(device_id.to_string());
        state.active += 1;

        Ok(Box::new(ScriptedFrameSource {
            state: self.state.clone(),
            frames_available: self.frames_available.clone(),
            stopped: false,
        }))
    }
}

struct ScriptedFrameSource {
    state: Arc<Mutex<ScriptState>>,
    frames_available: Arc<Notify>,
    stopped: bool,
}

#[async_trait]
impl FrameSource for ScriptedFrameSource {
    async fn next_attempt(&mut self) -> Option<DecodeAttempt> {
        loop {
            // Registered before checking, so a push in between is not missed
            let notified = self.frames_available.notified();
            {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if self.stopped {
                    return None;
                }
                if let Some(frame) = state.frames.pop_front() {
                    return Some(frame);
                }
                if state.ended {
                    return None;
                }
            }
            notified.await;
        }
    }

    async fn stop(&mut self) -> Result<(), CameraError> {
        if !self.stopped {
            self.stopped = true;
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.stops += 1;
            state.active = state.active.saturating_sub(1);
        }
        Ok(())
    }
}

/// Capture stand-in that only counts stop requests
#[derive(Debug, Default)]
pub struct RecordingCapture {
    stops: AtomicUsize,
}

impl RecordingCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureControl for RecordingCapture {
    async fn stop_capture(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}
