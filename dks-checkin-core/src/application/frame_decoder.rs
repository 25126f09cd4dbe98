use crate::domain::SamplingConfig;
use crate::traits::{CaptureControl, FrameSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Wraps a [`FrameSource`] in a sampling task that forwards decoded payloads
///
/// Undecodable frames are dropped silently. Payloads go through a channel
/// of capacity one; while the consumer is busy with a payload, newer ones
/// are discarded instead of queued.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Spawn the sampling task. Must be called inside a tokio runtime.
    pub fn spawn(
        device_id: impl Into<String>,
        mut source: Box<dyn FrameSource>,
        config: &SamplingConfig,
    ) -> (CaptureHandle, mpsc::Receiver<String>) {
        let device_id = device_id.into();
        let (payload_tx, payload_rx) = mpsc::channel::<String>(1);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = config.interval();
        let task_device = device_id.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!("📷 Sampling {} every {:?}", task_device, period);

            loop {
                tokio::select! {
                    biased;

                    // Fires on stop() and when the handle is dropped
                    _ = stop_rx.changed() => break,

                    attempt = async {
                        interval.tick().await;
                        source.next_attempt().await
                    } => match attempt {
                        None => {
                            tracing::warn!("Capture on {} ended", task_device);
                            break;
                        }
                        Some(None) => continue,
                        Some(Some(payload)) => match payload_tx.try_send(payload) {
                            Ok(()) => {}
                            Err(mpsc::error::TrySendError::Full(_)) => {
                                tracing::trace!("Consumer busy, dropping decoded payload");
                            }
                            Err(mpsc::error::TrySendError::Closed(_)) => break,
                        },
                    },
                }
            }

            if let Err(e) = source.stop().await {
                // Stopping a capture never surfaces to the caller
                tracing::debug!("Ignoring error while stopping {}: {}", task_device, e);
            }
            tracing::debug!("📷 Capture on {} released", task_device);
        });

        let handle = CaptureHandle {
            device_id,
            stop_tx,
            stopped: AtomicBool::new(false),
            task: Mutex::new(Some(task)),
        };

        (handle, payload_rx)
    }
}

/// Owner of a running capture. Stopping is idempotent and happens once.
///
/// Dropping the handle also ends the sampling task, which releases the
/// device on its way out.
#[derive(Debug)]
pub struct CaptureHandle {
    device_id: String,
    stop_tx: watch::Sender<bool>,
    stopped: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureHandle {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stop sampling and wait until the device is released
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let _ = self.stop_tx.send(true);

        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("Capture task for {} failed: {}", self.device_id, e);
            }
        }
    }
}

#[async_trait]
impl CaptureControl for CaptureHandle {
    async fn stop_capture(&self) {
        self.stop().await;
    }
}
