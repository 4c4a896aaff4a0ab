use dglab_protocol::{Channel, DeviceEvent, FeedbackButton, PulseOperation, StrengthData, StrengthOperation};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};

pub const DEVICE_EVENT_CAP: usize = 64;
/// The app rejects pulse batches longer than this.
pub const MAX_PULSE_BATCH: usize = 100;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device is not bound")]
    Offline,
    #[error("device rejected request (code {code})")]
    Rejected { code: u16 },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound seam to the DG-LAB app. Inbound state arrives as [`DeviceEvent`]s
/// on the receiver created alongside the client.
pub trait DeviceClient: Send + Sync + 'static {
    fn set_strength(
        &self,
        channel: Channel,
        operation: StrengthOperation,
        value: i32,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn clear_pulses(&self, channel: Channel) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn add_pulses(
        &self,
        channel: Channel,
        pulses: Vec<PulseOperation>,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn rebind(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

/// In-process device that behaves like a bound app: applies strength
/// operations against its soft limits and reports the result back.
///
/// Reports are latest-wins: a burst of changes may collapse into fewer
/// reports, but the newest state is always delivered.
pub struct LoopbackDevice {
    state: Mutex<StrengthData>,
    pulses: Mutex<[Vec<PulseOperation>; 2]>,
    online: AtomicBool,
    events: mpsc::Sender<DeviceEvent>,
    reports: watch::Sender<StrengthData>,
}

impl LoopbackDevice {
    /// Spawns the report forwarder, so this must run inside a Tokio runtime.
    pub fn new(a_limit: i32, b_limit: i32) -> (Self, mpsc::Receiver<DeviceEvent>) {
        let (events, rx) = mpsc::channel(DEVICE_EVENT_CAP);
        let initial = StrengthData {
            a: 0,
            b: 0,
            a_limit,
            b_limit,
        };
        let (reports, report_rx) = watch::channel(initial);
        tokio::spawn(forward_reports(report_rx, events.clone()));
        let device = Self {
            state: Mutex::new(initial),
            pulses: Mutex::new([Vec::new(), Vec::new()]),
            online: AtomicBool::new(true),
            events,
            reports,
        };
        (device, rx)
    }

    pub fn strength(&self) -> StrengthData {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn queued_pulses(&self, channel: Channel) -> usize {
        self.pulses
            .lock()
            .map(|p| p[channel.index()].len())
            .unwrap_or(0)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Simulates the app dropping off the relay.
    pub fn disconnect(&self) {
        if self.online.swap(false, Ordering::AcqRel) {
            let _ = self.events.try_send(DeviceEvent::Disconnected);
        }
    }

    /// Simulates a press on the app's feedback panel.
    pub fn press(&self, button: FeedbackButton) {
        let _ = self.events.try_send(DeviceEvent::Feedback { button });
    }

    pub fn report(&self) {
        self.reports.send_replace(self.strength());
    }

    fn ensure_online(&self) -> Result<(), DeviceError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(DeviceError::Offline)
        }
    }
}

impl DeviceClient for LoopbackDevice {
    async fn set_strength(
        &self,
        channel: Channel,
        operation: StrengthOperation,
        value: i32,
    ) -> Result<(), DeviceError> {
        self.ensure_online()?;
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| DeviceError::Transport("state lock poisoned".to_string()))?;
            let current = state.strength(channel);
            let next = match operation {
                StrengthOperation::SetTo => value,
                StrengthOperation::Increase => current + value,
                StrengthOperation::Decrease => current - value,
            };
            let limit = state.limit(channel);
            state.set_strength(channel, next.clamp(0, limit));
        }
        self.report();
        Ok(())
    }

    async fn clear_pulses(&self, channel: Channel) -> Result<(), DeviceError> {
        self.ensure_online()?;
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses[channel.index()].clear();
        }
        Ok(())
    }

    async fn add_pulses(
        &self,
        channel: Channel,
        pulses: Vec<PulseOperation>,
    ) -> Result<(), DeviceError> {
        self.ensure_online()?;
        if pulses.len() > MAX_PULSE_BATCH {
            return Err(DeviceError::Rejected { code: 405 });
        }
        if let Ok(mut queued) = self.pulses.lock() {
            queued[channel.index()].extend(pulses);
        }
        Ok(())
    }

    async fn rebind(&self) -> Result<(), DeviceError> {
        self.online.store(true, Ordering::Release);
        tracing::info!("loopback device re-bound");
        self.report();
        Ok(())
    }
}

async fn forward_reports(mut rx: watch::Receiver<StrengthData>, events: mpsc::Sender<DeviceEvent>) {
    while rx.changed().await.is_ok() {
        let data = *rx.borrow_and_update();
        if events.send(DeviceEvent::Strength { data }).await.is_err() {
            break;
        }
    }
}
