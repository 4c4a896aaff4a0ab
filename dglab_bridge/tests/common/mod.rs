#![allow(dead_code)]

use dglab_bridge::{
    Channel, ChannelState, DeviceClient, DeviceError, DeviceEvent, PulseOperation,
    StrengthOperation, DEVICE_EVENT_CAP,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetStrength(Channel, StrengthOperation, i32),
    ClearPulses(Channel),
    AddPulses(Channel, usize),
    Rebind,
}

/// Records every call; never reports strength back on its own.
pub struct MockDevice {
    calls: Mutex<Vec<Call>>,
    fail_strength: AtomicBool,
    fail_rebind: AtomicBool,
    pulse_delay_ms: AtomicU64,
    pub events: mpsc::Sender<DeviceEvent>,
}

impl MockDevice {
    pub fn new() -> (Self, mpsc::Receiver<DeviceEvent>) {
        let (events, rx) = mpsc::channel(DEVICE_EVENT_CAP);
        (
            Self {
                calls: Mutex::new(Vec::new()),
                fail_strength: AtomicBool::new(false),
                fail_rebind: AtomicBool::new(false),
                pulse_delay_ms: AtomicU64::new(0),
                events,
            },
            rx,
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn strength_calls(&self, channel: Channel) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetStrength(ch, _, v) if ch == channel => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn pulse_uploads(&self, channel: Channel) -> usize {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::AddPulses(ch, _) if *ch == channel))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_strength(&self, fail: bool) {
        self.fail_strength.store(fail, Ordering::SeqCst);
    }

    pub fn fail_rebind(&self, fail: bool) {
        self.fail_rebind.store(fail, Ordering::SeqCst);
    }

    /// Makes every `add_pulses` call take this long, like a slow link.
    pub fn pulse_delay(&self, delay: Duration) {
        self.pulse_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DeviceClient for MockDevice {
    fn set_strength(
        &self,
        channel: Channel,
        operation: StrengthOperation,
        value: i32,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send {
        self.record(Call::SetStrength(channel, operation, value));
        let fail = self.fail_strength.load(Ordering::SeqCst);
        async move {
            if fail {
                Err(DeviceError::Transport("mock failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    async fn clear_pulses(&self, channel: Channel) -> Result<(), DeviceError> {
        self.record(Call::ClearPulses(channel));
        Ok(())
    }

    async fn add_pulses(
        &self,
        channel: Channel,
        pulses: Vec<PulseOperation>,
    ) -> Result<(), DeviceError> {
        self.record(Call::AddPulses(channel, pulses.len()));
        let delay = self.pulse_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(())
    }

    async fn rebind(&self) -> Result<(), DeviceError> {
        self.record(Call::Rebind);
        if self.fail_rebind.load(Ordering::SeqCst) {
            Err(DeviceError::Offline)
        } else {
            Ok(())
        }
    }
}

/// Lets every ready task run; with a paused clock this also advances time by `ms`.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub async fn wait_for(
    rx: &mut watch::Receiver<ChannelState>,
    timeout: Duration,
    pred: impl Fn(&ChannelState) -> bool,
) -> ChannelState {
    match tokio::time::timeout(timeout, rx.wait_for(|s| pred(s))).await {
        Ok(Ok(state)) => return state.clone(),
        Ok(Err(_)) => panic!("state channel closed"),
        Err(_) => {}
    }
    panic!("timeout waiting for state, last: {:?}", *rx.borrow());
}
