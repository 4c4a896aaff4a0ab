use crate::command::{CommandType, ControlMode};
use dglab_protocol::Channel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

pub const DEFAULT_LIMIT: i32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    pub current_strength: i32,
    pub target_strength: i32,
    pub limit: i32,
    pub mode: ControlMode,
    pub pulse_mode: usize,
    pub linked: bool,
    pub last_command_source: Option<String>,
    pub last_command_time: Option<Instant>,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            current_strength: 0,
            target_strength: 0,
            limit: DEFAULT_LIMIT,
            mode: ControlMode::Panel,
            pulse_mode: 0,
            linked: false,
            last_command_source: None,
            last_command_time: None,
        }
    }
}

/// Readable snapshots of both channels.
///
/// Writers are obtained once per channel with [`ChannelStateStore::take_writer`]
/// and handed to that channel's dispatcher.
#[derive(Clone)]
pub struct ChannelStateStore {
    rx: [watch::Receiver<ChannelState>; 2],
    tx: Arc<[std::sync::Mutex<Option<watch::Sender<ChannelState>>>; 2]>,
}

impl Default for ChannelStateStore {
    fn default() -> Self {
        Self::new(ChannelState::default())
    }
}

impl ChannelStateStore {
    pub fn new(initial: ChannelState) -> Self {
        let (tx_a, rx_a) = watch::channel(initial.clone());
        let (tx_b, rx_b) = watch::channel(initial);
        Self {
            rx: [rx_a, rx_b],
            tx: Arc::new([
                std::sync::Mutex::new(Some(tx_a)),
                std::sync::Mutex::new(Some(tx_b)),
            ]),
        }
    }

    pub fn snapshot(&self, channel: Channel) -> ChannelState {
        self.rx[channel.index()].borrow().clone()
    }

    pub fn subscribe(&self, channel: Channel) -> watch::Receiver<ChannelState> {
        self.rx[channel.index()].clone()
    }

    /// Returns `None` if the channel's writer was already taken.
    pub fn take_writer(&self, channel: Channel) -> Option<StateWriter> {
        let mut slot = self.tx[channel.index()].lock().ok()?;
        slot.take().map(|tx| StateWriter { channel, tx })
    }
}

pub struct StateWriter {
    channel: Channel,
    tx: watch::Sender<ChannelState>,
}

impl StateWriter {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn get(&self) -> ChannelState {
        self.tx.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut ChannelState)) {
        self.tx.send_modify(f);
    }
}

/// Per-tier enable flags, read by dispatchers when a command is dequeued.
#[derive(Clone)]
pub struct TierFilter {
    enabled: Arc<[AtomicBool; 5]>,
}

impl Default for TierFilter {
    fn default() -> Self {
        Self {
            enabled: Arc::new([
                AtomicBool::new(true),
                AtomicBool::new(true),
                AtomicBool::new(true),
                AtomicBool::new(true),
                AtomicBool::new(true),
            ]),
        }
    }
}

impl TierFilter {
    pub fn is_enabled(&self, command_type: CommandType) -> bool {
        self.enabled[command_type.index()].load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, command_type: CommandType, enabled: bool) {
        self.enabled[command_type.index()].store(enabled, Ordering::Release);
        tracing::info!(tier = %command_type, enabled, "tier filter changed");
    }
}
