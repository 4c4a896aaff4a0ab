use crate::command::{ChannelCommand, CommandType, ControlMode, Operation};
use crate::device::DeviceClient;
use crate::pulse;
use crate::queue::PriorityCommandQueue;
use crate::state::{StateWriter, TierFilter};
use dglab_protocol::{Channel, StrengthData, StrengthOperation};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const LINK_SIGNAL_CAP: usize = 16;
/// Reported strength is adopted only after this long without a local strength command.
pub const REPORT_SETTLE: Duration = Duration::from_secs(1);

/// Device-side facts routed to the dispatcher so it stays the only writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkSignal {
    Report(StrengthData),
    Down,
    Reset,
}

/// Sole consumer of one channel's queue and sole writer of its state.
pub struct Dispatcher<D: DeviceClient> {
    channel: Channel,
    queue: Arc<PriorityCommandQueue>,
    state: StateWriter,
    filter: TierFilter,
    device: Arc<D>,
    link_rx: mpsc::Receiver<LinkSignal>,
    reassert_interval: Duration,
    last_pulse_update: Option<Instant>,
    last_strength_command: Option<Instant>,
}

impl<D: DeviceClient> Dispatcher<D> {
    pub fn new(
        queue: Arc<PriorityCommandQueue>,
        state: StateWriter,
        filter: TierFilter,
        device: Arc<D>,
        link_rx: mpsc::Receiver<LinkSignal>,
        reassert_interval: Duration,
    ) -> Self {
        Self {
            channel: state.channel(),
            queue,
            state,
            filter,
            device,
            link_rx,
            reassert_interval,
            last_pulse_update: None,
            last_strength_command: None,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(channel = %self.channel, "dispatcher started");
        loop {
            tokio::select! {
                biased;
                Some(signal) = self.link_rx.recv() => self.on_link(signal).await,
                cmd = self.queue.pop() => self.apply(cmd).await,
            }
        }
    }

    pub async fn apply(&mut self, cmd: ChannelCommand) {
        if !self.filter.is_enabled(cmd.command_type) {
            tracing::debug!(
                channel = %self.channel,
                tier = %cmd.command_type,
                source = %cmd.source_id,
                "tier disabled, command dropped"
            );
            return;
        }

        match cmd.operation {
            Operation::SetTo(_) | Operation::Increase(_) | Operation::Decrease(_) => {
                self.apply_strength(cmd).await
            }
            Operation::SelectPulse(index) => self.select_pulse(&cmd, index).await,
            Operation::SetMode(mode) => {
                self.state.update(|s| {
                    s.mode = mode;
                    s.last_command_source = Some(cmd.source_id.clone());
                    s.last_command_time = Some(cmd.timestamp);
                });
                tracing::info!(channel = %self.channel, ?mode, "control mode changed");
            }
            Operation::ReassertPulse => {
                let linked = self.state.get().linked;
                let due = self
                    .last_pulse_update
                    .map_or(true, |t| t.elapsed() >= self.reassert_interval);
                if linked && due {
                    self.send_pulse().await;
                }
            }
        }
    }

    async fn apply_strength(&mut self, cmd: ChannelCommand) {
        let snapshot = self.state.get();
        if cmd.command_type == CommandType::Interaction && snapshot.mode == ControlMode::Panel {
            tracing::debug!(channel = %self.channel, source = %cmd.source_id, "panel mode, interaction ignored");
            return;
        }

        let limit = snapshot.limit.max(0);
        let current = snapshot.current_strength;
        let target = match cmd.operation {
            Operation::SetTo(v) => v.clamp(0, limit),
            Operation::Increase(v) => current.saturating_add(v).clamp(0, limit),
            Operation::Decrease(v) => current.saturating_sub(v).max(0),
            _ => return,
        };
        self.state.update(|s| s.target_strength = target);
        self.last_strength_command = Some(Instant::now());

        match self
            .device
            .set_strength(self.channel, StrengthOperation::SetTo, target)
            .await
        {
            Ok(()) => {
                self.state.update(|s| {
                    s.current_strength = target;
                    s.last_command_source = Some(cmd.source_id.clone());
                    s.last_command_time = Some(cmd.timestamp);
                });
                tracing::debug!(
                    channel = %self.channel,
                    tier = %cmd.command_type,
                    source = %cmd.source_id,
                    strength = target,
                    "strength applied"
                );
            }
            Err(e) => {
                tracing::warn!(
                    channel = %self.channel,
                    source = %cmd.source_id,
                    target,
                    "set_strength failed: {e}"
                );
            }
        }
    }

    async fn select_pulse(&mut self, cmd: &ChannelCommand, index: usize) {
        if pulse::get(index).is_none() {
            tracing::warn!(channel = %self.channel, index, "unknown waveform");
            return;
        }
        let snapshot = self.state.get();
        if snapshot.pulse_mode == index
            && cmd.command_type != CommandType::Gui
            && self.last_pulse_update.is_some()
        {
            return;
        }
        self.state.update(|s| {
            s.pulse_mode = index;
            s.last_command_source = Some(cmd.source_id.clone());
            s.last_command_time = Some(cmd.timestamp);
        });
        self.send_pulse().await;
    }

    async fn send_pulse(&mut self) {
        let index = self.state.get().pulse_mode;
        let Some(waveform) = pulse::get(index) else { return };

        let started = Instant::now();
        if let Err(e) = self.device.clear_pulses(self.channel).await {
            tracing::warn!(channel = %self.channel, "clear_pulses failed: {e}");
            return;
        }
        match self.device.add_pulses(self.channel, waveform.batch()).await {
            Ok(()) => {
                self.last_pulse_update = Some(started);
                tracing::debug!(channel = %self.channel, waveform = waveform.name_en, "waveform sent");
            }
            Err(e) => tracing::warn!(channel = %self.channel, "add_pulses failed: {e}"),
        }
    }

    async fn on_link(&mut self, signal: LinkSignal) {
        match signal {
            LinkSignal::Report(data) => {
                let strength = data.strength(self.channel);
                let limit = data.limit(self.channel);
                // Reports trail the commands that caused them; while commands are
                // queued or recent, only the limit is taken.
                let settled = self.queue.is_empty()
                    && self
                        .last_strength_command
                        .map_or(true, |t| t.elapsed() >= REPORT_SETTLE);
                self.state.update(|s| {
                    if settled {
                        s.current_strength = strength;
                        s.target_strength = strength;
                    }
                    s.limit = limit;
                    s.linked = true;
                });
                if !settled {
                    tracing::trace!(channel = %self.channel, strength, "report strength not adopted");
                }
            }
            LinkSignal::Down => {
                self.last_pulse_update = None;
                self.state.update(|s| s.linked = false);
                tracing::warn!(channel = %self.channel, "device link lost");
            }
            LinkSignal::Reset => {
                self.last_pulse_update = None;
                self.state.update(|s| s.linked = true);
                self.send_pulse().await;
            }
        }
    }
}
