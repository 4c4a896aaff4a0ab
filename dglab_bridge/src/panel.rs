use crate::command::{ChannelCommand, CommandType, Operation};
use crate::routes::PanelAction;
use crate::sink::CommandSink;
use crate::state::{ChannelStateStore, TierFilter};
use dglab_protocol::Channel;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const STRENGTH_STEP: i32 = 5;

/// Panel-side settings shared with the ChatBox reporter and the GUI surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStatus {
    pub selected: Channel,
    pub fire_step: i32,
    pub chatbox_enabled: bool,
    pub panel_control: bool,
    pub fire_active: bool,
}

impl Default for PanelStatus {
    fn default() -> Self {
        Self {
            selected: Channel::A,
            fire_step: 30,
            chatbox_enabled: true,
            panel_control: true,
            fire_active: false,
        }
    }
}

pub type SharedPanelStatus = Arc<watch::Sender<PanelStatus>>;

/// Enables or disables every OSC-driven tier at once.
pub fn set_panel_control(status: &SharedPanelStatus, filter: &TierFilter, enabled: bool) {
    filter.set_enabled(CommandType::Panel, enabled);
    filter.set_enabled(CommandType::Interaction, enabled);
    status.send_modify(|s| s.panel_control = enabled);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Hold {
    Mode,
    Chatbox,
}

struct Fire {
    channel: Channel,
    origin: i32,
}

/// Turns SoundPad button/slider events into PANEL-tier commands.
pub struct PanelController {
    sink: CommandSink,
    states: ChannelStateStore,
    filter: TierFilter,
    status: SharedPanelStatus,
    hold: Duration,
    mode_hold: Option<JoinHandle<()>>,
    chatbox_hold: Option<JoinHandle<()>>,
    fire: Option<Fire>,
}

impl PanelController {
    pub fn new(
        sink: CommandSink,
        states: ChannelStateStore,
        filter: TierFilter,
        status: SharedPanelStatus,
        hold: Duration,
    ) -> Self {
        Self {
            sink,
            states,
            filter,
            status,
            hold,
            mode_hold: None,
            chatbox_hold: None,
            fire: None,
        }
    }

    pub fn handle(&mut self, action: PanelAction, value: f32) {
        let status = self.status.borrow().clone();
        if !status.panel_control && action != PanelAction::PanelControl {
            tracing::debug!(?action, "panel control disabled, ignored");
            return;
        }
        let pressed = value > 0.0;
        let channel = status.selected;

        match action {
            PanelAction::ToggleMode => self.hold_or_cancel(Hold::Mode, pressed, channel),
            PanelAction::ToggleChatbox => self.hold_or_cancel(Hold::Chatbox, pressed, channel),
            PanelAction::ResetStrength if pressed => {
                self.submit(channel, Operation::SetTo(0), "panel:reset");
            }
            PanelAction::DecreaseStrength if pressed => {
                self.submit(channel, Operation::Decrease(STRENGTH_STEP), "panel:decrease");
            }
            PanelAction::IncreaseStrength if pressed => {
                self.submit(channel, Operation::Increase(STRENGTH_STEP), "panel:increase");
            }
            PanelAction::SelectPulse(index) if pressed => {
                self.submit(channel, Operation::SelectPulse(index), "panel:pulse");
            }
            PanelAction::Fire => self.fire(pressed, channel, status.fire_step),
            PanelAction::FireStep => {
                if value > 0.0 && value.is_finite() {
                    let step = (value.min(1.0) * 100.0).ceil() as i32;
                    self.status.send_modify(|s| s.fire_step = step);
                    tracing::info!(step, "fire step changed");
                }
            }
            PanelAction::SelectChannel => {
                if value >= 0.0 {
                    let selected = if value <= 1.0 { Channel::A } else { Channel::B };
                    self.status.send_modify(|s| s.selected = selected);
                    tracing::info!(channel = %selected, "selected channel");
                }
            }
            PanelAction::PanelControl => set_panel_control(&self.status, &self.filter, pressed),
            _ => {}
        }
    }

    fn submit(&self, channel: Channel, operation: Operation, source: &str) -> bool {
        self.sink.send(CommandType::Panel, channel, operation, source)
    }

    fn hold_or_cancel(&mut self, hold: Hold, pressed: bool, channel: Channel) {
        let slot = match hold {
            Hold::Mode => &mut self.mode_hold,
            Hold::Chatbox => &mut self.chatbox_hold,
        };
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        if !pressed {
            return;
        }

        let delay = self.hold;
        let sink = self.sink.clone();
        let states = self.states.clone();
        let status = Arc::clone(&self.status);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match hold {
                Hold::Mode => {
                    let mode = states.snapshot(channel).mode.toggled();
                    sink.send(CommandType::Panel, channel, Operation::SetMode(mode), "panel:mode");
                }
                Hold::Chatbox => {
                    status.send_modify(|s| s.chatbox_enabled = !s.chatbox_enabled);
                    tracing::info!(enabled = status.borrow().chatbox_enabled, "chatbox status toggled");
                }
            }
        }));
    }

    fn fire(&mut self, pressed: bool, channel: Channel, step: i32) {
        if pressed {
            if self.fire.is_some() {
                return;
            }
            let state = self.states.snapshot(channel);
            let origin = state.current_strength;
            let target = (origin + step).min(state.limit);
            if !self.submit(channel, Operation::SetTo(target), "panel:fire") {
                return;
            }
            self.fire = Some(Fire { channel, origin });
            self.status.send_modify(|s| s.fire_active = true);
        } else if let Some(fire) = self.fire.take() {
            self.status.send_modify(|s| s.fire_active = false);
            // A release inside the cooldown of the previous one must still restore.
            self.sink.submit_unthrottled(ChannelCommand::new(
                CommandType::Panel,
                fire.channel,
                Operation::SetTo(fire.origin),
                "panel:fire-release",
            ));
        }
    }
}

impl Drop for PanelController {
    fn drop(&mut self) {
        for handle in [self.mode_hold.take(), self.chatbox_hold.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}
