use crate::command::{CommandType, ControlMode, Operation};
use crate::panel::{self, PanelStatus, SharedPanelStatus};
use crate::sink::CommandSink;
use crate::state::{ChannelState, ChannelStateStore, TierFilter};
use crate::ton::{TonAdapter, TonStatus};
use crate::ton_ws::TonControl;
use dglab_protocol::Channel;
use tokio::sync::{mpsc, watch};

const GUI_SOURCE: &str = "gui";

/// Direct-control surface. Everything submitted here runs at GUI tier,
/// which has no cooldown and outranks every OSC and game source.
#[derive(Clone)]
pub struct ControlHandle {
    pub(crate) sink: CommandSink,
    pub(crate) states: ChannelStateStore,
    pub(crate) filter: TierFilter,
    pub(crate) panel: SharedPanelStatus,
    pub(crate) ton: TonAdapter,
    pub(crate) ton_ctl: Option<mpsc::Sender<TonControl>>,
}

impl ControlHandle {
    pub fn set_strength(&self, channel: Channel, value: i32) -> bool {
        self.gui(channel, Operation::SetTo(value))
    }

    pub fn increase(&self, channel: Channel, value: i32) -> bool {
        self.gui(channel, Operation::Increase(value))
    }

    pub fn decrease(&self, channel: Channel, value: i32) -> bool {
        self.gui(channel, Operation::Decrease(value))
    }

    pub fn select_pulse(&self, channel: Channel, index: usize) -> bool {
        self.gui(channel, Operation::SelectPulse(index))
    }

    pub fn set_mode(&self, channel: Channel, mode: ControlMode) -> bool {
        self.gui(channel, Operation::SetMode(mode))
    }

    fn gui(&self, channel: Channel, operation: Operation) -> bool {
        self.sink.send(CommandType::Gui, channel, operation, GUI_SOURCE)
    }

    pub fn set_tier_enabled(&self, tier: CommandType, enabled: bool) {
        self.filter.set_enabled(tier, enabled);
    }

    pub fn tier_enabled(&self, tier: CommandType) -> bool {
        self.filter.is_enabled(tier)
    }

    /// Same switch as the in-game PanelControl parameter.
    pub fn set_panel_control(&self, enabled: bool) {
        panel::set_panel_control(&self.panel, &self.filter, enabled);
    }

    pub fn set_fire_step(&self, step: i32) {
        let step = step.clamp(0, 100);
        self.panel.send_modify(|s| s.fire_step = step);
    }

    pub fn set_chatbox(&self, enabled: bool) {
        self.panel.send_modify(|s| s.chatbox_enabled = enabled);
    }

    pub fn select_channel(&self, channel: Channel) {
        self.panel.send_modify(|s| s.selected = channel);
    }

    /// Toggles the ToN tier and its socket together.
    pub fn set_ton_enabled(&self, enabled: bool) {
        self.filter.set_enabled(CommandType::Ton, enabled);
        if let Some(tx) = &self.ton_ctl {
            let cmd = if enabled {
                TonControl::Connect
            } else {
                TonControl::Disconnect
            };
            let _ = tx.try_send(cmd);
        }
    }

    pub fn snapshot(&self, channel: Channel) -> ChannelState {
        self.states.snapshot(channel)
    }

    pub fn subscribe(&self, channel: Channel) -> watch::Receiver<ChannelState> {
        self.states.subscribe(channel)
    }

    pub fn panel_status(&self) -> PanelStatus {
        self.panel.borrow().clone()
    }

    pub fn ton_status(&self) -> TonStatus {
        self.ton.status()
    }
}
