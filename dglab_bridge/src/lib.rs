mod chatbox;
mod command;
mod config;
mod control;
mod cooldown;
mod device;
mod dispatcher;
mod i18n;
mod interaction;
mod osc_net;
mod panel;
mod periodic;
mod protocol;
mod queue;
mod routes;
mod session;
mod sink;
mod state;
mod ton;
mod ton_ws;

pub mod pulse;

pub use crate::chatbox::{status_text, ChatboxReporter};
pub use crate::command::{ChannelCommand, CommandType, ControlMode, Operation};
pub use crate::config::{
    active_interfaces, ArbitrationSettings, ConfigError, DeviceSettings, InteractionAddress,
    OscSettings, PanelSettings, PeriodicSettings, Settings, TonSettings, DEFAULT_SETTINGS_FILE,
};
pub use crate::control::ControlHandle;
pub use crate::cooldown::{CooldownGate, CooldownTable};
pub use crate::device::{DeviceClient, DeviceError, LoopbackDevice, DEVICE_EVENT_CAP};
pub use crate::dispatcher::{Dispatcher, LinkSignal, LINK_SIGNAL_CAP};
pub use crate::i18n::Language;
pub use crate::interaction::InteractionCoalescer;
pub use crate::osc_net::{OscError, OscInput, OscSender, OscServer};
pub use crate::panel::{PanelController, PanelStatus, SharedPanelStatus, STRENGTH_STEP};
pub use crate::periodic::ScheduledTask;
pub use crate::protocol::*;
pub use crate::queue::PriorityCommandQueue;
pub use crate::routes::{PanelAction, PanelRoute, Route, RouteError, RouteTable, PANEL_ROUTES};
pub use crate::session::{Bridge, BridgeError};
pub use crate::sink::CommandSink;
pub use crate::state::{ChannelState, ChannelStateStore, StateWriter, TierFilter, DEFAULT_LIMIT};
pub use crate::ton::{TonAdapter, TonStatus};
pub use crate::ton_ws::TonControl;
