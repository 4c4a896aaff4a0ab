use dglab_protocol::Channel;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tokio::time::Instant;

/// Trust tier of a command's origin. Lower discriminant wins.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Gui = 0,
    Panel = 1,
    Interaction = 2,
    Ton = 3,
    Periodic = 4,
}

impl CommandType {
    pub const ALL: [CommandType; 5] = [
        CommandType::Gui,
        CommandType::Panel,
        CommandType::Interaction,
        CommandType::Ton,
        CommandType::Periodic,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandType::Gui => "gui",
            CommandType::Panel => "panel",
            CommandType::Interaction => "interaction",
            CommandType::Ton => "ton",
            CommandType::Periodic => "periodic",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Interaction,
    /// Physics-bone input is ignored until a channel is switched out of this.
    #[default]
    Panel,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Interaction => ControlMode::Panel,
            ControlMode::Panel => ControlMode::Interaction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SetTo(i32),
    Increase(i32),
    Decrease(i32),
    SelectPulse(usize),
    SetMode(ControlMode),
    ReassertPulse,
}

/// Immutable once built; adapters hand it to a [`crate::CommandSink`].
#[derive(Debug, Clone)]
pub struct ChannelCommand {
    pub command_type: CommandType,
    pub channel: Channel,
    pub operation: Operation,
    pub source_id: String,
    pub timestamp: Instant,
}

impl ChannelCommand {
    pub fn new(
        command_type: CommandType,
        channel: Channel,
        operation: Operation,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            command_type,
            channel,
            operation,
            source_id: source_id.into(),
            timestamp: Instant::now(),
        }
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Arbitration order: tier first, then age.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.command_type
            .cmp(&other.command_type)
            .then(self.timestamp.cmp(&other.timestamp))
    }
}
