use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

    pub fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::A => f.write_str("A"),
            Channel::B => f.write_str("B"),
        }
    }
}

/// Strength operation understood by the device. Discriminants follow the
/// DG-LAB socket protocol.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrengthOperation {
    Decrease = 0,
    Increase = 1,
    SetTo = 2,
}

/// One 100 ms waveform frame: four frequency bytes, four intensity bytes.
pub type PulseOperation = ([u8; 4], [u8; 4]);

/// Strength report pushed by the device after every change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrengthData {
    pub a: i32,
    pub b: i32,
    pub a_limit: i32,
    pub b_limit: i32,
}

impl StrengthData {
    pub fn strength(&self, channel: Channel) -> i32 {
        match channel {
            Channel::A => self.a,
            Channel::B => self.b,
        }
    }

    pub fn limit(&self, channel: Channel) -> i32 {
        match channel {
            Channel::A => self.a_limit,
            Channel::B => self.b_limit,
        }
    }

    pub fn set_strength(&mut self, channel: Channel, value: i32) {
        match channel {
            Channel::A => self.a = value,
            Channel::B => self.b = value,
        }
    }
}

/// Physical buttons on the app's feedback panel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackButton {
    A1,
    A2,
    A3,
    A4,
    A5,
    B1,
    B2,
    B3,
    B4,
    B5,
}

impl FeedbackButton {
    pub fn channel(self) -> Channel {
        match self {
            FeedbackButton::A1
            | FeedbackButton::A2
            | FeedbackButton::A3
            | FeedbackButton::A4
            | FeedbackButton::A5 => Channel::A,
            _ => Channel::B,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DeviceEvent {
    Strength { data: StrengthData },
    Feedback { button: FeedbackButton },
    Disconnected,
}

/// Messages from the Terrors of Nowhere game-integration socket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Type", rename_all = "UPPERCASE")]
pub enum TonMessage {
    Damaged {
        #[serde(rename = "Value", default)]
        value: f64,
    },
    Alive {
        #[serde(rename = "Value", deserialize_with = "truthy", default = "alive_default")]
        value: bool,
    },
    Saved,
    Stats {
        #[serde(rename = "DisplayName", default)]
        display_name: Option<String>,
    },
    Connected {
        #[serde(rename = "DisplayName", default)]
        display_name: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

fn alive_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Truthy {
    Bool(bool),
    Number(f64),
    Text(String),
}

// ToN builds have sent both `true` and `1` for ALIVE.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Truthy::deserialize(deserializer)? {
        Truthy::Bool(b) => b,
        Truthy::Number(n) => n != 0.0,
        Truthy::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
    })
}
