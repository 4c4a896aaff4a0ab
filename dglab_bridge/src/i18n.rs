use crate::command::ControlMode;
use crate::pulse::Waveform;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
    Ja,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

impl Language {
    pub fn mode_name(self, mode: ControlMode) -> &'static str {
        match (self, mode) {
            (Language::Zh, ControlMode::Interaction) => "交互",
            (Language::Zh, ControlMode::Panel) => "面板",
            (Language::Ja, ControlMode::Interaction) => "インタラクション",
            (Language::Ja, ControlMode::Panel) => "パネル",
            (Language::En, ControlMode::Interaction) => "Interaction",
            (Language::En, ControlMode::Panel) => "Panel",
        }
    }

    pub fn not_connected(self) -> &'static str {
        match self {
            Language::Zh => "未连接",
            Language::En => "Not connected",
            Language::Ja => "未接続",
        }
    }

    pub fn waveform_name(self, waveform: &Waveform) -> &'static str {
        match self {
            Language::Zh => waveform.name_zh,
            Language::En => waveform.name_en,
            Language::Ja => waveform.name_ja,
        }
    }
}
