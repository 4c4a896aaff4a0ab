use crate::command::CommandType;
use crate::cooldown::CooldownTable;
use crate::i18n::Language;
use dglab_protocol::Channel;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Network interface whose IPv4 address is advertised to the DG-LAB app.
    pub interface: String,
    pub ip: String,
    pub port: u16,
    pub osc_port: u16,
    pub language: Language,
    pub osc: OscSettings,
    pub panel: PanelSettings,
    pub ton: TonSettings,
    pub arbitration: ArbitrationSettings,
    pub device: DeviceSettings,
    pub periodic: PeriodicSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interface: String::new(),
            ip: String::new(),
            port: 5678,
            osc_port: 9001,
            language: Language::default(),
            osc: OscSettings::default(),
            panel: PanelSettings::default(),
            ton: TonSettings::default(),
            arbitration: ArbitrationSettings::default(),
            device: DeviceSettings::default(),
            periodic: PeriodicSettings::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OscSettings {
    pub listen_host: String,
    pub vrchat_host: String,
    pub vrchat_port: u16,
    pub mirror_strength: bool,
    pub interaction: Vec<InteractionAddress>,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            vrchat_host: "127.0.0.1".to_string(),
            vrchat_port: 9000,
            mirror_strength: true,
            interaction: vec![
                InteractionAddress::new("/avatar/parameters/DG-LAB/UpperLeg_R", &[Channel::A]),
                InteractionAddress::new("/avatar/parameters/DG-LAB/UpperLeg_L", &[Channel::A]),
                InteractionAddress::new("/avatar/parameters/Tail_Stretch", &[Channel::B]),
            ],
        }
    }
}

/// OSC address (or `*` pattern) mapped onto one or both channels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InteractionAddress {
    pub address: String,
    pub channels: Vec<Channel>,
}

impl InteractionAddress {
    pub fn new(address: &str, channels: &[Channel]) -> Self {
        Self {
            address: address.to_string(),
            channels: channels.to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PanelSettings {
    pub fire_step: i32,
    pub hold_ms: u64,
    pub chatbox_enabled: bool,
    pub panel_control: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            fire_step: 30,
            hold_ms: 1000,
            chatbox_enabled: true,
            panel_control: true,
        }
    }
}

impl PanelSettings {
    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TonSettings {
    pub enabled: bool,
    pub url: String,
    pub channel: Channel,
    pub damage_scale: f64,
    pub damage_cap: i32,
    pub decay_per_second: i32,
    pub death_penalty_strength: i32,
    pub death_penalty_secs: u64,
}

impl Default for TonSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "ws://localhost:11398".to_string(),
            channel: Channel::A,
            damage_scale: 1.0,
            damage_cap: 100,
            decay_per_second: 2,
            death_penalty_strength: 30,
            death_penalty_secs: 5,
        }
    }
}

impl TonSettings {
    pub fn death_penalty(&self) -> Duration {
        Duration::from_secs(self.death_penalty_secs)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArbitrationSettings {
    pub gui_cooldown_ms: u64,
    pub panel_cooldown_ms: u64,
    pub interaction_cooldown_ms: u64,
    pub ton_cooldown_ms: u64,
    pub interaction_flush_ms: u64,
    /// Tiers that start disabled.
    pub disabled_tiers: Vec<CommandType>,
}

impl Default for ArbitrationSettings {
    fn default() -> Self {
        Self {
            gui_cooldown_ms: 0,
            panel_cooldown_ms: 100,
            interaction_cooldown_ms: 50,
            ton_cooldown_ms: 200,
            interaction_flush_ms: 50,
            disabled_tiers: Vec::new(),
        }
    }
}

impl ArbitrationSettings {
    pub fn cooldowns(&self) -> CooldownTable {
        CooldownTable::default()
            .with(CommandType::Gui, Duration::from_millis(self.gui_cooldown_ms))
            .with(CommandType::Panel, Duration::from_millis(self.panel_cooldown_ms))
            .with(
                CommandType::Interaction,
                Duration::from_millis(self.interaction_cooldown_ms),
            )
            .with(CommandType::Ton, Duration::from_millis(self.ton_cooldown_ms))
    }

    pub fn interaction_flush(&self) -> Duration {
        Duration::from_millis(self.interaction_flush_ms.max(1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeviceSettings {
    pub a_limit: i32,
    pub b_limit: i32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            a_limit: 100,
            b_limit: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PeriodicSettings {
    pub pulse_reassert_ms: u64,
    pub chatbox_ms: u64,
}

impl Default for PeriodicSettings {
    fn default() -> Self {
        Self {
            pulse_reassert_ms: 3000,
            chatbox_ms: 3000,
        }
    }
}

impl PeriodicSettings {
    pub fn pulse_reassert(&self) -> Duration {
        Duration::from_millis(self.pulse_reassert_ms.max(100))
    }

    pub fn chatbox(&self) -> Duration {
        Duration::from_millis(self.chatbox_ms.max(100))
    }
}

impl Settings {
    /// Missing file yields defaults; missing keys are filled from defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(path = %path.display(), "failed to load settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, port) in [
            ("port", self.port),
            ("osc_port", self.osc_port),
            ("osc.vrchat_port", self.osc.vrchat_port),
        ] {
            if port == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be in 1..=65535")));
            }
        }
        if !self.ip.is_empty() && self.ip.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Invalid(format!("ip is not an address: {}", self.ip)));
        }
        if self.device.a_limit < 0 || self.device.b_limit < 0 {
            return Err(ConfigError::Invalid("device limits must be >= 0".to_string()));
        }
        if !(self.ton.damage_scale.is_finite() && self.ton.damage_scale >= 0.0) {
            return Err(ConfigError::Invalid("ton.damage_scale must be >= 0".to_string()));
        }
        for route in &self.osc.interaction {
            if route.channels.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "interaction address {} has no channels",
                    route.address
                )));
            }
        }
        Ok(())
    }

    /// Explicit `ip` wins; otherwise the configured interface's IPv4 address.
    pub fn resolve_ip(&self) -> Option<IpAddr> {
        if let Ok(ip) = self.ip.parse::<IpAddr>() {
            return Some(ip);
        }
        if self.interface.is_empty() {
            return local_ip_address::local_ip().ok();
        }
        let interfaces = local_ip_address::list_afinet_netifas().ok()?;
        interfaces
            .into_iter()
            .find(|(name, ip)| name == &self.interface && ip.is_ipv4())
            .map(|(_, ip)| ip)
    }

    /// WebSocket endpoint the DG-LAB app is pointed at.
    pub fn device_endpoint(&self) -> String {
        let ip = self
            .resolve_ip()
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        format!("ws://{ip}:{}", self.port)
    }
}

/// IPv4 interfaces available for [`Settings::interface`].
pub fn active_interfaces() -> Vec<(String, IpAddr)> {
    match local_ip_address::list_afinet_netifas() {
        Ok(list) => list.into_iter().filter(|(_, ip)| ip.is_ipv4()).collect(),
        Err(e) => {
            tracing::warn!("failed to enumerate interfaces: {e}");
            Vec::new()
        }
    }
}
