use crate::config::InteractionAddress;
use crate::pulse;
use dglab_protocol::Channel;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RouteError {
    #[error("duplicate osc address: {0}")]
    DuplicateAddress(String),
    #[error("route {address} selects unknown waveform {index}")]
    UnknownWaveform { address: String, index: usize },
    #[error("bad interaction pattern {pattern}: {reason}")]
    BadPattern { pattern: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Held for the hold time: flip interaction/panel mode on the selected channel.
    ToggleMode,
    ResetStrength,
    DecreaseStrength,
    IncreaseStrength,
    Fire,
    /// Held for the hold time: flip the ChatBox status reporter.
    ToggleChatbox,
    SelectPulse(usize),
    FireStep,
    SelectChannel,
    PanelControl,
}

pub struct PanelRoute {
    pub address: &'static str,
    pub action: PanelAction,
}

const fn route(address: &'static str, action: PanelAction) -> PanelRoute {
    PanelRoute { address, action }
}

pub static PANEL_ROUTES: &[PanelRoute] = &[
    route("/avatar/parameters/SoundPad/Button/1", PanelAction::ToggleMode),
    route("/avatar/parameters/SoundPad/Button/2", PanelAction::ResetStrength),
    route("/avatar/parameters/SoundPad/Button/3", PanelAction::DecreaseStrength),
    route("/avatar/parameters/SoundPad/Button/4", PanelAction::IncreaseStrength),
    route("/avatar/parameters/SoundPad/Button/5", PanelAction::Fire),
    route("/avatar/parameters/SoundPad/Button/6", PanelAction::ToggleChatbox),
    route("/avatar/parameters/SoundPad/Button/7", PanelAction::SelectPulse(2)),
    route("/avatar/parameters/SoundPad/Button/8", PanelAction::SelectPulse(14)),
    route("/avatar/parameters/SoundPad/Button/9", PanelAction::SelectPulse(4)),
    route("/avatar/parameters/SoundPad/Button/10", PanelAction::SelectPulse(5)),
    route("/avatar/parameters/SoundPad/Button/11", PanelAction::SelectPulse(6)),
    route("/avatar/parameters/SoundPad/Button/12", PanelAction::SelectPulse(7)),
    route("/avatar/parameters/SoundPad/Button/13", PanelAction::SelectPulse(8)),
    route("/avatar/parameters/SoundPad/Button/14", PanelAction::SelectPulse(9)),
    route("/avatar/parameters/SoundPad/Button/15", PanelAction::SelectPulse(1)),
    route("/avatar/parameters/SoundPad/Volume", PanelAction::FireStep),
    route("/avatar/parameters/SoundPad/Page", PanelAction::SelectChannel),
    route("/avatar/parameters/SoundPad/PanelControl", PanelAction::PanelControl),
];

struct InteractionRoute {
    pattern: String,
    matcher: Option<Regex>,
    channels: Vec<Channel>,
}

impl InteractionRoute {
    fn matches(&self, address: &str) -> bool {
        match &self.matcher {
            Some(re) => re.is_match(address),
            None => self.pattern == address,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Panel(PanelAction),
    Interaction(&'a [Channel]),
}

/// Address lookup for everything the bridge listens to, validated on build.
pub struct RouteTable {
    panel: HashMap<&'static str, PanelAction>,
    interaction: Vec<InteractionRoute>,
}

impl RouteTable {
    pub fn new(
        panel_routes: &'static [PanelRoute],
        interaction: &[InteractionAddress],
    ) -> Result<Self, RouteError> {
        let mut panel = HashMap::new();
        for r in panel_routes {
            if let PanelAction::SelectPulse(index) = r.action {
                if pulse::get(index).is_none() {
                    return Err(RouteError::UnknownWaveform {
                        address: r.address.to_string(),
                        index,
                    });
                }
            }
            if panel.insert(r.address, r.action).is_some() {
                return Err(RouteError::DuplicateAddress(r.address.to_string()));
            }
        }

        let mut routes: Vec<InteractionRoute> = Vec::with_capacity(interaction.len());
        for entry in interaction {
            if panel.contains_key(entry.address.as_str())
                || routes.iter().any(|r| r.pattern == entry.address)
            {
                return Err(RouteError::DuplicateAddress(entry.address.clone()));
            }
            let matcher = if entry.address.contains('*') {
                Some(compile_wildcard(&entry.address)?)
            } else {
                None
            };
            let mut channels = entry.channels.clone();
            channels.sort();
            channels.dedup();
            routes.push(InteractionRoute {
                pattern: entry.address.clone(),
                matcher,
                channels,
            });
        }

        tracing::debug!(
            panel = panel.len(),
            interaction = routes.len(),
            "osc route table built"
        );
        Ok(Self {
            panel,
            interaction: routes,
        })
    }

    pub fn with_defaults(interaction: &[InteractionAddress]) -> Result<Self, RouteError> {
        Self::new(PANEL_ROUTES, interaction)
    }

    /// Exact panel addresses win; interaction routes are tried in order.
    pub fn resolve(&self, address: &str) -> Option<Route<'_>> {
        if let Some(action) = self.panel.get(address) {
            return Some(Route::Panel(*action));
        }
        self.interaction
            .iter()
            .find(|r| r.matches(address))
            .map(|r| Route::Interaction(r.channels.as_slice()))
    }
}

fn compile_wildcard(pattern: &str) -> Result<Regex, RouteError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("[^/]*");
    Regex::new(&format!("^{body}$")).map_err(|e| RouteError::BadPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
