use crate::i18n::Language;
use crate::osc_net::OscSender;
use crate::panel::PanelStatus;
use crate::pulse;
use crate::state::ChannelState;
use dglab_protocol::Channel;

pub fn status_text(
    language: Language,
    a: &ChannelState,
    b: &ChannelState,
    panel: &PanelStatus,
) -> String {
    if !a.linked && !b.linked {
        return language.not_connected().to_string();
    }
    let pulse_name = |s: &ChannelState| {
        pulse::get(s.pulse_mode)
            .map(|w| language.waveform_name(w))
            .unwrap_or("-")
    };
    let current = match panel.selected {
        Channel::A => format!("[A]: {} B: {}", a.current_strength, b.current_strength),
        Channel::B => format!("A: {} [B]: {}", a.current_strength, b.current_strength),
    };
    format!(
        "MAX A: {} B: {}\nMode A: {} B: {} \nPulse A: {} B: {} \nFire Step: {}\nCurrent: {} \n",
        a.limit,
        b.limit,
        language.mode_name(a.mode),
        language.mode_name(b.mode),
        pulse_name(a),
        pulse_name(b),
        panel.fire_step,
        current,
    )
}

/// Sends the status line while enabled and a single empty line after it is
/// switched off, which clears the bubble in game.
pub struct ChatboxReporter {
    language: Language,
    sender: OscSender,
    was_enabled: bool,
}

impl ChatboxReporter {
    pub fn new(language: Language, sender: OscSender) -> Self {
        Self {
            language,
            sender,
            was_enabled: false,
        }
    }

    pub fn tick(&mut self, a: &ChannelState, b: &ChannelState, panel: &PanelStatus) -> Option<String> {
        if panel.chatbox_enabled {
            let text = status_text(self.language, a, b, panel);
            self.sender.chatbox(&text);
            self.was_enabled = true;
            Some(text)
        } else if self.was_enabled {
            self.sender.chatbox("");
            self.was_enabled = false;
            Some(String::new())
        } else {
            None
        }
    }
}
