use dglab_bridge::{pulse, Channel, CommandType, ControlMode, FeedbackButton};

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Set(Channel, i32),
    Increase(Channel, i32),
    Decrease(Channel, i32),
    Pulse(Channel, usize),
    Mode(Channel, ControlMode),
    Tier(CommandType, bool),
    PanelControl(bool),
    Chatbox(bool),
    FireStep(i32),
    Select(Channel),
    Ton(bool),
    Feedback(FeedbackButton),
    Unplug,
    Status,
    Pulses,
    Save,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  set <A|B> <n>          set strength
  inc <A|B> <n>          increase strength
  dec <A|B> <n>          decrease strength
  pulse <A|B> <index>    select waveform (see `pulses`)
  mode <A|B> <interaction|panel>
  tier <gui|panel|interaction|ton|periodic> <on|off>
  panel <on|off>         panel + interaction control
  chatbox <on|off>
  step <0-100>           fire step
  select <A|B>           channel driven by the SoundPad
  ton <on|off>
  feedback <A1|A2|B1|B2> simulate an app feedback button
  unplug                 simulate a device disconnect
  status | pulses | save | help | quit";

pub fn parse(line: &str) -> Result<ConsoleCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    let parsed = match (cmd.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("set", [ch, n]) => ConsoleCommand::Set(channel(ch)?, number(n)?),
        ("inc", [ch, n]) => ConsoleCommand::Increase(channel(ch)?, number(n)?),
        ("dec", [ch, n]) => ConsoleCommand::Decrease(channel(ch)?, number(n)?),
        ("pulse", [ch, n]) => {
            let index = number(n)?;
            if index < 0 || pulse::get(index as usize).is_none() {
                return Err(format!("no waveform {index}"));
            }
            ConsoleCommand::Pulse(channel(ch)?, index as usize)
        }
        ("mode", [ch, m]) => ConsoleCommand::Mode(channel(ch)?, mode(m)?),
        ("tier", [t, v]) => ConsoleCommand::Tier(tier(t)?, switch(v)?),
        ("panel", [v]) => ConsoleCommand::PanelControl(switch(v)?),
        ("chatbox", [v]) => ConsoleCommand::Chatbox(switch(v)?),
        ("step", [n]) => ConsoleCommand::FireStep(number(n)?),
        ("select", [ch]) => ConsoleCommand::Select(channel(ch)?),
        ("ton", [v]) => ConsoleCommand::Ton(switch(v)?),
        ("feedback", [b]) => ConsoleCommand::Feedback(button(b)?),
        ("unplug", []) => ConsoleCommand::Unplug,
        ("status", []) => ConsoleCommand::Status,
        ("pulses", []) => ConsoleCommand::Pulses,
        ("save", []) => ConsoleCommand::Save,
        ("help", []) | ("?", []) => ConsoleCommand::Help,
        ("quit", []) | ("exit", []) => ConsoleCommand::Quit,
        _ => return Err(format!("unrecognized command: {line}")),
    };
    Ok(parsed)
}

fn channel(s: &str) -> Result<Channel, String> {
    match s.to_ascii_uppercase().as_str() {
        "A" => Ok(Channel::A),
        "B" => Ok(Channel::B),
        _ => Err(format!("bad channel: {s}")),
    }
}

fn number(s: &str) -> Result<i32, String> {
    s.parse().map_err(|_| format!("bad number: {s}"))
}

fn switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got {s}")),
    }
}

fn mode(s: &str) -> Result<ControlMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "interaction" | "i" => Ok(ControlMode::Interaction),
        "panel" | "p" => Ok(ControlMode::Panel),
        _ => Err(format!("bad mode: {s}")),
    }
}

fn tier(s: &str) -> Result<CommandType, String> {
    CommandType::ALL
        .into_iter()
        .find(|t| t.to_string() == s.to_ascii_lowercase())
        .ok_or_else(|| format!("bad tier: {s}"))
}

fn button(s: &str) -> Result<FeedbackButton, String> {
    match s.to_ascii_uppercase().as_str() {
        "A1" => Ok(FeedbackButton::A1),
        "A2" => Ok(FeedbackButton::A2),
        "B1" => Ok(FeedbackButton::B1),
        "B2" => Ok(FeedbackButton::B2),
        _ => Err(format!("bad feedback button: {s}")),
    }
}
