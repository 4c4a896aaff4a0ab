mod console;

use clap::Parser;
use console::ConsoleCommand;
use dglab_bridge::{
    pulse, Bridge, Channel, ControlHandle, LoopbackDevice, Settings, DEFAULT_SETTINGS_FILE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bridge_cli")]
struct Args {
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Override the OSC listen port from the settings file.
    #[arg(long)]
    osc_port: Option<u16>,

    #[arg(long, default_value_t = false)]
    no_ton: bool,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print IPv4 interfaces usable as `interface` and exit.
    #[arg(long, default_value_t = false)]
    list_interfaces: bool,

    /// Write the effective settings back to --config and exit.
    #[arg(long, default_value_t = false)]
    write_config: bool,

    /// Run without the stdin console (service mode).
    #[arg(long, default_value_t = false)]
    headless: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .map_err(|e| anyhow::anyhow!("invalid log level {}: {e}", args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.list_interfaces {
        for (name, ip) in dglab_bridge::active_interfaces() {
            println!("{name}\t{ip}");
        }
        return Ok(());
    }

    let mut settings = Settings::load(&args.config)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", args.config.display()))?;
    if let Some(port) = args.osc_port {
        settings.osc_port = port;
    }
    if args.no_ton {
        settings.ton.enabled = false;
    }

    if args.write_config {
        settings.save(&args.config)?;
        return Ok(());
    }

    tracing::info!(endpoint = %settings.device_endpoint(), "device endpoint");

    let (device, events) = LoopbackDevice::new(settings.device.a_limit, settings.device.b_limit);
    let device = Arc::new(device);
    let mut bridge = Bridge::start(&settings, Arc::clone(&device), events).await?;
    if let Some(addr) = bridge.osc_local_addr() {
        tracing::info!(%addr, "listening for VRChat OSC");
    }

    if args.headless {
        tokio::signal::ctrl_c().await?;
    } else {
        println!("{}", console::HELP);
        let control = bridge.control();
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            res = run_console(&control, &device, &settings, &args.config) => res?,
        }
    }

    bridge.shutdown();
    Ok(())
}

async fn run_console(
    control: &ControlHandle,
    device: &LoopbackDevice,
    settings: &Settings,
    config_path: &Path,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match console::parse(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match cmd {
            ConsoleCommand::Set(ch, v) => {
                control.set_strength(ch, v);
            }
            ConsoleCommand::Increase(ch, v) => {
                control.increase(ch, v);
            }
            ConsoleCommand::Decrease(ch, v) => {
                control.decrease(ch, v);
            }
            ConsoleCommand::Pulse(ch, i) => {
                control.select_pulse(ch, i);
            }
            ConsoleCommand::Mode(ch, m) => {
                control.set_mode(ch, m);
            }
            ConsoleCommand::Tier(t, on) => control.set_tier_enabled(t, on),
            ConsoleCommand::PanelControl(on) => control.set_panel_control(on),
            ConsoleCommand::Chatbox(on) => control.set_chatbox(on),
            ConsoleCommand::FireStep(step) => control.set_fire_step(step),
            ConsoleCommand::Select(ch) => control.select_channel(ch),
            ConsoleCommand::Ton(on) => control.set_ton_enabled(on),
            ConsoleCommand::Feedback(button) => device.press(button),
            ConsoleCommand::Unplug => device.disconnect(),
            ConsoleCommand::Status => print_status(control, settings),
            ConsoleCommand::Pulses => {
                for (i, w) in pulse::WAVEFORMS.iter().enumerate() {
                    println!("{i:>2}  {}  ({})", settings.language.waveform_name(w), w.name_en);
                }
            }
            ConsoleCommand::Save => {
                let mut current = settings.clone();
                let panel = control.panel_status();
                current.panel.fire_step = panel.fire_step;
                current.panel.chatbox_enabled = panel.chatbox_enabled;
                current.panel.panel_control = panel.panel_control;
                match current.save(config_path) {
                    Ok(()) => println!("saved {}", config_path.display()),
                    Err(e) => println!("save failed: {e}"),
                }
            }
            ConsoleCommand::Help => println!("{}", console::HELP),
            ConsoleCommand::Quit => return Ok(()),
        }
    }
    Ok(())
}

fn print_status(control: &ControlHandle, settings: &Settings) {
    let a = control.snapshot(Channel::A);
    let b = control.snapshot(Channel::B);
    let panel = control.panel_status();
    print!("{}", dglab_bridge::status_text(settings.language, &a, &b, &panel));
    for (ch, s) in [(Channel::A, &a), (Channel::B, &b)] {
        println!(
            "{ch}: target {} last {:?} linked {}",
            s.target_strength,
            s.last_command_source.as_deref().unwrap_or("-"),
            s.linked
        );
    }
    let ton = control.ton_status();
    println!(
        "ToN: connected {} player {} damage {}{}",
        ton.connected,
        ton.display_name.as_deref().unwrap_or("-"),
        ton.damage,
        if ton.penalty_active { " (penalty)" } else { "" }
    );
}
