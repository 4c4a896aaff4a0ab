use dglab_bridge::{
    status_text, Channel, ChannelState, CommandType, ConfigError, ControlMode, Language,
    PanelStatus, Settings,
};
use std::io::Write;
use std::time::Duration;

#[test]
fn missing_or_empty_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");
    assert_eq!(Settings::load(&path).unwrap(), Settings::default());

    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(Settings::load(&path).unwrap(), Settings::default());
}

#[test]
fn partial_file_keeps_defaults_for_missing_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "osc_port: 9101\nlanguage: en\nton:\n  channel: B\n  enabled: false\narbitration:\n  ton_cooldown_ms: 500\n  disabled_tiers: [periodic, interaction]\n"
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.osc_port, 9101);
    assert_eq!(settings.language, Language::En);
    assert_eq!(settings.ton.channel, Channel::B);
    assert!(!settings.ton.enabled);
    assert_eq!(settings.ton.url, "ws://localhost:11398");
    assert_eq!(settings.port, 5678);
    assert_eq!(settings.panel.hold(), Duration::from_secs(1));

    let cooldowns = settings.arbitration.cooldowns();
    assert_eq!(cooldowns.window(CommandType::Ton), Duration::from_millis(500));
    assert_eq!(cooldowns.window(CommandType::Panel), Duration::from_millis(100));
    assert_eq!(cooldowns.window(CommandType::Gui), Duration::ZERO);
    assert_eq!(cooldowns.window(CommandType::Periodic), Duration::ZERO);
    assert_eq!(
        settings.arbitration.disabled_tiers,
        vec![CommandType::Periodic, CommandType::Interaction]
    );
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");

    let mut settings = Settings::default();
    settings.ip = "192.168.1.20".to_string();
    settings.panel.fire_step = 45;
    settings.osc.interaction[0].channels = vec![Channel::A, Channel::B];
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.device_endpoint(), "ws://192.168.1.20:5678");
}

#[test]
fn malformed_yaml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "osc_port: [not, a, port]\n").unwrap();
    assert!(matches!(
        Settings::load(file.path()),
        Err(ConfigError::Yaml(_))
    ));

    let fallback = Settings::load_or_default(file.path());
    assert_eq!(fallback, Settings::default());
}

#[test]
fn validation_rejects_bad_values() {
    let mut s = Settings::default();
    s.osc_port = 0;
    assert!(matches!(s.validate(), Err(ConfigError::Invalid(_))));

    let mut s = Settings::default();
    s.ip = "not-an-ip".to_string();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.device.b_limit = -1;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ton.damage_scale = f64::NAN;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.osc.interaction[1].channels.clear();
    let err = s.validate().unwrap_err().to_string();
    assert!(err.contains("UpperLeg_L"), "{err}");

    assert!(Settings::default().validate().is_ok());
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "port: 0\n").unwrap();
    assert!(matches!(
        Settings::load(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn language_parses_case_insensitively() {
    assert_eq!(" EN ".parse::<Language>(), Ok(Language::En));
    assert_eq!("ja".parse::<Language>(), Ok(Language::Ja));
    assert!("fr".parse::<Language>().is_err());
}

#[test]
fn status_text_lists_both_channels() {
    let panel = PanelStatus::default();
    let mut a = ChannelState::default();
    let b = ChannelState::default();
    assert_eq!(status_text(Language::En, &a, &b, &panel), "Not connected");

    a.linked = true;
    a.current_strength = 12;
    a.limit = 80;
    a.mode = ControlMode::Interaction;
    let text = status_text(Language::En, &a, &b, &panel);
    assert_eq!(
        text,
        "MAX A: 80 B: 200\nMode A: Interaction B: Panel \nPulse A: Breath B: Breath \nFire Step: 30\nCurrent: [A]: 12 B: 0 \n"
    );

    let panel = PanelStatus {
        selected: Channel::B,
        ..PanelStatus::default()
    };
    let text = status_text(Language::Zh, &a, &b, &panel);
    assert!(text.contains("Current: A: 12 [B]: 0"), "{text}");
    assert!(text.contains("交互") && text.contains("面板"), "{text}");

    let text = status_text(Language::Ja, &a, &b, &panel);
    assert!(text.contains("パネル") && text.contains("呼吸"), "{text}");
    assert!(!text.contains("Breath"), "{text}");
}

#[test]
fn every_waveform_has_a_japanese_name() {
    for w in dglab_bridge::pulse::WAVEFORMS.iter() {
        assert!(!w.name_ja.is_empty(), "{} has no japanese name", w.name_en);
        assert_eq!(Language::Ja.waveform_name(w), w.name_ja);
    }
}
