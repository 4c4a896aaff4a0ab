use dglab_protocol::{Channel, DeviceEvent, FeedbackButton, StrengthData, TonMessage};

#[test]
fn ton_damage_parses_numeric_value() {
    let msg: TonMessage = serde_json::from_str(r#"{"Type":"DAMAGED","Value":12}"#).unwrap();
    assert_eq!(msg, TonMessage::Damaged { value: 12.0 });
}

#[test]
fn ton_alive_accepts_bool_and_number() {
    let dead: TonMessage = serde_json::from_str(r#"{"Type":"ALIVE","Value":false}"#).unwrap();
    assert_eq!(dead, TonMessage::Alive { value: false });

    let dead: TonMessage = serde_json::from_str(r#"{"Type":"ALIVE","Value":0}"#).unwrap();
    assert_eq!(dead, TonMessage::Alive { value: false });

    let alive: TonMessage = serde_json::from_str(r#"{"Type":"ALIVE","Value":1}"#).unwrap();
    assert_eq!(alive, TonMessage::Alive { value: true });
}

#[test]
fn ton_connected_carries_display_name() {
    let msg: TonMessage =
        serde_json::from_str(r#"{"Type":"CONNECTED","DisplayName":"kuma","Args":[]}"#).unwrap();
    assert_eq!(
        msg,
        TonMessage::Connected {
            display_name: Some("kuma".to_string())
        }
    );
}

#[test]
fn ton_unknown_type_is_not_an_error() {
    let msg: TonMessage = serde_json::from_str(r#"{"Type":"ROUND_TYPE","Value":3}"#).unwrap();
    assert_eq!(msg, TonMessage::Unknown);
}

#[test]
fn strength_data_accessors_follow_channel() {
    let mut data = StrengthData {
        a: 10,
        b: 20,
        a_limit: 100,
        b_limit: 80,
    };
    data.set_strength(Channel::B, 33);
    assert_eq!(data.strength(Channel::A), 10);
    assert_eq!(data.strength(Channel::B), 33);
    assert_eq!(data.limit(Channel::B), 80);
}

#[test]
fn device_event_is_tagged() {
    let json = serde_json::to_string(&DeviceEvent::Feedback {
        button: FeedbackButton::A2,
    })
    .unwrap();
    assert_eq!(json, r#"{"type":"feedback","button":"A2"}"#);
    assert_eq!(FeedbackButton::B1.channel(), Channel::B);
}
