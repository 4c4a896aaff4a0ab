mod common;

use common::{settle, wait_for, MockDevice};
use dglab_bridge::{Bridge, Channel, CommandType, Settings, TonMessage};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

fn start(settings: &Settings) -> (Bridge, Arc<MockDevice>) {
    let (device, events) = MockDevice::new();
    let device = Arc::new(device);
    let bridge = Bridge::new(settings, Arc::clone(&device), events).expect("bridge");
    (bridge, device)
}

fn damaged(value: f64) -> TonMessage {
    TonMessage::Damaged { value }
}

#[tokio::test(start_paused = true)]
async fn damage_raises_strength_once_per_cooldown() {
    let (bridge, device) = start(&Settings::default());
    settle(10).await;

    bridge.ton().handle(damaged(5.0));
    settle(10).await;
    bridge.ton().handle(damaged(7.0));
    settle(10).await;

    assert_eq!(bridge.control().snapshot(Channel::A).current_strength, 5);
    assert_eq!(bridge.ton().status().damage, 5);
    assert_eq!(device.strength_calls(Channel::A), vec![5]);

    settle(250).await;
    bridge.ton().handle(damaged(7.0));
    settle(10).await;
    assert_eq!(bridge.control().snapshot(Channel::A).current_strength, 12);
    assert_eq!(bridge.ton().status().damage, 12);
}

#[tokio::test(start_paused = true)]
async fn damage_is_scaled_and_capped() {
    let mut settings = Settings::default();
    settings.ton.damage_scale = 2.0;
    settings.ton.damage_cap = 15;
    settings.ton.channel = Channel::B;
    let (bridge, device) = start(&settings);
    settle(10).await;

    bridge.ton().handle(damaged(4.0));
    settle(250).await;
    bridge.ton().handle(damaged(4.0));
    settle(250).await;
    bridge.ton().handle(damaged(4.0));
    settle(10).await;

    assert_eq!(device.strength_calls(Channel::B), vec![8, 15]);
    assert_eq!(bridge.ton().status().damage, 15);
    assert!(device.strength_calls(Channel::A).is_empty());
}

#[tokio::test(start_paused = true)]
async fn damage_decays_every_second() {
    let (bridge, _device) = start(&Settings::default());
    settle(10).await;

    bridge.ton().handle(damaged(5.0));
    settle(1_000).await;
    assert_eq!(bridge.ton().status().damage, 3);
    assert_eq!(bridge.control().snapshot(Channel::A).current_strength, 3);

    settle(2_000).await;
    assert_eq!(bridge.ton().status().damage, 0);
    assert_eq!(bridge.control().snapshot(Channel::A).current_strength, 0);
}

#[tokio::test(start_paused = true)]
async fn death_applies_penalty_then_restores() {
    let (bridge, device) = start(&Settings::default());
    let control = bridge.control();
    settle(10).await;

    control.set_strength(Channel::A, 10);
    settle(10).await;

    bridge.ton().handle(TonMessage::Alive { value: false });
    settle(10).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 30);
    assert!(bridge.ton().status().penalty_active);

    settle(300).await;
    bridge.ton().handle(damaged(5.0));
    settle(10).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 30);

    settle(5_000).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 10);
    assert!(!bridge.ton().status().penalty_active);
    assert_eq!(
        control.snapshot(Channel::A).last_command_source.as_deref(),
        Some("ton:restore")
    );
    assert_eq!(device.strength_calls(Channel::A), vec![10, 30, 10]);
}

#[tokio::test(start_paused = true)]
async fn saved_resets_damage_and_cancels_penalty() {
    let (bridge, _device) = start(&Settings::default());
    let control = bridge.control();
    settle(10).await;

    bridge.ton().handle(damaged(9.0));
    settle(10).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 9);

    bridge.ton().handle(TonMessage::Saved);
    settle(10).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 0);
    assert_eq!(bridge.ton().status().damage, 0);

    settle(300).await;
    bridge.ton().handle(TonMessage::Alive { value: false });
    settle(300).await;
    bridge.ton().handle(TonMessage::Saved);
    settle(6_000).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 0);
    assert!(!bridge.ton().status().penalty_active);
}

#[tokio::test(start_paused = true)]
async fn player_name_and_unknown_messages() {
    let (bridge, device) = start(&Settings::default());
    settle(10).await;

    bridge.ton().handle(TonMessage::Connected {
        display_name: Some("Kani".to_string()),
    });
    bridge.ton().handle(TonMessage::Stats { display_name: None });
    bridge.ton().handle(TonMessage::Unknown);
    bridge.ton().handle(TonMessage::Alive { value: true });
    settle(10).await;

    assert_eq!(bridge.ton().status().display_name.as_deref(), Some("Kani"));
    assert!(device.strength_calls(Channel::A).is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabled_ton_tier_never_reaches_device() {
    let mut settings = Settings::default();
    settings.ton.enabled = false;
    let (bridge, device) = start(&settings);
    settle(10).await;

    bridge.ton().handle(damaged(5.0));
    settle(10).await;
    assert!(device.strength_calls(Channel::A).is_empty());
    assert_eq!(bridge.control().snapshot(Channel::A).current_strength, 0);
}

#[tokio::test(start_paused = true)]
async fn damage_is_not_counted_while_tier_disabled() {
    let (bridge, device) = start(&Settings::default());
    let control = bridge.control();
    settle(10).await;

    bridge.ton().handle(damaged(6.0));
    settle(10).await;
    assert_eq!(bridge.ton().status().damage, 6);

    control.set_tier_enabled(CommandType::Ton, false);
    settle(1_000).await;
    assert_eq!(bridge.ton().status().damage, 0);
    assert_eq!(control.snapshot(Channel::A).current_strength, 6);

    for _ in 0..5 {
        bridge.ton().handle(damaged(10.0));
        settle(250).await;
    }
    bridge.ton().handle(TonMessage::Alive { value: false });
    settle(10).await;
    assert_eq!(bridge.ton().status(), dglab_bridge::TonStatus::default());

    control.set_strength(Channel::A, 40);
    settle(10).await;
    control.set_tier_enabled(CommandType::Ton, true);
    settle(3_000).await;
    assert_eq!(control.snapshot(Channel::A).current_strength, 40);
    assert_eq!(device.strength_calls(Channel::A), vec![6, 40]);
}

#[tokio::test]
async fn websocket_events_drive_the_adapter() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for text in [
            r#"{"Type":"CONNECTED","DisplayName":"Tester"}"#,
            r#"{"Type":"ROUND_TYPE","Value":3}"#,
            "not json",
            r#"{"Type":"DAMAGED","Value":6}"#,
        ] {
            ws.send(Message::text(text.to_string())).await.unwrap();
        }
        // Stay up until the client closes.
        while let Some(msg) = ws.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
        let _ = closed_tx.send(());
    });

    let mut settings = Settings::default();
    settings.ton.url = format!("ws://{addr}");
    settings.ton.decay_per_second = 0;
    let (mut bridge, _device) = start(&settings);
    bridge.attach_ton(&settings);
    let control = bridge.control();

    let mut state = control.subscribe(Channel::A);
    let a = wait_for(&mut state, Duration::from_secs(5), |s| s.current_strength == 6).await;
    assert_eq!(a.last_command_source.as_deref(), Some("ton:damage"));

    let status = control.ton_status();
    assert!(status.connected);
    assert_eq!(status.display_name.as_deref(), Some("Tester"));

    control.set_ton_enabled(false);
    tokio::time::timeout(Duration::from_secs(5), closed_rx)
        .await
        .expect("client closed the socket")
        .unwrap();
    let mut ton = bridge.ton().subscribe();
    tokio::time::timeout(Duration::from_secs(5), ton.wait_for(|s| !s.connected))
        .await
        .expect("status shows disconnected")
        .unwrap();

    bridge.shutdown();
    server.await.unwrap();
}
