use crate::ton::TonAdapter;
use dglab_protocol::TonMessage;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub const TON_CONTROL_CAP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TonControl {
    Connect,
    Disconnect,
}

/// Client loop for the ToN game-integration socket. Reconnects with backoff
/// until told to disconnect or the control channel closes.
pub async fn run(url: String, mut rx: mpsc::Receiver<TonControl>, adapter: TonAdapter, start_connected: bool) {
    let mut desired_connected = start_connected;
    let mut backoff = Backoff::default();

    loop {
        if !desired_connected {
            adapter.set_connected(false);
            match rx.recv().await {
                Some(TonControl::Connect) => desired_connected = true,
                Some(TonControl::Disconnect) => {}
                None => return,
            }
            continue;
        }

        let mut socket = tokio::select! {
            res = tokio_tungstenite::connect_async(url.as_str()) => match res {
                Ok((socket, _)) => socket,
                Err(e) => {
                    let retry = backoff.next_delay();
                    tracing::debug!(%url, retry_secs = retry.as_secs(), "ton connect failed: {e}");
                    tokio::select! {
                        _ = tokio::time::sleep(retry) => {}
                        cmd = rx.recv() => match cmd {
                            Some(TonControl::Disconnect) => desired_connected = false,
                            Some(TonControl::Connect) => {}
                            None => return,
                        }
                    }
                    continue;
                }
            },
            cmd = rx.recv() => {
                match cmd {
                    Some(TonControl::Disconnect) => desired_connected = false,
                    Some(TonControl::Connect) => {}
                    None => return,
                }
                continue;
            }
        };

        backoff.reset();
        adapter.set_connected(true);
        tracing::info!(%url, "ton websocket connected");

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    match cmd {
                        Some(TonControl::Connect) => {}
                        Some(TonControl::Disconnect) => {
                            desired_connected = false;
                            let _ = socket.close(None).await;
                            break;
                        }
                        None => {
                            let _ = socket.close(None).await;
                            adapter.set_connected(false);
                            return;
                        }
                    }
                }
                incoming = socket.next() => {
                    match incoming {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(msg)) => {
                            if msg.is_text() {
                                handle_text(&adapter, msg);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!("ton websocket error: {e}");
                            break;
                        }
                    }
                }
            }
        }

        adapter.set_connected(false);
        tracing::info!("ton websocket disconnected");
    }
}

fn handle_text(adapter: &TonAdapter, msg: Message) {
    let Ok(text) = msg.into_text() else { return };
    match serde_json::from_str::<TonMessage>(&text) {
        Ok(ton) => {
            tracing::debug!(?ton, "ton message");
            adapter.handle(ton);
        }
        Err(e) => tracing::warn!("ignoring malformed ton message: {e}"),
    }
}

#[derive(Default)]
struct Backoff {
    idx: usize,
}

impl Backoff {
    fn reset(&mut self) {
        self.idx = 0;
    }

    fn next_delay(&mut self) -> Duration {
        let delays = [1, 2, 5, 10];
        let secs = delays.get(self.idx).copied().unwrap_or(10);
        self.idx = (self.idx + 1).min(delays.len());
        Duration::from_secs(secs)
    }
}
