use rosc::{OscMessage, OscPacket, OscType};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const OSC_INBOUND_CAP: usize = 512;
const RECV_BUF: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum OscError {
    #[error("osc socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("osc encode error: {0}")]
    Encode(String),
}

/// Decoded OSC message, bundles already flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct OscInput {
    pub address: String,
    pub args: Vec<OscType>,
}

impl OscInput {
    pub fn new(address: impl Into<String>, args: Vec<OscType>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// First argument coerced to a float; VRChat sends bools, ints and floats.
    pub fn value(&self) -> Option<f32> {
        match self.args.first()? {
            OscType::Float(f) => Some(*f),
            OscType::Double(d) => Some(*d as f32),
            OscType::Int(i) => Some(*i as f32),
            OscType::Long(l) => Some(*l as f32),
            OscType::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

pub struct OscServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl OscServer {
    pub async fn bind(addr: SocketAddr, tx: mpsc::Sender<OscInput>) -> Result<Self, OscError> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        tracing::info!(%local_addr, "osc server listening");
        let handle = tokio::spawn(run_server(socket, tx));
        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for OscServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_server(socket: UdpSocket, tx: mpsc::Sender<OscInput>) {
    let mut buf = vec![0u8; RECV_BUF];
    loop {
        let (size, peer) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("osc recv failed: {e}");
                continue;
            }
        };
        let packet = match rosc::decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => packet,
            Err(e) => {
                tracing::debug!(%peer, "dropping malformed osc packet: {e}");
                continue;
            }
        };
        let mut messages = Vec::new();
        flatten(packet, &mut messages);
        for msg in messages {
            tracing::trace!(address = %msg.addr, args = ?msg.args, "osc in");
            if tx.send(OscInput::new(msg.addr, msg.args)).await.is_err() {
                return;
            }
        }
    }
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for p in bundle.content {
                flatten(p, out);
            }
        }
    }
}

/// Fire-and-forget OSC output towards VRChat.
#[derive(Clone)]
pub struct OscSender {
    socket: Arc<UdpSocket>,
    target: SocketAddr,
}

impl OscSender {
    pub async fn connect(target: SocketAddr) -> Result<Self, OscError> {
        let bind: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind).await?;
        Ok(Self {
            socket: Arc::new(socket),
            target,
        })
    }

    pub fn send(&self, address: &str, args: Vec<OscType>) -> Result<(), OscError> {
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_string(),
            args,
        });
        let bytes = rosc::encoder::encode(&packet).map_err(|e| OscError::Encode(e.to_string()))?;
        self.socket.try_send_to(&bytes, self.target)?;
        Ok(())
    }

    pub fn chatbox(&self, text: &str) {
        let args = vec![
            OscType::String(text.to_string()),
            OscType::Bool(true),
            OscType::Bool(false),
        ];
        if let Err(e) = self.send("/chatbox/input", args) {
            tracing::debug!("chatbox send failed: {e}");
        }
    }

    pub fn float(&self, address: &str, value: f32) {
        if let Err(e) = self.send(address, vec![OscType::Float(value)]) {
            tracing::debug!(address, "osc send failed: {e}");
        }
    }
}
