use crate::command::{CommandType, Operation};
use crate::sink::CommandSink;
use crate::state::ChannelStateStore;
use dglab_protocol::Channel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Physics-bone and contact values, keeping only the newest sample per address
/// between flushes.
#[derive(Clone)]
pub struct InteractionCoalescer {
    pending: Arc<Mutex<HashMap<String, Sample>>>,
    sink: CommandSink,
    states: ChannelStateStore,
}

struct Sample {
    value: f32,
    channels: Vec<Channel>,
}

impl InteractionCoalescer {
    pub fn new(sink: CommandSink, states: ChannelStateStore) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            sink,
            states,
        }
    }

    /// Values outside `0.0..=1.0` are ignored.
    pub fn record(&self, address: &str, value: f32, channels: &[Channel]) {
        if !(0.0..=1.0).contains(&value) {
            tracing::trace!(address, value, "interaction value out of range");
            return;
        }
        let Ok(mut pending) = self.pending.lock() else { return };
        pending.insert(
            address.to_string(),
            Sample {
                value,
                channels: channels.to_vec(),
            },
        );
    }

    /// Emits one SET_TO per (address, channel) recorded since the last flush.
    /// Source ids are `<address>@<channel>` so each pair has its own cooldown.
    pub fn flush(&self) -> usize {
        let drained: Vec<(String, Sample)> = match self.pending.lock() {
            Ok(mut pending) => pending.drain().collect(),
            Err(_) => return 0,
        };
        let mut sent = 0;
        for (address, sample) in drained {
            for &channel in &sample.channels {
                let limit = self.states.snapshot(channel).limit;
                let strength = (sample.value * limit as f32) as i32;
                if self.sink.send(
                    CommandType::Interaction,
                    channel,
                    Operation::SetTo(strength),
                    format!("{address}@{channel}"),
                ) {
                    sent += 1;
                }
            }
        }
        sent
    }
}
