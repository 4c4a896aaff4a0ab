use crate::command::{CommandType, Operation};
use crate::config::TonSettings;
use crate::sink::CommandSink;
use crate::state::{ChannelStateStore, TierFilter};
use dglab_protocol::{Channel, TonMessage};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TonStatus {
    pub connected: bool,
    pub display_name: Option<String>,
    pub damage: i32,
    pub penalty_active: bool,
}

#[derive(Default)]
struct Inner {
    damage: i32,
    penalty: Option<JoinHandle<()>>,
}

/// Game-damage integration: turns ToN events into TON-tier commands on one channel.
#[derive(Clone)]
pub struct TonAdapter {
    settings: TonSettings,
    sink: CommandSink,
    states: ChannelStateStore,
    filter: TierFilter,
    inner: Arc<Mutex<Inner>>,
    status: Arc<watch::Sender<TonStatus>>,
}

impl TonAdapter {
    pub fn new(
        settings: TonSettings,
        sink: CommandSink,
        states: ChannelStateStore,
        filter: TierFilter,
    ) -> Self {
        let (status, _) = watch::channel(TonStatus::default());
        Self {
            settings,
            sink,
            states,
            filter,
            inner: Arc::new(Mutex::new(Inner::default())),
            status: Arc::new(status),
        }
    }

    pub fn channel(&self) -> Channel {
        self.settings.channel
    }

    pub fn subscribe(&self) -> watch::Receiver<TonStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> TonStatus {
        self.status.borrow().clone()
    }

    pub fn set_connected(&self, connected: bool) {
        self.status.send_if_modified(|s| {
            let changed = s.connected != connected;
            s.connected = connected;
            changed
        });
    }

    pub fn handle(&self, msg: TonMessage) {
        match msg {
            TonMessage::Damaged { value } => self.on_damage(value),
            TonMessage::Alive { value: false } => self.start_penalty(),
            TonMessage::Alive { value: true } => {}
            TonMessage::Saved => self.reset(),
            TonMessage::Stats { display_name } | TonMessage::Connected { display_name } => {
                if let Some(name) = display_name.filter(|n| !n.is_empty()) {
                    tracing::info!(display_name = %name, "ton player");
                    self.status.send_modify(|s| s.display_name = Some(name));
                }
            }
            TonMessage::Unknown => {}
        }
    }

    fn on_damage(&self, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            return;
        }
        let amount = (value * self.settings.damage_scale).ceil() as i32;
        if amount <= 0 {
            return;
        }
        if !self.tier_enabled() {
            tracing::debug!(amount, "ton tier disabled, damage ignored");
            return;
        }
        let Ok(mut inner) = self.inner.lock() else { return };
        if inner.penalty.is_some() {
            tracing::debug!(amount, "death penalty active, damage ignored");
            return;
        }
        let next = (inner.damage + amount).min(self.settings.damage_cap);
        let delta = next - inner.damage;
        if delta <= 0 {
            return;
        }
        if self.submit(Operation::Increase(delta), "ton:damage") {
            inner.damage = next;
            tracing::info!(delta, damage = next, "ton damage accumulated");
            self.publish(&inner);
        }
    }

    /// Called once a second by the decay task.
    pub fn decay(&self) {
        let Ok(mut inner) = self.inner.lock() else { return };
        if inner.damage <= 0 || inner.penalty.is_some() {
            return;
        }
        if !self.tier_enabled() {
            // Decreases would be dropped at dispatch anyway.
            tracing::debug!(damage = inner.damage, "ton tier disabled, damage cleared");
            inner.damage = 0;
            self.publish(&inner);
            return;
        }
        let amount = self.settings.decay_per_second.min(inner.damage);
        if amount <= 0 {
            return;
        }
        if self.submit(Operation::Decrease(amount), "ton:decay") {
            inner.damage -= amount;
            self.publish(&inner);
        }
    }

    fn start_penalty(&self) {
        if !self.tier_enabled() {
            tracing::debug!("ton tier disabled, death penalty skipped");
            return;
        }
        let Ok(mut inner) = self.inner.lock() else { return };
        if inner.penalty.is_some() {
            return;
        }
        let channel = self.settings.channel;
        let origin = self.states.snapshot(channel).current_strength;
        let strength = self.settings.death_penalty_strength;
        let duration = self.settings.death_penalty();
        tracing::warn!(strength, secs = duration.as_secs(), "death penalty triggered");
        self.submit(Operation::SetTo(strength), "ton:death");

        let adapter = self.clone();
        inner.penalty = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            adapter.submit(Operation::SetTo(origin), "ton:restore");
            if let Ok(mut inner) = adapter.inner.lock() {
                inner.penalty = None;
                adapter.publish(&inner);
            }
            tracing::info!(strength = origin, "death penalty finished");
        }));
        self.publish(&inner);
    }

    fn reset(&self) {
        let Ok(mut inner) = self.inner.lock() else { return };
        if let Some(penalty) = inner.penalty.take() {
            penalty.abort();
        }
        inner.damage = 0;
        self.submit(Operation::SetTo(0), "ton:saved");
        tracing::info!("ton save point, damage reset");
        self.publish(&inner);
    }

    fn tier_enabled(&self) -> bool {
        self.filter.is_enabled(CommandType::Ton)
    }

    fn submit(&self, operation: Operation, source: &str) -> bool {
        self.sink
            .send(CommandType::Ton, self.settings.channel, operation, source)
    }

    fn publish(&self, inner: &Inner) {
        let damage = inner.damage;
        let penalty_active = inner.penalty.is_some();
        self.status.send_modify(|s| {
            s.damage = damage;
            s.penalty_active = penalty_active;
        });
    }
}
