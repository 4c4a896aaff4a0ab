use crate::command::{ChannelCommand, CommandType};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownTable {
    windows: [Duration; 5],
}

impl CooldownTable {
    pub fn new(
        gui: Duration,
        panel: Duration,
        interaction: Duration,
        ton: Duration,
        periodic: Duration,
    ) -> Self {
        Self {
            windows: [gui, panel, interaction, ton, periodic],
        }
    }

    pub fn window(&self, command_type: CommandType) -> Duration {
        self.windows[command_type.index()]
    }

    pub fn with(mut self, command_type: CommandType, window: Duration) -> Self {
        self.windows[command_type.index()] = window;
        self
    }
}

impl Default for CooldownTable {
    fn default() -> Self {
        Self::new(
            Duration::ZERO,
            Duration::from_millis(100),
            Duration::from_millis(50),
            Duration::from_millis(200),
            Duration::ZERO,
        )
    }
}

/// Per (tier, source) rate gate. Rejections are silent.
pub struct CooldownGate {
    table: CooldownTable,
    last_accepted: Mutex<HashMap<(CommandType, String), Instant>>,
}

impl CooldownGate {
    pub fn new(table: CooldownTable) -> Self {
        Self {
            table,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn admit(&self, cmd: &ChannelCommand) -> bool {
        let window = self.table.window(cmd.command_type);
        let mut last = self.last_accepted.lock().unwrap_or_else(|poisoned| {
            tracing::error!("cooldown lock poisoned, recovering");
            poisoned.into_inner()
        });
        let key = (cmd.command_type, cmd.source_id.clone());
        if !window.is_zero() {
            if let Some(prev) = last.get(&key) {
                if cmd.timestamp.saturating_duration_since(*prev) < window {
                    tracing::debug!(
                        tier = %cmd.command_type,
                        source = %cmd.source_id,
                        "command rejected by cooldown"
                    );
                    return false;
                }
            }
        }
        last.insert(key, cmd.timestamp);
        true
    }
}

