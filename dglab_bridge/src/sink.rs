use crate::command::{ChannelCommand, CommandType, Operation};
use crate::cooldown::CooldownGate;
use crate::queue::PriorityCommandQueue;
use dglab_protocol::Channel;
use std::sync::Arc;

/// Entry point for every adapter: cooldown gate in front of the per-channel queues.
#[derive(Clone)]
pub struct CommandSink {
    gate: Arc<CooldownGate>,
    queues: [Arc<PriorityCommandQueue>; 2],
}

impl CommandSink {
    pub fn new(gate: Arc<CooldownGate>, queues: [Arc<PriorityCommandQueue>; 2]) -> Self {
        Self { gate, queues }
    }

    /// Returns whether the command was queued.
    pub fn submit(&self, cmd: ChannelCommand) -> bool {
        if !self.gate.admit(&cmd) {
            return false;
        }
        tracing::trace!(
            channel = %cmd.channel,
            tier = %cmd.command_type,
            source = %cmd.source_id,
            op = ?cmd.operation,
            "command queued"
        );
        self.queues[cmd.channel.index()].push(cmd);
        true
    }

    /// Queues without consulting the cooldown gate. For restores that must
    /// land even when their source fired moments ago.
    pub fn submit_unthrottled(&self, cmd: ChannelCommand) {
        tracing::trace!(
            channel = %cmd.channel,
            tier = %cmd.command_type,
            source = %cmd.source_id,
            op = ?cmd.operation,
            "command queued past cooldown"
        );
        self.queues[cmd.channel.index()].push(cmd);
    }

    pub fn send(
        &self,
        command_type: CommandType,
        channel: Channel,
        operation: Operation,
        source_id: impl Into<String>,
    ) -> bool {
        self.submit(ChannelCommand::new(command_type, channel, operation, source_id))
    }
}
