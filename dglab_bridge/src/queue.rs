use crate::command::ChannelCommand;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

struct Queued {
    seq: u64,
    cmd: ChannelCommand,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // BinaryHeap is a max-heap; reverse so the best command sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmd
            .priority_cmp(&other.cmd)
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

/// Priority queue ordered by (tier, timestamp, arrival).
pub struct PriorityCommandQueue {
    heap: Mutex<BinaryHeap<Queued>>,
    seq: AtomicU64,
    notify: Notify,
}

impl Default for PriorityCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityCommandQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            notify: Notify::new(),
        }
    }

    fn heap(&self) -> MutexGuard<'_, BinaryHeap<Queued>> {
        self.heap.lock().unwrap_or_else(|poisoned| {
            tracing::error!("command queue lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn push(&self, cmd: ChannelCommand) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.heap().push(Queued { seq, cmd });
        self.notify.notify_one();
    }

    pub fn try_pop(&self) -> Option<ChannelCommand> {
        self.heap().pop().map(|q| q.cmd)
    }

    /// Waits until a command is available.
    pub async fn pop(&self) -> ChannelCommand {
        loop {
            let notified = self.notify.notified();
            if let Some(cmd) = self.try_pop() {
                return cmd;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.heap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
