//! The monitor side of LISTEN/NOTIFY (§1, §4.4's `listen(channels[])`):
//! every assignment change is published on the `state` channel in the same
//! logical transaction as the event-log row that records it.

use pgkeeper_types::{NodeId, NodeState};
use tokio::sync::broadcast;

/// One `state`-channel delivery. Mirrors the tuple shape §4.4 names:
/// `(nodeId, state, …)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeEvent {
    pub node_id: NodeId,
    pub state: NodeState,
}

/// Fan-out point for the `state` channel. A subscriber that disconnects
/// and misses deliveries must resync via `get_current_state` (§5); this
/// bus makes no redelivery promise beyond the channel's own buffer.
pub struct NotifyBus {
    sender: broadcast::Sender<StateChangeEvent>,
}

impl NotifyBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishes to every current subscriber. A `SendError` just means
    /// nobody is listening right now, which is not an error for the
    /// publisher (§5: delivery is commit-order, not guaranteed-received).
    pub fn publish(&self, event: StateChangeEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for NotifyBus {
    fn default() -> Self {
        Self::new(256)
    }
}
