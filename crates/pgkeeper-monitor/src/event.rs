//! The append-only event log (§4.5, I4): every assignment change is
//! recorded once, never mutated, and published on the same `state`
//! channel a listening keeper subscribes to.

use pgkeeper_types::{FormationName, GroupId, NodeId, NodeState, Timestamp};

/// One row of the event log. Once written, immutable (I4) — there is no
/// update path anywhere in this module, only `append`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub time: Timestamp,
    pub formation: FormationName,
    pub group_id: GroupId,
    pub node_id: NodeId,
    pub reported_state: NodeState,
    pub goal_state: NodeState,
    pub description: String,
}

/// Sink for newly decided assignments. A real implementation persists each
/// row in the same transaction that writes the assignment and issues the
/// `NOTIFY` (§4.5); the in-memory log below is the test double.
pub trait EventLog: Send + Sync {
    fn append(&mut self, event: Event);
    fn since(&self, after_id: u64) -> Vec<Event>;
}

/// In-order, in-memory event log used by tests and by `pgkeeper-monitor`'s
/// own test harness; never the production backing store.
#[derive(Debug)]
pub struct InMemoryEventLog {
    next_id: u64,
    events: Vec<Event>,
}

impl InMemoryEventLog {
    /// Ids start at 1 so `since(0)` means "everything", matching the usual
    /// watermark convention (a cursor of 0 means "nothing seen yet").
    pub fn new() -> Self {
        Self {
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Records a goal-state change, stamping the next sequential id.
    /// Returns the id assigned, so the caller can pair it with the NOTIFY
    /// it publishes in the same logical transaction.
    pub fn record(
        &mut self,
        time: Timestamp,
        formation: FormationName,
        group_id: GroupId,
        node_id: NodeId,
        reported_state: NodeState,
        goal_state: NodeState,
        description: impl Into<String>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.append(Event {
            id,
            time,
            formation,
            group_id,
            node_id,
            reported_state,
            goal_state,
            description: description.into(),
        });
        id
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    fn since(&self, after_id: u64) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.id > after_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut log = InMemoryEventLog::new();
        let a = log.record(
            Timestamp::now(),
            FormationName::default(),
            GroupId::new(0),
            NodeId::new(1),
            NodeState::Init,
            NodeState::Single,
            "bootstrap",
        );
        let b = log.record(
            Timestamp::now(),
            FormationName::default(),
            GroupId::new(0),
            NodeId::new(2),
            NodeState::Init,
            NodeState::WaitStandby,
            "add standby",
        );
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn since_zero_returns_everything() {
        let mut log = InMemoryEventLog::new();
        for n in 0u64..3 {
            log.record(
                Timestamp::now(),
                FormationName::default(),
                GroupId::new(0),
                NodeId::new(n),
                NodeState::Init,
                NodeState::Single,
                "test",
            );
        }
        let rest = log.since(0);
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[0].id, 1);

        let tail = log.since(1);
        assert_eq!(tail.len(), 2);
    }
}
