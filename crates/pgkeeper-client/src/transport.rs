//! The RPC surface a monitor connection exposes (§4.4), abstracted behind a
//! trait so [`crate::client::MonitorClient`]'s retry/backoff and idempotency
//! handling can be exercised without a live monitor. A real implementation
//! (issuing the equivalent SQL calls against the monitor's own database) is
//! out of scope, same as [`pgkeeper_fsm::PgController`] for the local one.

use std::collections::BTreeMap;
use std::sync::Mutex;

use pgkeeper_types::{
    CandidatePriority, Health, Lsn, NodeId, NodeKind, NodeState, PeerNode, TimelineId,
};

use crate::error::ClientError;

/// What a node reports on every `node_active` round-trip.
#[derive(Debug, Clone)]
pub struct NodeActiveRequest {
    pub node_id: NodeId,
    pub reported_state: NodeState,
    pub reported_lsn: Lsn,
    pub reported_tli: TimelineId,
    pub is_in_recovery: bool,
    pub health: Health,
}

/// The monitor's answer: the node's new goal state, plus the timeline it
/// should rewind onto if that goal is `fast_forward` (decided by the
/// assignment engine's election, §4.5).
#[derive(Debug, Clone)]
pub struct NodeActiveResponse {
    pub assigned_state: NodeState,
    pub target_timeline: TimelineId,
}

/// One row of `get_current_state` (§4.4), as shown by `show state`/`watch`.
#[derive(Debug, Clone)]
pub struct NodeStateRow {
    pub node_id: NodeId,
    pub name: String,
    pub reported_state: NodeState,
    pub goal_state: NodeState,
}

/// A state-change notification delivered by `listen` (§4.4).
#[derive(Debug, Clone)]
pub struct StateChangeNotification {
    pub node_id: NodeId,
    pub state: NodeState,
}

#[async_trait::async_trait]
pub trait MonitorTransport: Send + Sync {
    async fn register(
        &self,
        name: &str,
        host: &str,
        port: u16,
        kind: NodeKind,
        desired_group: Option<u32>,
        desired_state: NodeState,
    ) -> Result<(NodeId, pgkeeper_types::GroupId, NodeState), ClientError>;

    async fn node_active(
        &self,
        request: NodeActiveRequest,
    ) -> Result<NodeActiveResponse, ClientError>;

    async fn get_other_nodes(&self, node_id: NodeId) -> Result<Vec<PeerNode>, ClientError>;

    async fn get_current_state(
        &self,
        formation: &str,
        group_id: pgkeeper_types::GroupId,
    ) -> Result<Vec<NodeStateRow>, ClientError>;

    async fn perform_failover(
        &self,
        formation: &str,
        group_id: pgkeeper_types::GroupId,
    ) -> Result<(), ClientError>;

    /// Returns whether a promotion was actually triggered (the target may
    /// already be the primary, in which case this is a no-op).
    async fn perform_promotion(
        &self,
        formation: &str,
        target_name: &str,
    ) -> Result<bool, ClientError>;

    async fn remove_node(&self, node_id: NodeId) -> Result<(), ClientError>;

    /// Subscribes to state-change notifications on the given channels
    /// (§4.4). Delivery is push-based: the returned receiver yields a
    /// notification every time the monitor changes a node's state.
    fn listen(&self, channels: &[&str]) -> tokio::sync::broadcast::Receiver<StateChangeNotification>;
}

/// An in-memory fake monitor, standing in for a real connection in tests.
pub struct InMemoryMonitorTransport {
    state: Mutex<InMemoryState>,
    notifications: tokio::sync::broadcast::Sender<StateChangeNotification>,
}

struct InMemoryState {
    next_id: u64,
    nodes: BTreeMap<NodeId, InMemoryNode>,
    assigned_states: BTreeMap<NodeId, NodeState>,
    target_timeline: TimelineId,
}

struct InMemoryNode {
    name: String,
    host: String,
    port: u16,
    group_id: pgkeeper_types::GroupId,
    candidate_priority: CandidatePriority,
    replication_quorum: bool,
    reported_state: NodeState,
}

impl InMemoryMonitorTransport {
    pub fn new() -> Self {
        let (notifications, _) = tokio::sync::broadcast::channel(64);
        Self {
            state: Mutex::new(InMemoryState {
                next_id: 1,
                nodes: BTreeMap::new(),
                assigned_states: BTreeMap::new(),
                target_timeline: TimelineId::INITIAL,
            }),
            notifications,
        }
    }

    /// Test hook: forces the next `node_active` response for `node_id`.
    pub fn set_assigned_state(&self, node_id: NodeId, state: NodeState) {
        self.state
            .lock()
            .expect("monitor state lock")
            .assigned_states
            .insert(node_id, state);
    }
}

impl Default for InMemoryMonitorTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MonitorTransport for InMemoryMonitorTransport {
    async fn register(
        &self,
        name: &str,
        host: &str,
        port: u16,
        _kind: NodeKind,
        desired_group: Option<u32>,
        desired_state: NodeState,
    ) -> Result<(NodeId, pgkeeper_types::GroupId, NodeState), ClientError> {
        let mut state = self.state.lock().expect("monitor state lock");
        if state.nodes.values().any(|n| n.host == host && n.port == port) {
            return Err(ClientError::AlreadyRegistered);
        }

        let node_id = NodeId::new(state.next_id);
        state.next_id += 1;
        let group_id = pgkeeper_types::GroupId::new(desired_group.unwrap_or(0));

        state.nodes.insert(
            node_id,
            InMemoryNode {
                name: name.to_string(),
                host: host.to_string(),
                port,
                group_id,
                candidate_priority: CandidatePriority::DEFAULT,
                replication_quorum: true,
                reported_state: desired_state,
            },
        );
        state.assigned_states.insert(node_id, desired_state);

        Ok((node_id, group_id, desired_state))
    }

    async fn node_active(
        &self,
        request: NodeActiveRequest,
    ) -> Result<NodeActiveResponse, ClientError> {
        let mut state = self.state.lock().expect("monitor state lock");
        let target_timeline = state.target_timeline;
        let node = state
            .nodes
            .get_mut(&request.node_id)
            .ok_or(ClientError::NotFound)?;
        node.reported_state = request.reported_state;

        let assigned_state = state
            .assigned_states
            .get(&request.node_id)
            .copied()
            .unwrap_or(request.reported_state);

        Ok(NodeActiveResponse {
            assigned_state,
            target_timeline,
        })
    }

    async fn get_other_nodes(&self, node_id: NodeId) -> Result<Vec<PeerNode>, ClientError> {
        let state = self.state.lock().expect("monitor state lock");
        Ok(state
            .nodes
            .iter()
            .filter(|(id, _)| **id != node_id)
            .map(|(id, n)| PeerNode {
                id: *id,
                name: n.name.clone(),
                host: n.host.clone(),
                port: n.port,
                group_id: n.group_id,
                candidate_priority: n.candidate_priority,
                replication_quorum: n.replication_quorum,
            })
            .collect())
    }

    async fn get_current_state(
        &self,
        _formation: &str,
        group_id: pgkeeper_types::GroupId,
    ) -> Result<Vec<NodeStateRow>, ClientError> {
        let state = self.state.lock().expect("monitor state lock");
        Ok(state
            .nodes
            .iter()
            .filter(|(_, n)| n.group_id == group_id)
            .map(|(id, n)| NodeStateRow {
                node_id: *id,
                name: n.name.clone(),
                reported_state: n.reported_state,
                goal_state: state.assigned_states.get(id).copied().unwrap_or(n.reported_state),
            })
            .collect())
    }

    async fn perform_failover(
        &self,
        _formation: &str,
        group_id: pgkeeper_types::GroupId,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().expect("monitor state lock");
        let ids: Vec<NodeId> = state
            .nodes
            .iter()
            .filter(|(_, n)| n.group_id == group_id)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            state.assigned_states.insert(id, NodeState::ReportLsn);
            let _ = self.notifications.send(StateChangeNotification {
                node_id: id,
                state: NodeState::ReportLsn,
            });
        }
        Ok(())
    }

    async fn perform_promotion(
        &self,
        _formation: &str,
        target_name: &str,
    ) -> Result<bool, ClientError> {
        let mut state = self.state.lock().expect("monitor state lock");
        let target_id = state
            .nodes
            .iter()
            .find(|(_, n)| n.name == target_name)
            .map(|(id, _)| *id)
            .ok_or(ClientError::NotFound)?;

        if state.assigned_states.get(&target_id).copied() == Some(NodeState::Primary) {
            return Ok(false);
        }
        state.assigned_states.insert(target_id, NodeState::PreparePromotion);
        let _ = self.notifications.send(StateChangeNotification {
            node_id: target_id,
            state: NodeState::PreparePromotion,
        });
        Ok(true)
    }

    fn listen(&self, _channels: &[&str]) -> tokio::sync::broadcast::Receiver<StateChangeNotification> {
        self.notifications.subscribe()
    }

    async fn remove_node(&self, node_id: NodeId) -> Result<(), ClientError> {
        let mut state = self.state.lock().expect("monitor state lock");
        state.nodes.remove(&node_id).ok_or(ClientError::NotFound)?;
        state.assigned_states.remove(&node_id);
        Ok(())
    }
}
