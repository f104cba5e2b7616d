//! The monitor client (§4.4): the sole ingress/egress a keeper has to the
//! monitor, wrapping a [`MonitorTransport`] with retry/backoff and
//! implementing [`pgkeeper_fsm::MonitorLink`] for the node-active loop.

use std::sync::Mutex;

use pgkeeper_types::{GroupId, Health, Lsn, NodeId, NodeKind, NodeState, Timestamp};

use pgkeeper_fsm::node_active::{MonitorLink, NodeActiveReport};
use pgkeeper_fsm::FsmError;

use crate::error::ClientError;
use crate::retry::{with_retry, RetryPolicy};
use crate::transport::{MonitorTransport, NodeActiveRequest, NodeStateRow, StateChangeNotification};

/// Registers a brand-new node with the monitor, before any [`MonitorClient`]
/// can exist for it — a client is bound to the [`NodeId`] registration
/// returns.
pub async fn register<T: MonitorTransport>(
    transport: &T,
    retry_policy: RetryPolicy,
    name: &str,
    host: &str,
    port: u16,
    kind: NodeKind,
    desired_group: Option<u32>,
    desired_state: NodeState,
) -> Result<(NodeId, GroupId, NodeState), ClientError> {
    with_retry(retry_policy, || {
        transport.register(name, host, port, kind, desired_group, desired_state)
    })
    .await
}

pub struct MonitorClient<T: MonitorTransport> {
    transport: T,
    node_id: NodeId,
    retry_policy: RetryPolicy,
    last_monitor_contact: Mutex<Option<Timestamp>>,
}

impl<T: MonitorTransport> MonitorClient<T> {
    /// `node_id` is the id this node was assigned at registration; callers
    /// reconnecting after a restart read it back from the persisted node
    /// record rather than registering again.
    pub fn new(transport: T, node_id: NodeId) -> Self {
        Self {
            transport,
            node_id,
            retry_policy: RetryPolicy::default(),
            last_monitor_contact: Mutex::new(None),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// The last time a `node_active` call to the monitor succeeded. Used by
    /// the caller to decide when `network_partition_timeout` has expired
    /// (§4.4, §4.5).
    pub fn last_monitor_contact(&self) -> Option<Timestamp> {
        *self.last_monitor_contact.lock().expect("contact lock")
    }

    fn note_contact(&self) {
        *self.last_monitor_contact.lock().expect("contact lock") = Some(Timestamp::now());
    }

    pub async fn get_current_state(
        &self,
        formation: &str,
        group_id: GroupId,
    ) -> Result<Vec<NodeStateRow>, ClientError> {
        with_retry(self.retry_policy, || {
            self.transport.get_current_state(formation, group_id)
        })
        .await
    }

    pub async fn perform_failover(
        &self,
        formation: &str,
        group_id: GroupId,
    ) -> Result<(), ClientError> {
        with_retry(self.retry_policy, || {
            self.transport.perform_failover(formation, group_id)
        })
        .await
    }

    pub async fn perform_promotion(
        &self,
        formation: &str,
        target_name: &str,
    ) -> Result<bool, ClientError> {
        with_retry(self.retry_policy, || {
            self.transport.perform_promotion(formation, target_name)
        })
        .await
    }

    pub async fn remove_node(&self, node_id: NodeId) -> Result<(), ClientError> {
        with_retry(self.retry_policy, || self.transport.remove_node(node_id)).await
    }

    /// Subscribes to state-change notifications (§4.4): unblocks long
    /// `perform_*` waits and refreshes `watch` dashboards.
    pub fn listen(&self, channels: &[&str]) -> tokio::sync::broadcast::Receiver<StateChangeNotification> {
        self.transport.listen(channels)
    }
}

#[async_trait::async_trait]
impl<T: MonitorTransport> MonitorLink for MonitorClient<T> {
    async fn node_active(
        &self,
        current_state: NodeState,
        lsn: Lsn,
        timeline: pgkeeper_types::TimelineId,
        is_in_recovery: bool,
        health: Health,
    ) -> Result<NodeActiveReport, FsmError> {
        let response = with_retry(self.retry_policy, || {
            self.transport.node_active(NodeActiveRequest {
                node_id: self.node_id,
                reported_state: current_state,
                reported_lsn: lsn,
                reported_tli: timeline,
                is_in_recovery,
                health,
            })
        })
        .await
        .map_err(|e| FsmError::MonitorLink(e.to_string()))?;

        let peers = self
            .transport
            .get_other_nodes(self.node_id)
            .await
            .map_err(|e| FsmError::MonitorLink(e.to_string()))?;

        self.note_contact();

        Ok(NodeActiveReport {
            assigned_state: response.assigned_state,
            peers,
            target_timeline: response.target_timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryMonitorTransport;
    use pgkeeper_types::Health;

    #[tokio::test]
    async fn register_then_node_active_round_trips() {
        let transport = InMemoryMonitorTransport::new();
        let (node_id, _group_id, assigned) = register(
            &transport,
            RetryPolicy::default(),
            "node-a",
            "10.0.0.1",
            5432,
            NodeKind::Standalone,
            None,
            NodeState::Init,
        )
        .await
        .expect("registration succeeds");
        assert_eq!(assigned, NodeState::Init);

        let client = MonitorClient::new(transport, node_id);
        assert!(client.last_monitor_contact().is_none());

        let report = client
            .node_active(
                NodeState::Init,
                Lsn::ZERO,
                pgkeeper_types::TimelineId::INITIAL,
                false,
                Health::Healthy,
            )
            .await
            .expect("node_active succeeds");
        assert_eq!(report.assigned_state, NodeState::Init);
        assert!(client.last_monitor_contact().is_some());
    }

    #[tokio::test]
    async fn perform_promotion_notifies_listeners() {
        let transport = InMemoryMonitorTransport::new();
        register(
            &transport,
            RetryPolicy::default(),
            "node-a",
            "10.0.0.1",
            5432,
            NodeKind::Standalone,
            None,
            NodeState::Secondary,
        )
        .await
        .unwrap();

        let client = MonitorClient::new(transport, NodeId::new(1));
        let mut events = client.listen(&["state"]);

        let promoted = client
            .perform_promotion("default", "node-a")
            .await
            .expect("promotion request succeeds");
        assert!(promoted);

        let notification = events.recv().await.expect("notification delivered");
        assert_eq!(notification.state, NodeState::PreparePromotion);
    }
}
