//! Replication slot reconciliation (§4.3): diff the monitor's known-nodes
//! list against the slots that actually exist, every round-trip.

use pgkeeper_types::PeerNode;

use crate::effects::Effect;

/// Computes the create/drop/advance effects needed to bring `existing_slots`
/// in line with `peers`. Pure: takes a snapshot of both sides, returns what
/// to do, does no I/O itself.
pub fn reconcile(peers: &[PeerNode], existing_slots: &[String]) -> Vec<Effect> {
    let mut effects = Vec::new();

    let wanted_names: std::collections::HashSet<String> =
        peers.iter().map(PeerNode::slot_name).collect();

    for slot_name in existing_slots {
        if !wanted_names.contains(slot_name) {
            effects.push(Effect::DropReplicationSlot {
                slot_name: slot_name.clone(),
            });
        }
    }

    for peer in peers {
        let slot_name = peer.slot_name();
        if !existing_slots.iter().any(|s| s == &slot_name) {
            effects.push(Effect::CreateReplicationSlot { peer: peer.clone() });
        }
    }

    effects
}

/// Builds advance effects from slots paired with their WAL sender's
/// observed flush position. The peer's own flush LSN comes from the
/// replication protocol itself (`PgController::replica_flush_lsn`), not
/// from the monitor's known-nodes list, which carries no LSN field.
pub fn advance(slot_flush_lsns: &[(String, pgkeeper_types::Lsn)]) -> Vec<Effect> {
    slot_flush_lsns
        .iter()
        .map(|(slot_name, restart_lsn)| Effect::AdvanceReplicationSlot {
            slot_name: slot_name.clone(),
            restart_lsn: *restart_lsn,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_types::{CandidatePriority, GroupId, NodeId};

    fn peer(id: u64) -> PeerNode {
        PeerNode {
            id: NodeId::new(id),
            name: format!("n{id}"),
            host: "localhost".to_string(),
            port: 5432,
            group_id: GroupId::new(0),
            candidate_priority: CandidatePriority::DEFAULT,
            replication_quorum: true,
        }
    }

    #[test]
    fn creates_slots_for_new_peers() {
        let peers = vec![peer(2)];
        let effects = reconcile(&peers, &[]);
        assert_eq!(effects, vec![Effect::CreateReplicationSlot { peer: peer(2) }]);
    }

    #[test]
    fn drops_slots_for_removed_peers() {
        let effects = reconcile(&[], &["pg_keeper_2".to_string()]);
        assert_eq!(
            effects,
            vec![Effect::DropReplicationSlot {
                slot_name: "pg_keeper_2".to_string()
            }]
        );
    }

    #[test]
    fn no_diff_is_a_no_op() {
        let peers = vec![peer(2)];
        let effects = reconcile(&peers, &["pg_keeper_2".to_string()]);
        assert!(effects.is_empty());
    }

    #[test]
    fn advance_emits_one_effect_per_observed_slot() {
        let effects = advance(&[("pg_keeper_2".to_string(), pgkeeper_types::Lsn::new(100))]);
        assert_eq!(
            effects,
            vec![Effect::AdvanceReplicationSlot {
                slot_name: "pg_keeper_2".to_string(),
                restart_lsn: pgkeeper_types::Lsn::new(100),
            }]
        );
    }
}
