//! `pg_hba.conf` maintenance (§4.3): diff-apply the monitor's known-nodes
//! list against the local host-based-authentication rules every round-trip.

use pgkeeper_types::PeerNode;

/// Renders the replication rule this node grants a given peer.
pub fn hba_entry(peer: &PeerNode) -> String {
    format!("host replication pg_keeper {}/32 trust", peer.host)
}

/// Computes the full set of HBA entries this node should have for the
/// given peer list, and whether that differs from what's on disk.
///
/// Returns `None` when the computed set is unchanged from `current_entries`
/// (no reload needed, per §4.3's "only when a diff is non-empty" rule).
pub fn reconcile(peers: &[PeerNode], current_entries: &[String]) -> Option<Vec<String>> {
    let wanted: Vec<String> = peers.iter().map(hba_entry).collect();

    if wanted.len() == current_entries.len() && wanted.iter().all(|e| current_entries.contains(e))
    {
        return None;
    }

    Some(wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_types::{CandidatePriority, GroupId, NodeId};

    fn peer(id: u64, host: &str) -> PeerNode {
        PeerNode {
            id: NodeId::new(id),
            name: format!("n{id}"),
            host: host.to_string(),
            port: 5432,
            group_id: GroupId::new(0),
            candidate_priority: CandidatePriority::DEFAULT,
            replication_quorum: true,
        }
    }

    #[test]
    fn unchanged_peer_set_reconciles_to_none() {
        let peers = vec![peer(2, "10.0.0.2")];
        let current = vec![hba_entry(&peer(2, "10.0.0.2"))];
        assert_eq!(reconcile(&peers, &current), None);
    }

    #[test]
    fn new_peer_produces_a_diff() {
        let peers = vec![peer(2, "10.0.0.2"), peer(3, "10.0.0.3")];
        let current = vec![hba_entry(&peer(2, "10.0.0.2"))];
        let diff = reconcile(&peers, &current).expect("diff expected");
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn removed_peer_shrinks_the_set() {
        let current = vec![hba_entry(&peer(2, "10.0.0.2")), hba_entry(&peer(3, "10.0.0.3"))];
        let diff = reconcile(&[peer(2, "10.0.0.2")], &current).expect("diff expected");
        assert_eq!(diff, vec![hba_entry(&peer(2, "10.0.0.2"))]);
    }
}
