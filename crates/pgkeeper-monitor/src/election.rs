//! Failover election (§4.5 rule 5): deterministic winner selection among
//! the candidates eligible to replace a missing primary.

use pgkeeper_types::{NodeId, ReplicationProgress};

use crate::report::NodeReport;

/// The node chosen to become the new primary, and the candidates that
/// lost — every other live node is told to `fast_forward` onto the
/// winner's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionResult {
    pub winner: NodeId,
}

/// Picks the election winner among `candidates` (already filtered to
/// healthy, `replication_quorum = true` nodes by the caller).
///
/// Ordering key is `(candidate_priority, timeline, lsn)` descending, with
/// ties broken by node id ascending (§4.5: "ties broken by node id
/// ascending").
pub fn elect(candidates: &[&NodeReport]) -> Option<ElectionResult> {
    candidates
        .iter()
        .max_by(|a, b| {
            let a_key = (
                a.candidate_priority,
                ReplicationProgress::new(a.reported_tli, a.reported_lsn),
                std::cmp::Reverse(a.node_id),
            );
            let b_key = (
                b.candidate_priority,
                ReplicationProgress::new(b.reported_tli, b.reported_lsn),
                std::cmp::Reverse(b.node_id),
            );
            a_key.cmp(&b_key)
        })
        .map(|winner| ElectionResult {
            winner: winner.node_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_types::{CandidatePriority, Health, Lsn, TimelineId, Timestamp};

    fn candidate(id: u64, priority: u8, timeline: u32, lsn: u64) -> NodeReport {
        NodeReport {
            node_id: NodeId::new(id),
            reported_state: pgkeeper_types::NodeState::Secondary,
            reported_lsn: Lsn::new(lsn),
            reported_tli: TimelineId::new(timeline),
            reported_at: Timestamp::now(),
            health: Health::Healthy,
            health_at: Timestamp::now(),
            candidate_priority: CandidatePriority::new(priority),
            replication_quorum: true,
            maintenance_requested: false,
            removal_requested: false,
        }
    }

    #[test]
    fn highest_priority_wins() {
        let a = candidate(1, 50, 1, 100);
        let b = candidate(2, 90, 1, 50);
        let result = elect(&[&a, &b]).unwrap();
        assert_eq!(result.winner, NodeId::new(2));
    }

    #[test]
    fn equal_priority_breaks_on_timeline_then_lsn() {
        let a = candidate(1, 50, 1, 100);
        let b = candidate(2, 50, 2, 10);
        let result = elect(&[&a, &b]).unwrap();
        assert_eq!(result.winner, NodeId::new(2), "higher timeline wins regardless of lsn");
    }

    #[test]
    fn full_tie_breaks_on_ascending_node_id() {
        let a = candidate(5, 50, 1, 100);
        let b = candidate(2, 50, 1, 100);
        let result = elect(&[&a, &b]).unwrap();
        assert_eq!(result.winner, NodeId::new(2));
    }

    #[test]
    fn no_candidates_elects_nobody() {
        assert!(elect(&[]).is_none());
    }
}
