//! Formation-wide settings consumed by the assignment engine (§4.5).

use crate::state::NodeKind;

/// Settings shared by every group within a formation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormationSettings {
    pub kind: NodeKind,
    /// Minimum number of synchronous, quorum-participating secondaries a
    /// primary must have before it is allowed to leave `wait_primary` (I5).
    pub number_sync_standbys: u32,
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            kind: NodeKind::Standalone,
            number_sync_standbys: 1,
        }
    }
}
