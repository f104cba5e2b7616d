//! # pgkeeper-types
//!
//! Shared type definitions for the pg_keeper failover control plane:
//! node identity ([`NodeId`], [`GroupId`], [`FormationName`]), the local
//! node FSM alphabet ([`NodeState`]), replication progress newtypes
//! ([`Lsn`], [`TimelineId`]), and the peer/health bookkeeping the monitor
//! and keeper pass back and forth on every `node_active` round trip.
//!
//! This crate has no I/O and no async runtime dependency: every type here
//! is plain data, shared by `pgkeeper-store`, `pgkeeper-fsm`,
//! `pgkeeper-client`, and `pgkeeper-monitor` alike.

mod formation;
mod ids;
mod lsn;
mod node;
mod state;

pub use formation::FormationSettings;
pub use ids::{FormationName, GroupId, NodeId};
pub use lsn::{Lsn, ReplicationProgress, TimelineId};
pub use node::{CandidatePriority, Health, NodeIdentity, PeerNode, Timestamp};
pub use state::{NodeKind, NodeState, ParseNodeStateError};
