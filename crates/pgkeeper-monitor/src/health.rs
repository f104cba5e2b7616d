//! The independent TCP health probe (§4.5): a background job separate from
//! `node_active` reporting, since a node can be network-reachable on its
//! Postgres port while its keeper process is wedged (or vice versa).

use std::time::Duration;

use pgkeeper_types::{Health, NodeId};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// How often the probe sweeps every known node.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// A report is `healthy` only if probed within this long ago.
pub const HEALTH_DEADLINE: Duration = Duration::from_secs(30);

/// A node is `missing` once its last `node_active` report is older than
/// this, regardless of what the health probe saw.
pub const NODE_ACTIVE_DEADLINE: Duration = Duration::from_secs(40);

/// A node stuck in `report_lsn` longer than this is assumed never coming
/// back with a usable answer and is moved to `maintenance` instead.
pub const REPORT_LSN_DEADLINE: Duration = Duration::from_secs(60);

/// One node's current address, as known to the probe loop.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub node_id: NodeId,
    pub host: String,
    pub port: u16,
}

/// Attempts a single TCP connect against `target`, bounded by
/// `connect_timeout`. A successful connect is all the probe asserts —
/// it never speaks the Postgres protocol, matching the monitor's own
/// "reachable", not "accepting queries", semantics.
pub async fn probe_once(target: &ProbeTarget, connect_timeout: Duration) -> Health {
    let addr = format!("{}:{}", target.host, target.port);
    match timeout(connect_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(_stream)) => Health::Healthy,
        Ok(Err(error)) => {
            tracing::debug!(node_id = %target.node_id, %addr, %error, "health probe connect failed");
            Health::Unhealthy
        }
        Err(_elapsed) => {
            tracing::debug!(node_id = %target.node_id, %addr, "health probe timed out");
            Health::Unhealthy
        }
    }
}

/// The result of one sweep over `targets`, paired back with the node each
/// came from so the caller can fold it into its `GroupView`s.
pub async fn probe_all(
    targets: &[ProbeTarget],
    connect_timeout: Duration,
) -> Vec<(NodeId, Health)> {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let health = probe_once(target, connect_timeout).await;
        results.push((target.node_id, health));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_to_listening_port_is_healthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _accept = tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let target = ProbeTarget {
            node_id: NodeId::new(1),
            host: addr.ip().to_string(),
            port: addr.port(),
        };
        let health = probe_once(&target, Duration::from_millis(200)).await;
        assert_eq!(health, Health::Healthy);
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_unhealthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = ProbeTarget {
            node_id: NodeId::new(1),
            host: addr.ip().to_string(),
            port: addr.port(),
        };
        let health = probe_once(&target, Duration::from_millis(200)).await;
        assert_eq!(health, Health::Unhealthy);
    }
}
