//! Monitor client (§4.4): the sole ingress/egress a keeper has to the
//! monitor, with bounded-retry RPCs and a [`pgkeeper_fsm::MonitorLink`]
//! implementation for the node-active loop.

pub mod client;
pub mod error;
pub mod retry;
pub mod transport;

pub use client::{register, MonitorClient};
pub use error::ClientError;
pub use retry::RetryPolicy;
pub use transport::{
    InMemoryMonitorTransport, MonitorTransport, NodeActiveRequest, NodeActiveResponse,
    NodeStateRow, StateChangeNotification,
};
