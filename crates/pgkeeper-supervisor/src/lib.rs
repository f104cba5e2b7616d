//! Process supervision for pg_keeper (§4.2).
//!
//! A single [`Supervisor`] owns a fixed, ordered set of [`ServiceSpec`]s —
//! typically the local Postgres controller and the node-active loop — and
//! runs them under a restart policy with exponential backoff, translating
//! `SIGHUP`/`SIGTERM`/`SIGINT`/`SIGQUIT` into reload/smart-shutdown/
//! fast-shutdown/immediate-kill semantics.

mod budget;
mod error;
mod pidfile;
mod service;
mod signals;
mod supervisor;

pub use budget::RestartBudget;
pub use error::SupervisorError;
pub use pidfile::Pidfile;
pub use service::{RestartPolicy, ServiceSpec};
pub use signals::SupervisorSignal;
pub use supervisor::{Supervisor, SupervisorExit};
