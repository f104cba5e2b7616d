//! The supervisor process tree (§4.2).

use std::time::{Duration, Instant};

use tokio::process::Child;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::budget::RestartBudget;
use crate::error::SupervisorError;
use crate::pidfile::Pidfile;
use crate::service::{RestartPolicy, ServiceSpec};
use crate::signals::{self, SupervisorSignal};

const RECONCILE_TICK: Duration = Duration::from_secs(1);
const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// How the supervisor's `start` loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// All services stopped and none are due to restart (doesn't happen in
    /// practice for permanent services, but a tree of only temporary/
    /// transient services can end this way).
    Normal,
    /// Shut down by `SIGTERM`/`SIGINT`/`SIGQUIT`.
    UserRequestedQuit,
    /// A child exceeded its restart budget; the whole tree was torn down.
    RestartBudgetExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownPhase {
    Term { deadline: Instant },
    Quit { deadline: Instant },
}

struct ManagedService {
    spec: ServiceSpec,
    child: Option<Child>,
    budget: RestartBudget,
    next_restart_at: Option<Instant>,
}

impl ManagedService {
    fn new(spec: ServiceSpec) -> Self {
        Self {
            spec,
            child: None,
            budget: RestartBudget::default(),
            next_restart_at: None,
        }
    }

    fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn spawn(&mut self) -> Result<(), SupervisorError> {
        let child = (self.spec.command)()
            .spawn()
            .map_err(|source| SupervisorError::SpawnFailed {
                name: self.spec.name.clone(),
                source,
            })?;
        self.child = Some(child);
        self.next_restart_at = None;
        Ok(())
    }
}

#[allow(unsafe_code)]
fn send_signal(pid: u32, signal: i32) {
    // SAFETY: `kill` with a valid pid and signal number is the standard way
    // to signal a process we spawned ourselves.
    unsafe {
        libc::kill(pid as libc::pid_t, signal);
    }
}

/// Runs a fixed set of long-lived child services under a restart policy
/// (§4.2). Created with services in their intended start order; they are
/// stopped in reverse order during shutdown.
pub struct Supervisor {
    services: Vec<ManagedService>,
    pidfile_path: std::path::PathBuf,
}

impl Supervisor {
    pub fn new(services: Vec<ServiceSpec>, pidfile_path: std::path::PathBuf) -> Self {
        Self {
            services: services.into_iter().map(ManagedService::new).collect(),
            pidfile_path,
        }
    }

    fn write_pidfile(&self) {
        let entries: Vec<(String, u32)> = self
            .services
            .iter()
            .filter_map(|s| s.pid().map(|pid| (s.spec.name.clone(), pid)))
            .collect();

        if let Err(error) = Pidfile::write(&self.pidfile_path, std::process::id(), &entries) {
            warn!(%error, "failed to write pidfile, continuing with in-memory state");
        }
    }

    fn broadcast(&self, signal: i32) {
        for service in &self.services {
            if let Some(pid) = service.pid() {
                send_signal(pid, signal);
            }
        }
    }

    fn broadcast_reverse(&self, signal: i32) {
        for service in self.services.iter().rev() {
            if let Some(pid) = service.pid() {
                send_signal(pid, signal);
            }
        }
    }

    fn all_exited(&mut self) -> bool {
        self.services
            .iter_mut()
            .all(|s| match s.child.as_mut() {
                Some(child) => matches!(child.try_wait(), Ok(Some(_))),
                None => true,
            })
    }

    /// Starts every service, records the pidfile, and runs the
    /// reconcile/signal loop until shutdown.
    pub async fn start(&mut self) -> Result<SupervisorExit, SupervisorError> {
        for index in 0..self.services.len() {
            if let Err(error) = self.services[index].spawn() {
                error!(service = %self.services[index].spec.name, %error, "failed to start service");
                return Err(error);
            }
            info!(service = %self.services[index].spec.name, "service started");
        }
        self.write_pidfile();

        let mut signal_rx = signals::install()?;
        let mut tick = interval(RECONCILE_TICK);
        let mut shutdown: Option<ShutdownPhase> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Some(phase) = shutdown {
                        let now = Instant::now();
                        match phase {
                            ShutdownPhase::Term { deadline } if now >= deadline => {
                                warn!("grace period expired, escalating to SIGQUIT");
                                self.broadcast_reverse(libc::SIGQUIT);
                                shutdown = Some(ShutdownPhase::Quit { deadline: now + GRACE_PERIOD });
                            }
                            ShutdownPhase::Quit { deadline } if now >= deadline => {
                                warn!("grace period expired, sending SIGKILL");
                                self.broadcast_reverse(libc::SIGKILL);
                            }
                            _ => {}
                        }

                        if self.all_exited() {
                            return Ok(SupervisorExit::UserRequestedQuit);
                        }
                        continue;
                    }

                    if let Some(exit) = self.reconcile().await {
                        return Ok(exit);
                    }
                }

                Some(signal) = signal_rx.recv() => {
                    match signal {
                        SupervisorSignal::Reload => {
                            info!("SIGHUP received, broadcasting reload");
                            self.broadcast(libc::SIGHUP);
                        }
                        SupervisorSignal::SmartShutdown if shutdown.is_none() => {
                            info!("SIGTERM received, beginning smart shutdown");
                            self.broadcast_reverse(libc::SIGTERM);
                            shutdown = Some(ShutdownPhase::Term { deadline: Instant::now() + GRACE_PERIOD });
                        }
                        SupervisorSignal::FastShutdown if shutdown.is_none()
                            || matches!(shutdown, Some(ShutdownPhase::Term { .. })) =>
                        {
                            info!("SIGINT received, beginning fast shutdown");
                            self.broadcast_reverse(libc::SIGQUIT);
                            shutdown = Some(ShutdownPhase::Quit { deadline: Instant::now() + GRACE_PERIOD });
                        }
                        SupervisorSignal::Kill => {
                            // Immediate, regardless of current shutdown phase.
                            warn!("SIGQUIT received, killing all children immediately");
                            self.broadcast_reverse(libc::SIGKILL);
                            return Ok(SupervisorExit::UserRequestedQuit);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Checks every child for exit, applying restart policy and budget.
    /// Returns `Some(exit)` if the tree should shut down.
    async fn reconcile(&mut self) -> Option<SupervisorExit> {
        let now = Instant::now();
        let mut changed = false;

        for service in &mut self.services {
            if let Some(deadline) = service.next_restart_at {
                if now >= deadline {
                    if let Err(error) = service.spawn() {
                        error!(service = %service.spec.name, %error, "restart failed");
                    } else {
                        info!(service = %service.spec.name, "service restarted");
                        changed = true;
                    }
                }
                continue;
            }

            let Some(child) = service.child.as_mut() else {
                continue;
            };

            let exit_status = match child.try_wait() {
                Ok(Some(status)) => status,
                Ok(None) => continue,
                Err(error) => {
                    error!(service = %service.spec.name, %error, "failed to poll child status");
                    continue;
                }
            };

            service.child = None;
            changed = true;
            let success = exit_status.success();
            warn!(service = %service.spec.name, success, "service exited");

            if !service.spec.restart_policy.should_restart(success) {
                if service.spec.restart_policy == RestartPolicy::Temporary {
                    info!(service = %service.spec.name, "temporary service will not be restarted");
                }
                continue;
            }

            match service.budget.record_restart(now) {
                Ok(backoff) => {
                    service.next_restart_at = Some(now + backoff);
                }
                Err(()) => {
                    error!(service = %service.spec.name, "restart budget exceeded, shutting down tree");
                    self.broadcast_reverse(libc::SIGKILL);
                    return Some(SupervisorExit::RestartBudgetExceeded);
                }
            }
        }

        if changed {
            self.write_pidfile();
        }

        None
    }
}
