//! Service specification (§4.2).

use tokio::process::Command;

/// Governs whether a service is restarted after it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Always restart, regardless of exit status.
    Permanent,
    /// Restart only on a non-zero exit.
    Transient,
    /// Never restart.
    Temporary,
}

impl RestartPolicy {
    /// Whether a service with this policy should be restarted given its
    /// exit status (`None` means it never started in the first place).
    pub fn should_restart(self, exit_success: bool) -> bool {
        match self {
            RestartPolicy::Permanent => true,
            RestartPolicy::Transient => !exit_success,
            RestartPolicy::Temporary => false,
        }
    }
}

/// A long-lived child service the supervisor starts, restarts, and shuts
/// down as a unit (§4.2).
///
/// `command` is a factory rather than a stored `Command` because
/// `tokio::process::Command` isn't `Clone` and the supervisor needs a fresh
/// one for every (re)start.
pub struct ServiceSpec {
    pub name: String,
    pub restart_policy: RestartPolicy,
    pub command: Box<dyn Fn() -> Command + Send + Sync>,
}

impl ServiceSpec {
    pub fn new(
        name: impl Into<String>,
        restart_policy: RestartPolicy,
        command: impl Fn() -> Command + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            restart_policy,
            command: Box::new(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_always_restarts() {
        assert!(RestartPolicy::Permanent.should_restart(true));
        assert!(RestartPolicy::Permanent.should_restart(false));
    }

    #[test]
    fn transient_restarts_only_on_failure() {
        assert!(!RestartPolicy::Transient.should_restart(true));
        assert!(RestartPolicy::Transient.should_restart(false));
    }

    #[test]
    fn temporary_never_restarts() {
        assert!(!RestartPolicy::Temporary.should_restart(true));
        assert!(!RestartPolicy::Temporary.should_restart(false));
    }
}
