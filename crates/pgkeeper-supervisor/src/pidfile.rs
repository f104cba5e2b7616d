//! Pidfile format (§4.2): line 1 is the supervisor pid, subsequent lines
//! are `serviceName pid` pairs. Written atomically on every change through
//! the same `write_atomic` discipline the state store uses.

use std::path::Path;

use pgkeeper_io::{FileIo, SyncBackend};

use crate::error::SupervisorError;

pub struct Pidfile;

impl Pidfile {
    /// Writes the pidfile. A failure here is logged by the caller but is
    /// not fatal (§4.2): the in-memory state remains authoritative.
    pub fn write(
        path: &Path,
        supervisor_pid: u32,
        services: &[(String, u32)],
    ) -> Result<(), SupervisorError> {
        let mut contents = format!("{supervisor_pid}\n");
        for (name, pid) in services {
            contents.push_str(&format!("{name} {pid}\n"));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        SyncBackend::new().write_atomic(path, contents.as_bytes())?;
        Ok(())
    }

    /// Looks up a named service's pid for external `do service` commands.
    pub fn find_service_pid(path: &Path, name: &str) -> Result<u32, SupervisorError> {
        let contents = SyncBackend::new().read_all(path)?;
        let text = String::from_utf8(contents).map_err(|_| SupervisorError::PidfileCorrupt)?;

        let mut lines = text.lines();
        lines.next().ok_or(SupervisorError::PidfileCorrupt)?;

        for line in lines {
            let (service_name, pid_str) = line.split_once(' ').ok_or(SupervisorError::PidfileCorrupt)?;
            if service_name == name {
                return pid_str.parse().map_err(|_| SupervisorError::PidfileCorrupt);
            }
        }

        Err(SupervisorError::ServiceNotFound {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_find_service_pid_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.pid");

        Pidfile::write(
            &path,
            100,
            &[("postgres".to_string(), 101), ("fsm".to_string(), 102)],
        )
        .unwrap();

        assert_eq!(Pidfile::find_service_pid(&path, "postgres").unwrap(), 101);
        assert_eq!(Pidfile::find_service_pid(&path, "fsm").unwrap(), 102);
    }

    #[test]
    fn unknown_service_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.pid");
        Pidfile::write(&path, 100, &[("postgres".to_string(), 101)]).unwrap();

        let err = Pidfile::find_service_pid(&path, "missing").unwrap_err();
        assert!(matches!(err, SupervisorError::ServiceNotFound { .. }));
    }
}
