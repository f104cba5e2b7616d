//! INI schema (§6: recognized keys).
//!
//! Each struct maps one INI section to a destination record. Parsing is a
//! single traversal per §9's design note: validate, fill defaults, and
//! check required fields in one pass rather than three.

use std::path::PathBuf;
use std::time::Duration;

use pgkeeper_types::{FormationName, GroupId, NodeKind};

/// `[keeper]` section (the `pg_autoctl` section in upstream naming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Monitor,
    Keeper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Monitor => "monitor",
            Role::Keeper => "keeper",
        }
    }
}

/// `hba_level` values for generated `pg_hba.conf` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HbaLevel {
    Minimal,
    Network,
    Lan,
    App,
}

impl HbaLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            HbaLevel::Minimal => "minimal",
            HbaLevel::Network => "network",
            HbaLevel::Lan => "lan",
            HbaLevel::App => "app",
        }
    }
}

impl Default for HbaLevel {
    fn default() -> Self {
        HbaLevel::Minimal
    }
}

#[derive(Debug, Clone)]
pub struct KeeperSection {
    pub role: Role,
    pub monitor: Option<String>,
    pub formation: FormationName,
    pub group: GroupId,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub nodekind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct PostgresqlSection {
    pub pgdata: PathBuf,
    pub pg_ctl: Option<PathBuf>,
    pub username: String,
    pub dbname: String,
    pub host: String,
    pub port: u16,
    pub listen_addresses: String,
    pub auth_method: String,
    pub hba_level: HbaLevel,
}

#[derive(Debug, Clone, Default)]
pub struct SslSection {
    pub active: bool,
    pub sslmode: Option<String>,
    pub ca_file: Option<PathBuf>,
    pub crl_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplicationSection {
    pub password: Option<String>,
    pub maximum_backup_rate: String,
    pub backup_directory: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TimeoutSection {
    pub network_partition_timeout: Duration,
    pub prepare_promotion_catchup: Duration,
    pub prepare_promotion_walreceiver: Duration,
    pub postgresql_restart_failure_timeout: Duration,
    pub postgresql_restart_failure_max_retries: u32,
    pub listen_notifications_timeout: Duration,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            network_partition_timeout: Duration::from_secs(20),
            prepare_promotion_catchup: Duration::from_secs(30),
            prepare_promotion_walreceiver: Duration::from_secs(5),
            postgresql_restart_failure_timeout: Duration::from_secs(20),
            postgresql_restart_failure_max_retries: 3,
            listen_notifications_timeout: Duration::from_secs(300),
        }
    }
}

/// The fully parsed configuration file.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    pub keeper: KeeperSection,
    pub postgresql: PostgresqlSection,
    pub ssl: SslSection,
    pub replication: ReplicationSection,
    pub timeout: TimeoutSection,
}
