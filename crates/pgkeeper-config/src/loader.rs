//! INI config file loading and writing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use pgkeeper_types::{FormationName, GroupId, NodeKind};

use crate::error::ConfigError;
use crate::schema::{
    HbaLevel, KeeperConfig, KeeperSection, PostgresqlSection, ReplicationSection, Role,
    SslSection, TimeoutSection,
};

/// Reads and writes `pg_keeper.cfg` files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses a config file from disk.
    pub fn load_from_file(path: &Path) -> Result<KeeperConfig, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<KeeperConfig, ConfigError> {
        let keeper = Self::parse_keeper(ini)?;
        let postgresql = Self::parse_postgresql(ini)?;
        let ssl = Self::parse_ssl(ini);
        let replication = Self::parse_replication(ini);
        let timeout = Self::parse_timeout(ini)?;

        Ok(KeeperConfig {
            keeper,
            postgresql,
            ssl,
            replication,
            timeout,
        })
    }

    fn get<'a>(ini: &'a Ini, section: &'static str, key: &'static str) -> Option<&'a str> {
        ini.section(Some(section)).and_then(|s| s.get(key))
    }

    fn require<'a>(
        ini: &'a Ini,
        section: &'static str,
        key: &'static str,
    ) -> Result<&'a str, ConfigError> {
        Self::get(ini, section, key).ok_or(ConfigError::MissingKey { section, key })
    }

    fn parse_port(
        section: &'static str,
        key: &'static str,
        value: &str,
    ) -> Result<u16, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidValue {
            section,
            key,
            value: value.to_string(),
        })
    }

    fn parse_secs(
        section: &'static str,
        key: &'static str,
        value: &str,
    ) -> Result<Duration, ConfigError> {
        value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidValue {
                section,
                key,
                value: value.to_string(),
            })
    }

    fn parse_keeper(ini: &Ini) -> Result<KeeperSection, ConfigError> {
        const SECTION: &str = "keeper";

        let role = match Self::require(ini, SECTION, "role")? {
            "monitor" => Role::Monitor,
            "keeper" => Role::Keeper,
            other => return Err(ConfigError::UnknownRole(other.to_string())),
        };

        let group = match Self::get(ini, SECTION, "group") {
            Some(value) => value
                .parse()
                .map(GroupId::new)
                .map_err(|_| ConfigError::InvalidValue {
                    section: SECTION,
                    key: "group",
                    value: value.to_string(),
                })?,
            None => GroupId::new(0),
        };

        let nodekind = match Self::get(ini, SECTION, "nodekind") {
            Some("standalone") | None => NodeKind::Standalone,
            Some("coordinator") => NodeKind::Coordinator,
            Some("worker") => NodeKind::Worker,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    section: SECTION,
                    key: "nodekind",
                    value: other.to_string(),
                });
            }
        };

        Ok(KeeperSection {
            role,
            monitor: Self::get(ini, SECTION, "monitor").map(str::to_string),
            formation: Self::get(ini, SECTION, "formation")
                .map(FormationName::new)
                .unwrap_or_default(),
            group,
            name: Self::get(ini, SECTION, "name").map(str::to_string),
            hostname: Self::get(ini, SECTION, "hostname").map(str::to_string),
            nodekind,
        })
    }

    fn parse_postgresql(ini: &Ini) -> Result<PostgresqlSection, ConfigError> {
        const SECTION: &str = "postgresql";

        let port_str = Self::get(ini, SECTION, "port").unwrap_or("5432");
        let port = Self::parse_port(SECTION, "port", port_str)?;

        let hba_level = match Self::get(ini, SECTION, "hba_level") {
            Some("minimal") | None => HbaLevel::Minimal,
            Some("network") => HbaLevel::Network,
            Some("lan") => HbaLevel::Lan,
            Some("app") => HbaLevel::App,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    section: SECTION,
                    key: "hba_level",
                    value: other.to_string(),
                });
            }
        };

        Ok(PostgresqlSection {
            pgdata: PathBuf::from(Self::require(ini, SECTION, "pgdata")?),
            pg_ctl: Self::get(ini, SECTION, "pg_ctl").map(PathBuf::from),
            username: Self::get(ini, SECTION, "username")
                .unwrap_or("postgres")
                .to_string(),
            dbname: Self::get(ini, SECTION, "dbname")
                .unwrap_or("postgres")
                .to_string(),
            host: Self::get(ini, SECTION, "host")
                .unwrap_or("localhost")
                .to_string(),
            port,
            listen_addresses: Self::get(ini, SECTION, "listen_addresses")
                .unwrap_or("*")
                .to_string(),
            auth_method: Self::get(ini, SECTION, "auth_method")
                .unwrap_or("trust")
                .to_string(),
            hba_level,
        })
    }

    fn parse_ssl(ini: &Ini) -> SslSection {
        const SECTION: &str = "ssl";

        SslSection {
            active: Self::get(ini, SECTION, "active")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            sslmode: Self::get(ini, SECTION, "sslmode").map(str::to_string),
            ca_file: Self::get(ini, SECTION, "ca_file").map(PathBuf::from),
            crl_file: Self::get(ini, SECTION, "crl_file").map(PathBuf::from),
            cert_file: Self::get(ini, SECTION, "cert_file").map(PathBuf::from),
            key_file: Self::get(ini, SECTION, "key_file").map(PathBuf::from),
        }
    }

    fn parse_replication(ini: &Ini) -> ReplicationSection {
        const SECTION: &str = "replication";

        ReplicationSection {
            password: Self::get(ini, SECTION, "password").map(str::to_string),
            maximum_backup_rate: Self::get(ini, SECTION, "maximum_backup_rate")
                .unwrap_or("100M")
                .to_string(),
            backup_directory: Self::get(ini, SECTION, "backup_directory").map(PathBuf::from),
        }
    }

    fn parse_timeout(ini: &Ini) -> Result<TimeoutSection, ConfigError> {
        const SECTION: &str = "timeout";
        let defaults = TimeoutSection::default();

        let secs_or_default = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match Self::get(ini, SECTION, key) {
                Some(value) => Self::parse_secs(SECTION, key, value),
                None => Ok(default),
            }
        };

        let retries_or_default = |key: &'static str, default: u32| -> Result<u32, ConfigError> {
            match Self::get(ini, SECTION, key) {
                Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                    section: SECTION,
                    key,
                    value: value.to_string(),
                }),
                None => Ok(default),
            }
        };

        Ok(TimeoutSection {
            network_partition_timeout: secs_or_default(
                "network_partition_timeout",
                defaults.network_partition_timeout,
            )?,
            prepare_promotion_catchup: secs_or_default(
                "prepare_promotion_catchup",
                defaults.prepare_promotion_catchup,
            )?,
            prepare_promotion_walreceiver: secs_or_default(
                "prepare_promotion_walreceiver",
                defaults.prepare_promotion_walreceiver,
            )?,
            postgresql_restart_failure_timeout: secs_or_default(
                "postgresql_restart_failure_timeout",
                defaults.postgresql_restart_failure_timeout,
            )?,
            postgresql_restart_failure_max_retries: retries_or_default(
                "postgresql_restart_failure_max_retries",
                defaults.postgresql_restart_failure_max_retries,
            )?,
            listen_notifications_timeout: secs_or_default(
                "listen_notifications_timeout",
                defaults.listen_notifications_timeout,
            )?,
        })
    }

    /// Serializes a config back to an INI file, creating parent directories
    /// as needed. Used by `create monitor`/`create postgres` (§6).
    pub fn write_to_file(config: &KeeperConfig, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();

        {
            let mut section = ini.with_section(Some("keeper"));
            section.set("role", config.keeper.role.as_str());
            section.set("formation", config.keeper.formation.as_str());
            section.set("group", config.keeper.group.get().to_string());
            section.set("nodekind", config.keeper.nodekind.to_string());
            if let Some(monitor) = &config.keeper.monitor {
                section.set("monitor", monitor);
            }
            if let Some(name) = &config.keeper.name {
                section.set("name", name);
            }
            if let Some(hostname) = &config.keeper.hostname {
                section.set("hostname", hostname);
            }
        }

        {
            let pg = &config.postgresql;
            let mut section = ini.with_section(Some("postgresql"));
            section.set("pgdata", pg.pgdata.to_string_lossy().into_owned());
            section.set("username", &pg.username);
            section.set("dbname", &pg.dbname);
            section.set("host", &pg.host);
            section.set("port", pg.port.to_string());
            section.set("listen_addresses", &pg.listen_addresses);
            section.set("auth_method", &pg.auth_method);
            section.set("hba_level", pg.hba_level.as_str());
            if let Some(pg_ctl) = &pg.pg_ctl {
                section.set("pg_ctl", pg_ctl.to_string_lossy().into_owned());
            }
        }

        {
            let ssl = &config.ssl;
            let mut section = ini.with_section(Some("ssl"));
            section.set("active", if ssl.active { "true" } else { "false" });
            if let Some(sslmode) = &ssl.sslmode {
                section.set("sslmode", sslmode);
            }
        }

        {
            let replication = &config.replication;
            let mut section = ini.with_section(Some("replication"));
            section.set(
                "maximum_backup_rate",
                replication.maximum_backup_rate.clone(),
            );
            if let Some(dir) = &replication.backup_directory {
                section.set("backup_directory", dir.to_string_lossy().into_owned());
            }
        }

        {
            let timeout = &config.timeout;
            let mut section = ini.with_section(Some("timeout"));
            section.set(
                "network_partition_timeout",
                timeout.network_partition_timeout.as_secs().to_string(),
            );
            section.set(
                "prepare_promotion_catchup",
                timeout.prepare_promotion_catchup.as_secs().to_string(),
            );
            section.set(
                "prepare_promotion_walreceiver",
                timeout.prepare_promotion_walreceiver.as_secs().to_string(),
            );
            section.set(
                "postgresql_restart_failure_timeout",
                timeout
                    .postgresql_restart_failure_timeout
                    .as_secs()
                    .to_string(),
            );
            section.set(
                "postgresql_restart_failure_max_retries",
                timeout.postgresql_restart_failure_max_retries.to_string(),
            );
            section.set(
                "listen_notifications_timeout",
                timeout.listen_notifications_timeout.as_secs().to_string(),
            );
        }

        ini.write_to_file(path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> KeeperConfig {
        KeeperConfig {
            keeper: KeeperSection {
                role: Role::Keeper,
                monitor: Some("postgres://monitor/pg_auto_failover".to_string()),
                formation: FormationName::default(),
                group: GroupId::new(0),
                name: Some("node1".to_string()),
                hostname: Some("node1.example.com".to_string()),
                nodekind: NodeKind::Standalone,
            },
            postgresql: PostgresqlSection {
                pgdata: PathBuf::from("/data/pg"),
                pg_ctl: None,
                username: "postgres".to_string(),
                dbname: "postgres".to_string(),
                host: "node1.example.com".to_string(),
                port: 5432,
                listen_addresses: "*".to_string(),
                auth_method: "trust".to_string(),
                hba_level: HbaLevel::Minimal,
            },
            ssl: SslSection::default(),
            replication: ReplicationSection::default(),
            timeout: TimeoutSection::default(),
        }
    }

    #[test]
    fn write_then_load_round_trips_required_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.cfg");
        let config = sample_config();

        ConfigLoader::write_to_file(&config, &path).unwrap();
        let loaded = ConfigLoader::load_from_file(&path).unwrap();

        assert_eq!(loaded.keeper.role, Role::Keeper);
        assert_eq!(loaded.keeper.monitor, config.keeper.monitor);
        assert_eq!(loaded.postgresql.pgdata, config.postgresql.pgdata);
        assert_eq!(loaded.postgresql.port, 5432);
    }

    #[test]
    fn missing_role_is_a_missing_key_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.cfg");
        std::fs::write(&path, "[postgresql]\npgdata = /data/pg\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingKey {
                section: "keeper",
                key: "role"
            }
        ));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.cfg");
        std::fs::write(
            &path,
            "[keeper]\nrole = bystander\n[postgresql]\npgdata = /data/pg\n",
        )
        .unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRole(role) if role == "bystander"));
    }

    #[test]
    fn timeout_section_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.cfg");
        std::fs::write(
            &path,
            "[keeper]\nrole = monitor\n[postgresql]\npgdata = /data/pg\n",
        )
        .unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(
            loaded.timeout.network_partition_timeout,
            Duration::from_secs(20)
        );
        assert_eq!(loaded.timeout.postgresql_restart_failure_max_retries, 3);
    }
}
