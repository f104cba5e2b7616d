//! Configuration management for pg_keeper.
//!
//! The INI file at `${XDG_CONFIG_HOME}/pg_keeper/<abs_pgdata>/pg_keeper.cfg`
//! is the system of record (§6): unlike a typical cascading config loader,
//! there is exactly one file per node and it is written by `create
//! monitor`/`create postgres` and read by every other subcommand. [`Paths`]
//! resolves where that file (and its state/data siblings) live; the
//! [`schema`] module describes its sections; [`ConfigLoader`] reads and
//! writes it.

mod error;
mod loader;
mod paths;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;
pub use schema::{
    HbaLevel, KeeperConfig, KeeperSection, PostgresqlSection, ReplicationSection, Role,
    SslSection, TimeoutSection,
};

impl KeeperConfig {
    /// Loads the config for a given `pgdata`, resolving its path via XDG
    /// discovery first.
    pub fn load(abs_pgdata: &std::path::Path) -> Result<Self, ConfigError> {
        let paths = Paths::new()?;
        ConfigLoader::load_from_file(&paths.config_file(abs_pgdata))
    }

    /// Writes this config to its canonical XDG location for `abs_pgdata`.
    pub fn save(&self, abs_pgdata: &std::path::Path) -> Result<(), ConfigError> {
        let paths = Paths::new()?;
        ConfigLoader::write_to_file(self, &paths.config_file(abs_pgdata))
    }
}
