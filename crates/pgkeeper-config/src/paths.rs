//! XDG path resolution (§6: on-disk state directory).
//!
//! pg_keeper mirrors the absolute `pgdata` path under each XDG base
//! directory, so two keepers running against two different data
//! directories on the same host never collide: `~/.config/pg_keeper/<abs
//! pgdata, root stripped>/pg_keeper.cfg`, and likewise under the data and
//! runtime bases.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

const APP_DIR: &str = "pg_keeper";

/// Resolves the on-disk locations pg_keeper reads and writes for a given
/// `pgdata` directory.
pub struct Paths {
    base: BaseDirs,
}

impl Paths {
    /// Discovers the user's XDG base directories.
    pub fn new() -> Result<Self, ConfigError> {
        BaseDirs::new()
            .map(|base| Self { base })
            .ok_or_else(|| ConfigError::Xdg("could not determine home directory".to_string()))
    }

    /// Relativizes an absolute `pgdata` path so it can be joined under an
    /// XDG base directory (strips the leading root component).
    fn node_component(abs_pgdata: &Path) -> PathBuf {
        abs_pgdata
            .strip_prefix("/")
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| abs_pgdata.to_path_buf())
    }

    fn node_dir(base_dir: &Path, abs_pgdata: &Path) -> PathBuf {
        base_dir.join(APP_DIR).join(Self::node_component(abs_pgdata))
    }

    /// `${XDG_CONFIG_HOME or ~/.config}/pg_keeper/<abs_pgdata>/pg_keeper.cfg`
    pub fn config_file(&self, abs_pgdata: &Path) -> PathBuf {
        Self::node_dir(self.base.config_dir(), abs_pgdata).join("pg_keeper.cfg")
    }

    /// `${XDG_DATA_HOME or ~/.local/share}/pg_keeper/<abs_pgdata>/pg_keeper.state`
    pub fn state_file(&self, abs_pgdata: &Path) -> PathBuf {
        Self::node_dir(self.base.data_dir(), abs_pgdata).join("pg_keeper.state")
    }

    /// Same data directory as [`Self::state_file`]: `pg_keeper.init`.
    pub fn init_file(&self, abs_pgdata: &Path) -> PathBuf {
        Self::node_dir(self.base.data_dir(), abs_pgdata).join("pg_keeper.init")
    }

    /// Same data directory: `pg_keeper.nodes` (cached peer list).
    pub fn nodes_file(&self, abs_pgdata: &Path) -> PathBuf {
        Self::node_dir(self.base.data_dir(), abs_pgdata).join("pg_keeper.nodes")
    }

    /// Same data directory: `pg_keeper.pg` (expected database status).
    pub fn pg_file(&self, abs_pgdata: &Path) -> PathBuf {
        Self::node_dir(self.base.data_dir(), abs_pgdata).join("pg_keeper.pg")
    }

    /// `${XDG_RUNTIME_DIR or /tmp}/pg_keeper/<abs_pgdata>/pg_keeper.pid`
    pub fn pid_file(&self, abs_pgdata: &Path) -> PathBuf {
        let runtime_base = self
            .base
            .runtime_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        Self::node_dir(&runtime_base, abs_pgdata).join("pg_keeper.pid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_mirrors_abs_pgdata_under_config_home() {
        let paths = Paths::new().expect("base dirs available in test environment");
        let path = paths.config_file(Path::new("/var/lib/postgres/16/main"));

        assert!(path.ends_with("pg_keeper/var/lib/postgres/16/main/pg_keeper.cfg"));
    }

    #[test]
    fn sibling_files_share_the_same_node_directory() {
        let paths = Paths::new().expect("base dirs available in test environment");
        let pgdata = Path::new("/data/pg");

        let state = paths.state_file(pgdata);
        let init = paths.init_file(pgdata);
        assert_eq!(state.parent(), init.parent());
    }

    #[test]
    fn pid_file_falls_back_to_tmp_without_runtime_dir() {
        let paths = Paths::new().expect("base dirs available in test environment");
        let path = paths.pid_file(Path::new("/data/pg"));
        assert_eq!(path.file_name().unwrap(), "pg_keeper.pid");
    }
}
