//! CLI command implementations (§6).

pub mod create;
pub mod drop_node;
pub mod maintenance;
pub mod monitor_link;
pub mod perform;
pub mod run;
pub mod show;
pub mod watch;

use std::path::PathBuf;

use pgkeeper_types::{FormationName, GroupId};

/// The global flags every command needs to resolve its target node,
/// formation, and group (§6).
pub struct CommandContext {
    pub pgdata: PathBuf,
    pub monitor: Option<String>,
    pub formation: Option<String>,
    pub group: Option<u32>,
    pub name: Option<String>,
    pub json: bool,
}

impl CommandContext {
    pub fn formation_name(&self) -> FormationName {
        self.formation
            .as_deref()
            .map(FormationName::new)
            .unwrap_or_default()
    }

    pub fn group_id(&self) -> GroupId {
        GroupId::new(self.group.unwrap_or(0))
    }

    /// Loads this node's configuration file, resolved by XDG discovery
    /// against `pgdata` (§6).
    pub fn load_config(&self) -> Result<pgkeeper_config::KeeperConfig, crate::error::CliError> {
        Ok(pgkeeper_config::KeeperConfig::load(&self.pgdata)?)
    }
}
