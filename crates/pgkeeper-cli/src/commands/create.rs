//! `create monitor` / `create postgres` (§6): writes the on-disk config
//! file that every other command reads back.

use pgkeeper_config::{
    HbaLevel, KeeperConfig, KeeperSection, PostgresqlSection, ReplicationSection, Role,
    SslSection, TimeoutSection,
};
use pgkeeper_types::NodeKind;

use crate::error::CliError;
use crate::style::{print_labeled, print_success};

use super::CommandContext;

fn default_name(ctx: &CommandContext, role: Role) -> String {
    ctx.name.clone().unwrap_or_else(|| match role {
        Role::Monitor => "monitor".to_string(),
        Role::Keeper => "node".to_string(),
    })
}

pub fn monitor(ctx: &CommandContext, hostname: Option<String>, port: u16) -> Result<(), CliError> {
    let config = KeeperConfig {
        keeper: KeeperSection {
            role: Role::Monitor,
            monitor: None,
            formation: ctx.formation_name(),
            group: ctx.group_id(),
            name: Some(default_name(ctx, Role::Monitor)),
            hostname,
            nodekind: NodeKind::Standalone,
        },
        postgresql: PostgresqlSection {
            pgdata: ctx.pgdata.clone(),
            pg_ctl: None,
            username: "postgres".to_string(),
            dbname: "pg_keeper".to_string(),
            host: "localhost".to_string(),
            port,
            listen_addresses: "*".to_string(),
            auth_method: "trust".to_string(),
            hba_level: HbaLevel::Minimal,
        },
        ssl: SslSection::default(),
        replication: ReplicationSection::default(),
        timeout: TimeoutSection::default(),
    };

    config.save(&ctx.pgdata)?;
    print_success(&format!("monitor created at {}", ctx.pgdata.display()));
    print_labeled("formation", config.keeper.formation.as_str());
    Ok(())
}

pub fn postgres(ctx: &CommandContext, hostname: Option<String>, port: u16) -> Result<(), CliError> {
    let monitor = ctx.monitor.clone().ok_or_else(|| {
        CliError::BadArguments("--monitor is required for create postgres".to_string())
    })?;

    let config = KeeperConfig {
        keeper: KeeperSection {
            role: Role::Keeper,
            monitor: Some(monitor),
            formation: ctx.formation_name(),
            group: ctx.group_id(),
            name: Some(default_name(ctx, Role::Keeper)),
            hostname,
            nodekind: NodeKind::Standalone,
        },
        postgresql: PostgresqlSection {
            pgdata: ctx.pgdata.clone(),
            pg_ctl: None,
            username: "postgres".to_string(),
            dbname: "postgres".to_string(),
            host: "localhost".to_string(),
            port,
            listen_addresses: "*".to_string(),
            auth_method: "trust".to_string(),
            hba_level: HbaLevel::Minimal,
        },
        ssl: SslSection::default(),
        replication: ReplicationSection::default(),
        timeout: TimeoutSection::default(),
    };

    config.save(&ctx.pgdata)?;
    print_success(&format!("keeper created at {}", ctx.pgdata.display()));
    print_labeled("monitor", config.keeper.monitor.as_deref().unwrap_or(""));
    print_labeled("formation", config.keeper.formation.as_str());
    print_labeled("group", &config.keeper.group.to_string());
    Ok(())
}
