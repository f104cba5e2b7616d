//! `drop node` (§6): asks the monitor to remove a node from its formation.

use crate::error::CliError;

use super::{monitor_link, CommandContext};

pub fn run(ctx: &CommandContext, name: Option<String>) -> Result<(), CliError> {
    let config = ctx.load_config()?;
    let target = name
        .or(config.keeper.name.clone())
        .ok_or_else(|| CliError::BadArguments("no node name given and none configured".to_string()))?;

    let _ = target;
    Err(monitor_link::unavailable("drop node"))
}
