//! `perform failover|switchover|promotion` (§6, §4.5 rule 5).

use crate::error::CliError;

use super::{monitor_link, CommandContext};

pub fn failover(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("perform failover"))
}

pub fn switchover(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("perform switchover"))
}

pub fn promotion(ctx: &CommandContext, target_name: &str) -> Result<(), CliError> {
    ctx.load_config()?;
    let _ = target_name;
    Err(monitor_link::unavailable("perform promotion"))
}
