//! `enable maintenance` / `disable maintenance` (§6, assignment rule 1).

use crate::error::CliError;

use super::{monitor_link, CommandContext};

pub fn enable(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("enable maintenance"))
}

pub fn disable(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("disable maintenance"))
}
