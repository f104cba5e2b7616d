//! `watch` (§6): a live dashboard driven by the monitor's `listen` feed.

use crate::error::CliError;

use super::{monitor_link, CommandContext};

pub fn run(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("watch"))
}
