//! `show state|events|uri|settings|file|standby-names` (§6, §4.4).

use pgkeeper_config::Paths;

use crate::error::CliError;
use crate::style::{print_info_table, print_labeled};

use super::{monitor_link, CommandContext};

pub enum What {
    State,
    Events { count: u64 },
    Uri,
    Settings,
    File,
    StandbyNames,
}

pub fn run(ctx: &CommandContext, what: What) -> Result<(), CliError> {
    match what {
        What::State => Err(monitor_link::unavailable("show state")),
        What::Events { count } => {
            let _ = count;
            Err(monitor_link::unavailable("show events"))
        }
        What::Uri => Err(monitor_link::unavailable("show uri")),
        What::StandbyNames => Err(monitor_link::unavailable("show standby-names")),
        What::Settings => show_settings(ctx),
        What::File => show_file(ctx),
    }
}

fn show_settings(ctx: &CommandContext) -> Result<(), CliError> {
    let config = ctx.load_config()?;
    let group = config.keeper.group.to_string();
    let pgdata = config.postgresql.pgdata.display().to_string();
    let port = config.postgresql.port.to_string();

    let entries = [
        ("role", config.keeper.role.as_str()),
        ("formation", config.keeper.formation.as_str()),
        ("group", group.as_str()),
        ("name", config.keeper.name.as_deref().unwrap_or("-")),
        ("pgdata", pgdata.as_str()),
        ("host", config.postgresql.host.as_str()),
        ("port", port.as_str()),
        ("hba_level", config.postgresql.hba_level.as_str()),
    ];

    if ctx.json {
        print_json_object(&entries);
    } else {
        print_info_table(&entries);
    }
    Ok(())
}

fn show_file(ctx: &CommandContext) -> Result<(), CliError> {
    let paths = Paths::new()?;
    let config = paths.config_file(&ctx.pgdata).display().to_string();
    let state = paths.state_file(&ctx.pgdata).display().to_string();
    let pid = paths.pid_file(&ctx.pgdata).display().to_string();

    let entries = [
        ("config", config.as_str()),
        ("state", state.as_str()),
        ("pid", pid.as_str()),
    ];

    if ctx.json {
        print_json_object(&entries);
    } else {
        for (key, value) in entries {
            print_labeled(key, value);
        }
    }
    Ok(())
}

fn print_json_object(entries: &[(&str, &str)]) {
    let object: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
        .collect();
    println!("{}", serde_json::Value::Object(object));
}
