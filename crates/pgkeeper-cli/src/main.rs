//! pg_keeper command-line interface (§6).
//!
//! One binary plays both roles: a keeper (`create postgres`, `run`) that
//! drives a local Postgres through the node-active loop, and a monitor
//! (`create monitor`) that the assignment engine talks to. Every other
//! verb is a thin client against whichever role this `--pgdata` belongs
//! to.

mod commands;
mod error;
mod exit;
mod style;

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{Parser, Subcommand};

use error::CliError;
use exit::ExitCode;

/// pg_keeper: automated Postgres failover, modeled on `pg_autoctl`.
#[derive(Parser)]
#[command(name = "pg_keeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Data directory this command operates on. Defaults to `$PGDATA`.
    #[arg(long, global = true)]
    pgdata: Option<PathBuf>,

    /// Monitor connection string, for `create monitor`/`create postgres`.
    #[arg(long, global = true)]
    monitor: Option<String>,

    /// Formation name. Defaults to `default`.
    #[arg(long, global = true)]
    formation: Option<String>,

    /// Replication group id within the formation. Defaults to 0.
    #[arg(long, global = true)]
    group: Option<u32>,

    /// This node's registered name.
    #[arg(long, global = true)]
    name: Option<String>,

    /// Emit machine-readable JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Decrease log verbosity to warnings and errors only.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new monitor or keeper node.
    #[command(subcommand)]
    Create(CreateCommands),

    /// Start this node's supervisor (Postgres subprocess plus node-active
    /// loop) and run until signaled.
    Run,

    /// Ask a running supervisor to shut down smartly (`SIGTERM`).
    Stop {
        /// Send `SIGINT` (fast shutdown) instead of `SIGTERM`.
        #[arg(long)]
        fast: bool,
    },

    /// Ask a running supervisor to reload its configuration (`SIGHUP`).
    Reload,

    /// Remove a node from its formation.
    Drop {
        #[command(subcommand)]
        target: DropCommands,
    },

    /// Mark this node for planned maintenance.
    Enable {
        #[command(subcommand)]
        feature: ToggleCommands,
    },

    /// Clear a previously enabled maintenance flag.
    Disable {
        #[command(subcommand)]
        feature: ToggleCommands,
    },

    /// Trigger a manual failover, switchover, or promotion.
    Perform {
        #[command(subcommand)]
        action: PerformCommands,
    },

    /// Display state, events, or configuration.
    Show {
        #[command(subcommand)]
        what: ShowCommands,
    },

    /// Continuously display state changes as they happen.
    Watch,

    /// Low-level subprocess entry points used by the supervisor itself.
    Do {
        #[command(subcommand)]
        action: DoCommands,
    },
}

#[derive(Subcommand)]
enum CreateCommands {
    /// Create and initialize a monitor node.
    Monitor {
        /// Hostname this monitor will register itself under.
        #[arg(long)]
        hostname: Option<String>,
        /// Port the monitor listens on.
        #[arg(long, default_value_t = 5432)]
        port: u16,
    },
    /// Create and initialize a keeper node, registering it with a monitor.
    Postgres {
        /// Hostname peers should use to reach this node.
        #[arg(long)]
        hostname: Option<String>,
        /// Port Postgres listens on.
        #[arg(long, default_value_t = 5432)]
        port: u16,
    },
}

#[derive(Subcommand)]
enum DropCommands {
    /// Remove a node by name (defaults to this node's own `--name`).
    Node {
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ToggleCommands {
    /// Planned maintenance: the monitor stops assigning writes to this
    /// node until maintenance is disabled again.
    Maintenance,
}

#[derive(Subcommand)]
enum PerformCommands {
    /// Force an unplanned failover within the current group.
    Failover,
    /// Gracefully swap the primary with a healthy secondary.
    Switchover,
    /// Promote a specific node by name.
    Promotion { name: String },
}

#[derive(Subcommand)]
enum ShowCommands {
    /// Current reported/goal state of every node in the group.
    State,
    /// Recent events recorded by the monitor.
    Events {
        #[arg(long, default_value_t = 10)]
        count: u64,
    },
    /// Postgres connection URI for this formation.
    Uri,
    /// This node's on-disk configuration settings.
    Settings,
    /// Path to this node's configuration file.
    File,
    /// The `synchronous_standby_names` value the primary should apply.
    StandbyNames,
}

#[derive(Subcommand)]
enum DoCommands {
    /// Run one node-active cycle and print the resulting state, without
    /// looping. Used by the supervisor's own service command factory.
    Service,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();
}

/// Resolves `--pgdata`, falling back to `$PGDATA` (§6).
fn resolve_pgdata(cli_value: &Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_value
        .clone()
        .or_else(|| std::env::var_os("PGDATA").map(PathBuf::from))
        .ok_or_else(|| {
            CliError::BadArguments(
                "no data directory given: pass --pgdata or set $PGDATA".to_string(),
            )
        })
}

fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    style::set_no_color(cli.json);

    let ctx = commands::CommandContext {
        pgdata: match resolve_pgdata(&cli.pgdata) {
            Ok(path) => path,
            Err(error) => return report(error),
        },
        monitor: cli.monitor,
        formation: cli.formation,
        group: cli.group,
        name: cli.name,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Create(CreateCommands::Monitor { hostname, port }) => {
            commands::create::monitor(&ctx, hostname, port)
        }
        Commands::Create(CreateCommands::Postgres { hostname, port }) => {
            commands::create::postgres(&ctx, hostname, port)
        }
        Commands::Run => commands::run::run(&ctx),
        Commands::Stop { fast } => commands::run::stop(&ctx, fast),
        Commands::Reload => commands::run::reload(&ctx),
        Commands::Drop {
            target: DropCommands::Node { name },
        } => commands::drop_node::run(&ctx, name),
        Commands::Enable {
            feature: ToggleCommands::Maintenance,
        } => commands::maintenance::enable(&ctx),
        Commands::Disable {
            feature: ToggleCommands::Maintenance,
        } => commands::maintenance::disable(&ctx),
        Commands::Perform {
            action: PerformCommands::Failover,
        } => commands::perform::failover(&ctx),
        Commands::Perform {
            action: PerformCommands::Switchover,
        } => commands::perform::switchover(&ctx),
        Commands::Perform {
            action: PerformCommands::Promotion { name },
        } => commands::perform::promotion(&ctx, &name),
        Commands::Show { what } => commands::show::run(&ctx, what.into()),
        Commands::Watch => commands::watch::run(&ctx),
        Commands::Do {
            action: DoCommands::Service,
        } => commands::run::do_service(&ctx),
    };

    match result {
        Ok(()) => ProcessExitCode::from(ExitCode::Success.code() as u8),
        Err(error) => report(error),
    }
}

fn report(error: CliError) -> ProcessExitCode {
    style::print_error(&error.to_string());
    ProcessExitCode::from(error.exit_code().code() as u8)
}

impl From<ShowCommands> for commands::show::What {
    fn from(value: ShowCommands) -> Self {
        match value {
            ShowCommands::State => commands::show::What::State,
            ShowCommands::Events { count } => commands::show::What::Events { count },
            ShowCommands::Uri => commands::show::What::Uri,
            ShowCommands::Settings => commands::show::What::Settings,
            ShowCommands::File => commands::show::What::File,
            ShowCommands::StandbyNames => commands::show::What::StandbyNames,
        }
    }
}
