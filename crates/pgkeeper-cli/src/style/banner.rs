//! Banner text for pg_keeper.

use super::colors::SemanticStyle;

const BANNER: &str = "pg_keeper";

/// Prints the full banner with styling.
pub fn print_banner() {
    println!("{}", BANNER.info());
    println!("  {}", "automated Postgres failover".muted());
    println!();
}

/// Prints a mini banner for use in subcommands.
pub fn print_mini_banner() {
    print!("{}", "pg_keeper".header());
}

/// Prints the version banner.
pub fn print_version_banner(version: &str) {
    println!();
    println!("  {} {}", "pg_keeper".header(), format!("v{version}").muted());
    println!("  {}", "automated Postgres failover".muted());
    println!();
}
