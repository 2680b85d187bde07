//! PageSnap CLI
//!
//! Command-line interface for route reconciliation and snapshot publication

use clap::{Parser, Subcommand};
use pagesnap_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "pagesnap")]
#[command(about = "PageSnap - CMS page reconciliation and publication", long_about = None)]
struct Cli {
    /// Logging profile (dev, prod, test)
    #[arg(long, global = true, default_value = "prod")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Site operations
    Site(commands::site::SiteArgs),
    /// Route reconciliation operations
    Routes(commands::routes::RoutesArgs),
    /// Snapshot operations
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    let cli = Cli::parse();

    match Profile::parse(&cli.log) {
        Some(profile) => logging_facility::init(profile),
        None => {
            eprintln!("Error: unknown logging profile '{}'", cli.log);
            std::process::exit(2);
        }
    }

    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args),
        Commands::Site(args) => commands::site::execute(args),
        Commands::Routes(args) => commands::routes::execute(args),
        Commands::Snapshot(args) => commands::snapshot::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
