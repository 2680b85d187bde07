//! Route reconciliation commands

use clap::{Args, Subcommand};
use pagesnap_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use pagesnap_engine::commands::reconcile::ReconcileOptions;
use pagesnap_store::parse_routing_file;
use std::path::PathBuf;

use super::{print_json, DbArgs};

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// Create, update and disable pages so they match the routing catalog
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Routing catalog (YAML)
    #[arg(long)]
    pub routes: PathBuf,

    /// Reconcile only this site (default: every site)
    #[arg(long)]
    pub site: Option<i64>,

    /// Delete hybrid pages whose route no longer exists
    #[arg(long)]
    pub clean: bool,

    /// Print the reports as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

pub fn execute(args: RoutesArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RoutesCommand::Update(args) => execute_update(args),
    }
}

fn execute_update(args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_routing_file(&args.routes)?;
    let conn = args.db.open()?;

    let cmd = EngineCommand::ReconcileRoutes {
        site_id: args.site,
        options: ReconcileOptions {
            cleanup: args.clean,
        },
    };
    let reports = match apply_engine_command(cmd, &conn, Some(&config))? {
        EngineCommandResult::Reconciled(reports) => reports,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    if args.json {
        return print_json(&reports);
    }

    let mut stale = false;
    for report in &reports {
        println!("# {} ({})", report.site_name, report.site_url);
        print!("{}", report);
        stale |= report.has_stale_pages();
    }
    if stale && !args.clean {
        eprintln!("Some hybrid pages no longer match a route; rerun with --clean to delete them");
    }
    Ok(())
}
