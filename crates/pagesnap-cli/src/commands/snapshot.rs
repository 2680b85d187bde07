//! Snapshot publication commands

use clap::{Args, Subcommand};
use pagesnap_core::model::Snapshot;
use pagesnap_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};

use super::{print_json, DbArgs};

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Snapshot every page of a site (default: every site)
    Create(CreateArgs),
    /// Flip the enabled flag of the given snapshots
    Toggle(ToggleArgs),
    /// List stored snapshots
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub site: Option<i64>,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Snapshot ids
    #[arg(required = true)]
    pub ids: Vec<i64>,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub site: Option<i64>,

    /// Only snapshots whose route name contains this text
    #[arg(long)]
    pub route: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

pub fn execute(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SnapshotCommand::Create(args) => execute_create(args),
        SnapshotCommand::Toggle(args) => execute_toggle(args),
        SnapshotCommand::List(args) => execute_list(args),
    }
}

fn execute_create(args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;

    let cmd = EngineCommand::Publish { site_id: args.site };
    let summaries = match apply_engine_command(cmd, &conn, None)? {
        EngineCommandResult::Published(summaries) => summaries,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    for summary in summaries {
        println!(
            "Site {} ({}): {} snapshots published",
            summary.site_id,
            summary.site_name,
            summary.snapshot_count()
        );
    }
    Ok(())
}

fn execute_toggle(args: ToggleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;

    let cmd = EngineCommand::ToggleSnapshots { ids: args.ids };
    match apply_engine_command(cmd, &conn, None)? {
        EngineCommandResult::Snapshots(snapshots) => {
            for snapshot in &snapshots {
                println!(
                    "{}\t{}",
                    snapshot.id.unwrap_or_default(),
                    if snapshot.enabled { "enabled" } else { "disabled" }
                );
            }
            Ok(())
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;

    let cmd = EngineCommand::ListSnapshots {
        site_id: args.site,
        route_filter: args.route,
    };
    let snapshots = match apply_engine_command(cmd, &conn, None)? {
        EngineCommandResult::Snapshots(snapshots) => snapshots,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    if args.json {
        return print_json(&snapshots);
    }
    for snapshot in &snapshots {
        println!("{}", format_row(snapshot));
    }
    Ok(())
}

fn format_row(snapshot: &Snapshot) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        snapshot.id.unwrap_or_default(),
        snapshot.site_id,
        snapshot.route_name,
        snapshot.url.as_deref().unwrap_or("-"),
        if snapshot.enabled { "enabled" } else { "disabled" }
    )
}
