//! Site management commands

use clap::{Args, Subcommand};
use pagesnap_core::model::Site;
use pagesnap_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};

use super::{print_json, DbArgs};

#[derive(Debug, Args)]
pub struct SiteArgs {
    #[command(subcommand)]
    pub command: SiteCommand,
}

#[derive(Debug, Subcommand)]
pub enum SiteCommand {
    /// Register a site
    Add(AddArgs),
    /// List registered sites
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Site name
    #[arg(long)]
    pub name: String,

    /// Host the site answers on (`localhost` matches any host)
    #[arg(long)]
    pub host: String,

    /// Path prefix prepended to every page url
    #[arg(long)]
    pub relative_path: Option<String>,

    #[arg(long)]
    pub locale: Option<String>,

    /// Mark the site as the default one
    #[arg(long)]
    pub default: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

pub fn execute(args: SiteArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SiteCommand::Add(args) => execute_add(args),
        SiteCommand::List(args) => execute_list(args),
    }
}

fn execute_add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;

    let mut site = Site::new(args.name, args.host).with_default(args.default);
    if let Some(path) = args.relative_path {
        site = site.with_relative_path(path);
    }
    if let Some(locale) = args.locale {
        site = site.with_locale(locale);
    }

    match apply_engine_command(EngineCommand::AddSite(site), &conn, None)? {
        EngineCommandResult::Site(site) => {
            println!("Site created:");
            println!("  id: {}", site.id.unwrap_or_default());
            println!("  name: {}", site.name);
            println!("  url: {}", site.url());
            Ok(())
        }
        other => Err(format!("unexpected engine result: {:?}", other).into()),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;

    let sites = match apply_engine_command(EngineCommand::ListSites, &conn, None)? {
        EngineCommandResult::Sites(sites) => sites,
        other => return Err(format!("unexpected engine result: {:?}", other).into()),
    };

    if args.json {
        return print_json(&sites);
    }
    for site in sites {
        println!(
            "{}\t{}\t{}{}",
            site.id.unwrap_or_default(),
            site.name,
            site.url(),
            if site.is_default { "\t(default)" } else { "" }
        );
    }
    Ok(())
}
