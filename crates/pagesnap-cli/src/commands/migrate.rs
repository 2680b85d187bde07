//! Schema migration command

use clap::Args;

use super::DbArgs;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.db.open()?;
    let applied = pagesnap_store::migrations::applied_migrations(&conn)?;

    println!("Database ready: {}", args.db.db.display());
    for id in applied {
        println!("  {}", id);
    }
    Ok(())
}
