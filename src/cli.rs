//! # Command Line Interface

use crate::config::Config;
use crate::errors::Result;
use crate::storage::{create_pool, list_applied_migrations, run_db_migrations, validate_migrations};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "maity-invites")]
#[command(about = "Maity invite acceptance service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database URL override
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Show applied migrations
    Status,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(Commands::Serve { port: Some(port) }) = &self.command {
            config.api.port = *port;
        }
        config.validate()
    }
}

pub async fn run_migrate(config: &Config) -> Result<()> {
    let mut db_config = config.database.clone();
    db_config.auto_migrate = false;

    let pool = create_pool(&db_config).await?;
    run_db_migrations(&pool).await?;

    println!("Migrations applied");
    Ok(())
}

pub async fn show_migration_status(config: &Config) -> Result<()> {
    let mut db_config = config.database.clone();
    db_config.auto_migrate = false;

    let pool = create_pool(&db_config).await?;
    let applied = list_applied_migrations(&pool).await?;
    let up_to_date = validate_migrations(&pool).await?;

    println!("{:<16} {:<40} {:>8}  installed on", "version", "description", "ms");
    for migration in &applied {
        println!(
            "{:<16} {:<40} {:>8}  {}",
            migration.version,
            migration.description,
            migration.execution_time,
            migration.installed_on.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("schema up to date: {}", up_to_date);
    Ok(())
}
