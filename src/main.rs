use clap::Parser;
use maity_invites::{
    cli::{run_migrate, show_migration_status, Cli, Commands},
    observability::init_observability,
    startup::run_server,
    Config, Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config)?;

    init_observability(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting Maity invite service");

    match cli.command {
        None | Some(Commands::Serve { .. }) => run_server(config).await,
        Some(Commands::Migrate) => run_migrate(&config).await,
        Some(Commands::Status) => show_migration_status(&config).await,
    }
}
