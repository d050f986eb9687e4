mod config;
mod logging;
mod server;
mod shutdown;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use profiles::ProfilesModule;
use profiles::infra::jwt::JwtAuthManager;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::{AppConfig, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Profiles Server - profile creation with avatar upload
#[derive(Parser)]
#[command(name = "profiles-server")]
#[command(about = "Profiles Server - profile creation with avatar upload")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Issue an access token signed with the configured secret (development aid)
    IssueToken {
        /// Account the token is issued for
        #[arg(long)]
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.apply_port_override(port)?;
    }

    logging::init_logging(&config.logging, cli.verbose);
    tracing::info!("Profiles Server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
        Commands::IssueToken { user_id } => issue_token(&config, user_id),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.server.socket_addr()?;
    JwtAuthManager::from_config(&config.profiles.jwt)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn issue_token(config: &AppConfig, user_id: i64) -> Result<()> {
    let manager = JwtAuthManager::from_config(&config.profiles.jwt)?;
    println!("{}", manager.create_access_token(user_id)?);
    Ok(())
}

async fn connect_db(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(cfg.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(opts)
        .await
        .context("failed to connect to database")
}

async fn run_server(config: &AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db = connect_db(&config.database).await?;
    if config.database.run_migrations {
        ProfilesModule::migrate(&db).await?;
    }

    let module = ProfilesModule::init(&config.profiles, db)?;
    let router = server::build_router(module.router(), config);

    server::serve(router, &config.server).await
}
