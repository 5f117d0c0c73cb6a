//! `tollgated` — the Tollgate account and token server.
//!
//! Usage:
//!   tollgated -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/tollgate/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod host_guard;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tollgate_core::Module;
use tracing::info;

use config::ServerConfig;
use host_guard::AllowedHosts;

/// Tollgate server.
#[derive(Parser, Debug)]
#[command(name = "tollgated", about = "Tollgate account and token server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = tollgate_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn tollgate_sql::SQLStore> = Arc::new(
        tollgate_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Schema settings are resolved here; a bad one stops the server.
    let auth_module = tollgate_auth::AuthModule::new(sql, server_config.auth_config()?)?;
    info!("Auth module initialized");

    let hosts = Arc::new(AllowedHosts::new(
        &server_config.allowed_hosts,
        server_config.debug,
    ));
    let app = routes::build_router(hosts, vec![(auth_module.name(), auth_module.routes())]);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("Tollgate server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
